use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use mazad_api::{create_app, telemetry, AppState};
use mazad_infra::build_otp_runtime;
use mazad_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting Mazad OTP API");

    let runtime = build_otp_runtime(&config)
        .await
        .context("failed to assemble OTP service")?;
    let _sweeper = runtime.sweeper.clone().start_background_task();

    let state = web::Data::new(AppState::new(runtime.service.clone()));
    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}
