//! Shared HTTP plumbing for the Twilio adapters

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use mazad_core::ProviderError;

use super::errors::{classify_error, TwilioErrorBody};
use crate::InfrastructureError;

/// Programmable Messaging API host
pub const API_BASE_URL: &str = "https://api.twilio.com";

/// Verify API host
pub const VERIFY_BASE_URL: &str = "https://verify.twilio.com";

/// Hex digits following the two-letter prefix of a resource SID
const SID_HEX_LEN: usize = 32;

/// Whether `value` is a Twilio resource SID with one of `prefixes`
pub(crate) fn is_sid(value: &str, prefixes: &[&str]) -> bool {
    match value.get(..2) {
        Some(prefix) if prefixes.contains(&prefix) => {
            let digits = &value[2..];
            digits.len() == SID_HEX_LEN
                && digits
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        }
        _ => false,
    }
}

/// Rejection for a status lookup whose reference is not a resource SID
pub(crate) fn invalid_reference(provider_ref: &str) -> ProviderError {
    ProviderError::unknown(
        "invalid_reference",
        format!("malformed provider reference '{}'", provider_ref),
    )
}

/// Twilio account credentials
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    /// Account SID (`AC...`)
    pub account_sid: String,
    pub auth_token: String,
}

impl TwilioCredentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Use configured values, falling back to `TWILIO_ACCOUNT_SID` and
    /// `TWILIO_AUTH_TOKEN`
    pub fn resolve(
        account_sid: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Self, InfrastructureError> {
        let account_sid = match account_sid {
            Some(sid) if !sid.is_empty() => sid.to_string(),
            _ => std::env::var("TWILIO_ACCOUNT_SID").map_err(|_| {
                InfrastructureError::Config("TWILIO_ACCOUNT_SID not set".to_string())
            })?,
        };
        let auth_token = match auth_token {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => std::env::var("TWILIO_AUTH_TOKEN").map_err(|_| {
                InfrastructureError::Config("TWILIO_AUTH_TOKEN not set".to_string())
            })?,
        };

        Ok(Self::new(account_sid, auth_token))
    }
}

/// Authenticated client bound to one Twilio API host
#[derive(Debug, Clone)]
pub(crate) struct TwilioHttp {
    client: Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioHttp {
    pub(crate) fn new(
        credentials: TwilioCredentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn account_sid(&self) -> &str {
        &self.credentials.account_sid
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        Self::parse(response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await
            .map_err(transport_error)?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::unknown("invalid_response", e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let error: Option<TwilioErrorBody> = serde_json::from_str(&body).ok();
        let code = error.as_ref().and_then(|e| e.code);
        let message = error
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Err(ProviderError::new(classify_error(status.as_u16(), code), message))
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::unknown("timeout", err.to_string())
    } else {
        ProviderError::unknown("transport", err.to_string())
    }
}
