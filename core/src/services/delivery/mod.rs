//! Code delivery across upstream providers
//!
//! - `traits` - The `ProviderAdapter` capability every upstream integration implements
//! - `routing` - Per-prefix candidate lists compiled from configuration
//! - `router` - Ordered fallback over candidates with per-call timeouts

mod router;
mod routing;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use router::DeliveryRouter;
pub use routing::{RouteCandidate, RoutingTable};
pub use traits::ProviderAdapter;
