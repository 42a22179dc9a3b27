//! Type definitions shared between configuration, domain and API layers
//!
//! - `channel` - Delivery channels a provider can send a code over
//! - `response` - API response envelope

pub mod channel;
pub mod response;

pub use channel::Channel;
pub use response::{ApiResponse, ErrorBody};
