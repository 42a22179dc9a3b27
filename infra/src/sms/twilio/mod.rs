//! Twilio adapters
//!
//! Both adapters talk to Twilio's REST API directly with `reqwest` using
//! HTTP basic auth and form-encoded bodies:
//! - [`TwilioVerifyAdapter`]: hosted Verify service with a custom code
//! - [`TwilioMessagingAdapter`]: Programmable Messaging (SMS and WhatsApp)

pub mod client;
pub mod errors;
pub mod messaging;
pub mod verify;

pub use client::TwilioCredentials;
pub use errors::{classify_code, classify_error};
pub use messaging::{TwilioMessagingAdapter, TwilioMessagingConfig};
pub use verify::{TwilioVerifyAdapter, TwilioVerifyConfig};
