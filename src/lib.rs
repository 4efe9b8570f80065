//! SmartGen Cloud Plus SDK
//!
//! Client for the SmartGen device-monitoring platform. Every request body
//! is SM4-ECB encrypted and every request carries a nested-MD5 `X-Sign`
//! header derived from the timestamp and the session token; responses
//! come back as JSON wrappers whose `data` field is usually another
//! ciphertext. The [`SmartGenClient`] session starts anonymous and turns
//! authenticated once a login response yields a token.

pub mod client;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod response;
pub mod sign;

pub use client::{AuthMode, SmartGenClient};
pub use config::SmartGenConfig;
pub use crypto::PayloadCipher;
pub use envelope::RequestEnvelope;
pub use error::{Result, SmartGenError};
pub use response::ResponseMap;
pub use sign::RequestSigner;
