//! License activation client for the SKM Web API.
//!
//! This crate handles:
//! - The Activate request/response exchange
//! - RSA-SHA256 verification of the signed license payload
//! - Decoding the payload into a typed, immutable license record
//! - Fluent checks of expiry, blocking, feature flags and machine limits
//!
//! # Design Principles
//!
//! - **Verify before trust**: no payload field is read until its signature
//!   has been accepted
//! - **Pluggable backends**: transport and signature verification are traits
//!   ([`RequestHandler`], [`SignatureVerifier`])
//! - **Inspectable errors**: every failure is an [`Error`] naming the failing
//!   subsystem and a stable reason code
//!
//! # Response Format
//!
//! The server answers with `{"result":0,"licenseKey":"..","signature":".."}`.
//! `licenseKey` is base64 of a JSON payload and `signature` is base64 of an
//! RSA-SHA256 signature over the decoded payload bytes.

mod checker;
mod envelope;
mod error;
mod info;
mod key;
mod raw;
mod skm;
mod transport;
mod verifier;

pub use checker::LicenseKeyChecker;
pub use envelope::{parse_server_error_message, Envelope};
pub use error::{reason, ActivateError, Call, Error, LicenseResult, ServerError, Subsystem};
pub use info::{ActivationData, Customer, DataObject, LicenseKeyInformation};
pub use key::LicenseKey;
pub use raw::RawLicenseKey;
pub use skm::{
    activate_params, handle_activate, handle_activate_raw, handle_activate_raw_detailed, Skm,
    ACTIVATE_METHOD,
};
pub use transport::RequestHandler;
pub use verifier::SignatureVerifier;

#[cfg(feature = "online")]
pub use transport::{HttpTransport, HttpTransportConfig};

#[cfg(feature = "rsa")]
pub use verifier::{RsaPublicKeyConfig, RsaSha256Verifier, DEFAULT_EXPONENT_BASE64};

/// Envelope decoding, exposed for callers that fetch responses themselves.
pub mod response {
    pub use crate::envelope::decode;
}
