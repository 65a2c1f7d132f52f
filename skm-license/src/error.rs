//! Error types for the activation pipeline.
//!
//! Every failure is described by a [`Subsystem`], a reason code scoped to that
//! subsystem, an `extra` value with backend detail (for instance an HTTP
//! status) and the orchestration [`Call`] that observed it. Reason codes are
//! stable integers, listed in [`reason`].

use std::fmt;

use thiserror::Error;
use tracing::warn;

/// The part of the pipeline that reported a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// No error has been recorded.
    #[default]
    None,
    /// Server-reported business failure or malformed server reply.
    Main,
    /// Transport failure.
    RequestHandler,
    /// Cryptographic verification failure.
    SignatureVerifier,
    /// The response envelope could not be parsed.
    Json,
    /// Broken internal contract.
    Internal,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Main => "main",
            Self::RequestHandler => "request handler",
            Self::SignatureVerifier => "signature verifier",
            Self::Json => "json",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// The orchestration step that last observed an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    /// [`Skm::activate`](crate::Skm::activate).
    Activate,
    /// [`Skm::activate_raw`](crate::Skm::activate_raw).
    ActivateRaw,
    /// [`handle_activate`](crate::handle_activate).
    HandleActivate,
    /// [`handle_activate_raw`](crate::handle_activate_raw).
    HandleActivateRaw,
}

/// Reason codes, grouped by subsystem.
pub mod reason {
    /// Reasons for [`Subsystem::Main`](super::Subsystem::Main).
    pub mod main {
        /// The reply did not have the expected shape.
        pub const UNKNOWN_SERVER_REPLY: i32 = 1;
        pub const INVALID_ACCESS_TOKEN: i32 = 2;
        pub const ACCESS_DENIED: i32 = 3;
        pub const INCORRECT_INPUT_PARAMETER: i32 = 4;
        pub const PRODUCT_NOT_FOUND: i32 = 5;
        pub const KEY_NOT_FOUND: i32 = 6;
        pub const KEY_BLOCKED: i32 = 7;
        pub const DEVICE_LIMIT_REACHED: i32 = 8;
        /// The server reported an error whose message is not recognised.
        pub const UNKNOWN_SERVER_ERROR: i32 = 9;
    }

    /// Reasons for [`Subsystem::Json`](super::Subsystem::Json).
    pub mod json {
        pub const PARSE: i32 = 1;
    }

    /// Reasons for [`Subsystem::SignatureVerifier`](super::Subsystem::SignatureVerifier).
    pub mod signature_verifier {
        pub const INVALID_SIGNATURE: i32 = 1;
        pub const INVALID_MODULUS: i32 = 2;
        pub const INVALID_EXPONENT: i32 = 3;
        /// `verify` was called before a modulus was configured.
        pub const KEY_NOT_SET: i32 = 4;
    }

    /// Reasons for [`Subsystem::RequestHandler`](super::Subsystem::RequestHandler).
    pub mod request_handler {
        pub const BUILD_CLIENT: i32 = 1;
        pub const CONNECT: i32 = 2;
        pub const TIMEOUT: i32 = 3;
        /// `extra` holds the HTTP status.
        pub const STATUS: i32 = 4;
        pub const BODY: i32 = 5;
    }

    /// Reasons for [`Subsystem::Internal`](super::Subsystem::Internal).
    pub mod internal {
        pub const ARGUMENT: i32 = 1;
    }
}

/// Business errors the server can report, decoded from a [`Subsystem::Main`] reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerError {
    UnknownServerReply,
    InvalidAccessToken,
    AccessDenied,
    IncorrectInputParameter,
    ProductNotFound,
    KeyNotFound,
    KeyBlocked,
    DeviceLimitReached,
    UnknownServerError,
}

impl ServerError {
    /// Returns the reason code for this error.
    #[must_use]
    pub fn code(self) -> i32 {
        use reason::main::*;
        match self {
            Self::UnknownServerReply => UNKNOWN_SERVER_REPLY,
            Self::InvalidAccessToken => INVALID_ACCESS_TOKEN,
            Self::AccessDenied => ACCESS_DENIED,
            Self::IncorrectInputParameter => INCORRECT_INPUT_PARAMETER,
            Self::ProductNotFound => PRODUCT_NOT_FOUND,
            Self::KeyNotFound => KEY_NOT_FOUND,
            Self::KeyBlocked => KEY_BLOCKED,
            Self::DeviceLimitReached => DEVICE_LIMIT_REACHED,
            Self::UnknownServerError => UNKNOWN_SERVER_ERROR,
        }
    }

    /// Decodes a reason code, or `None` if the code is not a [`Subsystem::Main`] reason.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        use reason::main::*;
        let err = match code {
            UNKNOWN_SERVER_REPLY => Self::UnknownServerReply,
            INVALID_ACCESS_TOKEN => Self::InvalidAccessToken,
            ACCESS_DENIED => Self::AccessDenied,
            INCORRECT_INPUT_PARAMETER => Self::IncorrectInputParameter,
            PRODUCT_NOT_FOUND => Self::ProductNotFound,
            KEY_NOT_FOUND => Self::KeyNotFound,
            KEY_BLOCKED => Self::KeyBlocked,
            DEVICE_LIMIT_REACHED => Self::DeviceLimitReached,
            UNKNOWN_SERVER_ERROR => Self::UnknownServerError,
            _ => return None,
        };
        Some(err)
    }
}

/// A pipeline failure.
///
/// `Error::default()` is the empty state. [`Error::set`] moves it to a failing
/// state exactly once; later calls leave the first failure in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("{subsystem} error (reason {reason}, extra {extra})")]
pub struct Error {
    subsystem: Subsystem,
    reason: i32,
    extra: i32,
    call: Option<Call>,
}

impl Error {
    /// Creates a failing error.
    #[must_use]
    pub fn new(subsystem: Subsystem, reason: i32, extra: i32) -> Self {
        let mut e = Self::default();
        e.set(subsystem, reason, extra);
        e
    }

    #[must_use]
    pub fn main(reason: i32) -> Self {
        Self::new(Subsystem::Main, reason, 0)
    }

    #[must_use]
    pub fn json(reason: i32) -> Self {
        Self::new(Subsystem::Json, reason, 0)
    }

    #[must_use]
    pub fn signature_verifier(reason: i32) -> Self {
        Self::new(Subsystem::SignatureVerifier, reason, 0)
    }

    #[must_use]
    pub fn request_handler(reason: i32, extra: i32) -> Self {
        Self::new(Subsystem::RequestHandler, reason, extra)
    }

    #[must_use]
    pub fn internal(reason: i32) -> Self {
        Self::new(Subsystem::Internal, reason, 0)
    }

    /// Records a failure. Has no effect if a failure is already recorded.
    pub fn set(&mut self, subsystem: Subsystem, reason: i32, extra: i32) {
        if self.is_err() {
            warn!(
                current = %self.subsystem,
                ignored = %subsystem,
                "refusing to overwrite an existing error"
            );
            return;
        }
        self.subsystem = subsystem;
        self.reason = reason;
        self.extra = extra;
    }

    /// Annotates a failing error with the step that observed it.
    ///
    /// Subsystem, reason and extra are left untouched. An empty error stays empty.
    pub fn set_call(&mut self, call: Call) {
        if self.is_err() {
            self.call = Some(call);
        }
    }

    /// Builder form of [`Error::set_call`].
    #[must_use]
    pub fn with_call(mut self, call: Call) -> Self {
        self.set_call(call);
        self
    }

    /// Returns true if a failure has been recorded.
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.subsystem != Subsystem::None
    }

    #[must_use]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    #[must_use]
    pub fn reason(&self) -> i32 {
        self.reason
    }

    #[must_use]
    pub fn extra(&self) -> i32 {
        self.extra
    }

    #[must_use]
    pub fn call(&self) -> Option<Call> {
        self.call
    }

    /// Returns the typed server error for [`Subsystem::Main`] failures.
    #[must_use]
    pub fn main_reason(&self) -> Option<ServerError> {
        match self.subsystem {
            Subsystem::Main => ServerError::from_code(self.reason),
            _ => None,
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, Error>;

/// An activation failure together with the raw server response, if one was received.
///
/// Returned by [`Skm::activate_raw_detailed`](crate::Skm::activate_raw_detailed)
/// for callers that want the response for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("activation failed: {error}")]
pub struct ActivateError {
    #[source]
    error: Error,
    response: Option<String>,
}

impl ActivateError {
    pub(crate) fn new(error: Error, response: Option<String>) -> Self {
        Self { error, response }
    }

    /// Returns the underlying pipeline error.
    #[must_use]
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Returns the body the server sent, or `None` if the transport failed.
    #[must_use]
    pub fn server_response(&self) -> Option<&str> {
        self.response.as_deref()
    }
}

impl From<ActivateError> for Error {
    fn from(err: ActivateError) -> Self {
        err.error
    }
}
