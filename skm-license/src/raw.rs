//! Signature-verified license payloads.
//!
//! A [`RawLicenseKey`] is only ever built after the server's signature has
//! been checked: decode, then verify, then interpret. Nothing in the payload
//! is parsed before [`SignatureVerifier::verify`] accepts it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{reason, Error, LicenseResult};
use crate::verifier::SignatureVerifier;

/// A license payload whose signature has been verified.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLicenseKey {
    license_base64: String,
    signature_base64: String,
    payload: Vec<u8>,
    fields: Map<String, Value>,
}

impl RawLicenseKey {
    /// Decodes and verifies a base64 payload and signature.
    ///
    /// # Errors
    ///
    /// - [`Subsystem::Main`](crate::Subsystem::Main) / `UNKNOWN_SERVER_REPLY` if
    ///   either input is not base64, or the verified payload is not a JSON object.
    /// - [`Subsystem::SignatureVerifier`](crate::Subsystem::SignatureVerifier) /
    ///   `INVALID_SIGNATURE` if the verifier rejects the signature.
    pub fn make<V>(verifier: &V, license_base64: &str, signature_base64: &str) -> LicenseResult<Self>
    where
        V: SignatureVerifier + ?Sized,
    {
        let payload = decode_base64(license_base64, "license")?;
        let signature = decode_base64(signature_base64, "signature")?;

        if !verifier.verify(&payload, &signature) {
            warn!("license signature rejected");
            return Err(Error::signature_verifier(
                reason::signature_verifier::INVALID_SIGNATURE,
            ));
        }
        debug!(len = payload.len(), "license signature verified");

        let fields: Map<String, Value> = serde_json::from_slice(&payload).map_err(|e| {
            warn!("verified payload is not a JSON object: {e}");
            Error::main(reason::main::UNKNOWN_SERVER_REPLY)
        })?;

        Ok(Self {
            license_base64: license_base64.to_owned(),
            signature_base64: signature_base64.to_owned(),
            payload,
            fields,
        })
    }

    /// Returns the payload exactly as the server encoded it.
    #[must_use]
    pub fn license_base64(&self) -> &str {
        &self.license_base64
    }

    /// Returns the signature exactly as the server encoded it.
    #[must_use]
    pub fn signature_base64(&self) -> &str {
        &self.signature_base64
    }

    /// Returns the verified payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the payload's top-level fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Looks up a single payload field by its wire name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Serializes this key back into an Activate response body.
    ///
    /// The result can be stored and later re-verified with
    /// [`handle_activate`](crate::handle_activate), which makes offline
    /// activation possible without trusting the stored file.
    #[must_use]
    pub fn to_response(&self) -> String {
        serde_json::json!({
            "result": 0,
            "licenseKey": self.license_base64,
            "signature": self.signature_base64,
        })
        .to_string()
    }
}

fn decode_base64(input: &str, what: &str) -> LicenseResult<Vec<u8>> {
    BASE64.decode(input).map_err(|e| {
        warn!("{what} is not valid base64: {e}");
        Error::main(reason::main::UNKNOWN_SERVER_REPLY)
    })
}
