//! Activation against the SKM Web API.
//!
//! [`Skm`] pairs a [`RequestHandler`] with a [`SignatureVerifier`] and runs the
//! full pipeline: request, envelope, signature check, field decoding. The
//! free functions [`handle_activate`] and [`handle_activate_raw`] run the same
//! pipeline on a response body that was obtained some other way, such as a
//! stored activation file.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::envelope;
use crate::error::{reason, ActivateError, Call, Error, LicenseResult};
use crate::key::LicenseKey;
use crate::raw::RawLicenseKey;
use crate::transport::RequestHandler;
use crate::verifier::SignatureVerifier;

/// Web API method used for activation.
pub const ACTIVATE_METHOD: &str = "Activate";

/// License activation client.
#[derive(Debug, Clone, Default)]
pub struct Skm<R, V> {
    request_handler: R,
    signature_verifier: V,
}

impl<R, V> Skm<R, V>
where
    R: RequestHandler,
    V: SignatureVerifier,
{
    /// Creates a client from its two capabilities.
    pub fn new(request_handler: R, signature_verifier: V) -> Self {
        Self {
            request_handler,
            signature_verifier,
        }
    }

    pub fn request_handler(&self) -> &R {
        &self.request_handler
    }

    pub fn request_handler_mut(&mut self) -> &mut R {
        &mut self.request_handler
    }

    pub fn signature_verifier(&self) -> &V {
        &self.signature_verifier
    }

    pub fn signature_verifier_mut(&mut self) -> &mut V {
        &mut self.signature_verifier
    }

    /// Activates `key` on `machine_code` and returns the verified license.
    ///
    /// `fields_to_return` is the Web API bitmask selecting optional fields;
    /// pass 0 for the default set.
    ///
    /// # Errors
    ///
    /// Any pipeline failure, annotated with [`Call::Activate`].
    pub fn activate(
        &self,
        token: &str,
        product_id: &str,
        key: &str,
        machine_code: &str,
        fields_to_return: i32,
    ) -> LicenseResult<LicenseKey> {
        let raw = self.activate_inner(token, product_id, key, machine_code, fields_to_return);
        let license = raw
            .and_then(LicenseKey::make)
            .map_err(|e| e.with_call(Call::Activate))?;
        info!(product_id = license.product_id(), "license activated");
        Ok(license)
    }

    /// Like [`activate`](Self::activate), but stops after signature
    /// verification and returns the raw field map.
    ///
    /// # Errors
    ///
    /// Any pipeline failure, annotated with [`Call::ActivateRaw`].
    pub fn activate_raw(
        &self,
        token: &str,
        product_id: &str,
        key: &str,
        machine_code: &str,
        fields_to_return: i32,
    ) -> LicenseResult<RawLicenseKey> {
        self.activate_inner(token, product_id, key, machine_code, fields_to_return)
            .map_err(|e| e.with_call(Call::ActivateRaw))
    }

    /// Like [`activate_raw`](Self::activate_raw), but a failure also carries
    /// the server's response body when one was received.
    ///
    /// # Errors
    ///
    /// An [`ActivateError`] wrapping the failure annotated with [`Call::ActivateRaw`].
    pub fn activate_raw_detailed(
        &self,
        token: &str,
        product_id: &str,
        key: &str,
        machine_code: &str,
        fields_to_return: i32,
    ) -> Result<RawLicenseKey, ActivateError> {
        let fail = |e: Error, response: Option<String>| {
            ActivateError::new(e.with_call(Call::ActivateRaw), response)
        };

        let response = self
            .request(token, product_id, key, machine_code, fields_to_return)
            .map_err(|e| fail(e, None))?;

        verify_response(&self.signature_verifier, &response).map_err(|e| fail(e, Some(response)))
    }

    fn activate_inner(
        &self,
        token: &str,
        product_id: &str,
        key: &str,
        machine_code: &str,
        fields_to_return: i32,
    ) -> LicenseResult<RawLicenseKey> {
        let response = self.request(token, product_id, key, machine_code, fields_to_return)?;
        verify_response(&self.signature_verifier, &response)
    }

    fn request(
        &self,
        token: &str,
        product_id: &str,
        key: &str,
        machine_code: &str,
        fields_to_return: i32,
    ) -> LicenseResult<String> {
        let params = activate_params(token, product_id, key, machine_code, fields_to_return)?;
        debug!(product_id, fields_to_return, "sending activation request");
        self.request_handler.make_request(ACTIVATE_METHOD, &params)
    }
}

/// Builds the Activate request parameters.
///
/// Every value is sent exactly as given.
///
/// # Errors
///
/// [`Subsystem::Internal`](crate::Subsystem::Internal) / `ARGUMENT` if
/// `product_id` is not a decimal integer.
pub fn activate_params(
    token: &str,
    product_id: &str,
    key: &str,
    machine_code: &str,
    fields_to_return: i32,
) -> LicenseResult<BTreeMap<String, String>> {
    if product_id.parse::<i64>().is_err() {
        return Err(Error::internal(reason::internal::ARGUMENT));
    }

    let params = [
        ("token", token.to_owned()),
        ("ProductId", product_id.to_owned()),
        ("Key", key.to_owned()),
        ("Sign", "true".to_owned()),
        ("MachineCode", machine_code.to_owned()),
        ("FieldsToReturn", fields_to_return.to_string()),
        ("SignMethod", "1".to_owned()),
        ("v", "1".to_owned()),
    ];
    Ok(params
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect())
}

fn verify_response<V>(verifier: &V, response: &str) -> LicenseResult<RawLicenseKey>
where
    V: SignatureVerifier + ?Sized,
{
    let envelope = envelope::decode(response)?;
    RawLicenseKey::make(verifier, &envelope.license_key, &envelope.signature)
}

/// Verifies and decodes an Activate response body obtained elsewhere.
///
/// # Errors
///
/// Any pipeline failure, annotated with [`Call::HandleActivate`].
pub fn handle_activate<V>(verifier: &V, response: &str) -> LicenseResult<LicenseKey>
where
    V: SignatureVerifier + ?Sized,
{
    verify_response(verifier, response)
        .and_then(LicenseKey::make)
        .map_err(|e| e.with_call(Call::HandleActivate))
}

/// Like [`handle_activate_raw`], but a failure also carries `response`.
///
/// # Errors
///
/// An [`ActivateError`] wrapping the failure annotated with [`Call::HandleActivateRaw`].
pub fn handle_activate_raw_detailed<V>(
    verifier: &V,
    response: &str,
) -> Result<RawLicenseKey, ActivateError>
where
    V: SignatureVerifier + ?Sized,
{
    verify_response(verifier, response).map_err(|e| {
        ActivateError::new(e.with_call(Call::HandleActivateRaw), Some(response.to_owned()))
    })
}

/// Verifies an Activate response body obtained elsewhere, without decoding its fields.
///
/// # Errors
///
/// Any pipeline failure, annotated with [`Call::HandleActivateRaw`].
pub fn handle_activate_raw<V>(verifier: &V, response: &str) -> LicenseResult<RawLicenseKey>
where
    V: SignatureVerifier + ?Sized,
{
    verify_response(verifier, response).map_err(|e| e.with_call(Call::HandleActivateRaw))
}
