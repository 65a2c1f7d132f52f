//! Signature verification capability.
//!
//! Server replies carry a signature over the license payload. The pipeline
//! checks it through [`SignatureVerifier`] before any payload field is read.
//! With the `rsa` feature, [`RsaSha256Verifier`] verifies the PKCS#1 v1.5
//! RSA-SHA256 signatures the Web API produces.

/// Verifies signatures over license payloads.
pub trait SignatureVerifier {
    /// Returns true if `signature` is a valid signature over `message`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(message, signature)
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for Box<T> {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(message, signature)
    }
}

#[cfg(feature = "rsa")]
pub use rsa_sha256::{RsaPublicKeyConfig, RsaSha256Verifier, DEFAULT_EXPONENT_BASE64};

#[cfg(feature = "rsa")]
mod rsa_sha256 {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use rsa::{BigUint, Pkcs1v15Sign, RsaPublicKey};
    use serde::{Deserialize, Serialize};
    use sha2::{Digest, Sha256};
    use tracing::{debug, warn};

    use super::SignatureVerifier;
    use crate::error::{reason, Error, LicenseResult};

    /// Base64 of the public exponent 65537.
    pub const DEFAULT_EXPONENT_BASE64: &str = "AQAB";

    /// Public key settings as shown in the account's security settings.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RsaPublicKeyConfig {
        /// Base64 big-endian modulus.
        pub modulus: String,
        /// Base64 big-endian exponent.
        #[serde(default = "default_exponent")]
        pub exponent: String,
    }

    fn default_exponent() -> String {
        DEFAULT_EXPONENT_BASE64.to_string()
    }

    /// RSA-SHA256 (PKCS#1 v1.5) verifier.
    ///
    /// A verifier without a modulus rejects every signature.
    #[derive(Debug, Clone)]
    pub struct RsaSha256Verifier {
        modulus: Option<BigUint>,
        exponent: BigUint,
        key: Option<RsaPublicKey>,
    }

    impl Default for RsaSha256Verifier {
        fn default() -> Self {
            Self {
                modulus: None,
                exponent: BigUint::from(65_537u32),
                key: None,
            }
        }
    }

    impl RsaSha256Verifier {
        /// Creates a verifier with no modulus and the default exponent.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a verifier from base64 modulus and exponent.
        pub fn from_base64(modulus: &str, exponent: &str) -> LicenseResult<Self> {
            let mut verifier = Self::new();
            verifier.set_exponent_base64(exponent)?;
            verifier.set_modulus_base64(modulus)?;
            Ok(verifier)
        }

        /// Creates a verifier from configuration.
        pub fn from_config(config: &RsaPublicKeyConfig) -> LicenseResult<Self> {
            Self::from_base64(&config.modulus, &config.exponent)
        }

        /// Sets the modulus from its base64 big-endian encoding.
        pub fn set_modulus_base64(&mut self, modulus_base64: &str) -> LicenseResult<()> {
            let bytes = decode_nonempty(modulus_base64).ok_or_else(|| {
                warn!("modulus is not valid base64");
                Error::signature_verifier(reason::signature_verifier::INVALID_MODULUS)
            })?;
            self.modulus = Some(BigUint::from_bytes_be(&bytes));
            self.rebuild(reason::signature_verifier::INVALID_MODULUS)
        }

        /// Sets the exponent from its base64 big-endian encoding.
        pub fn set_exponent_base64(&mut self, exponent_base64: &str) -> LicenseResult<()> {
            let bytes = decode_nonempty(exponent_base64).ok_or_else(|| {
                warn!("exponent is not valid base64");
                Error::signature_verifier(reason::signature_verifier::INVALID_EXPONENT)
            })?;
            self.exponent = BigUint::from_bytes_be(&bytes);
            self.rebuild(reason::signature_verifier::INVALID_EXPONENT)
        }

        /// Returns true once a usable public key is configured.
        #[must_use]
        pub fn is_configured(&self) -> bool {
            self.key.is_some()
        }

        /// Like [`SignatureVerifier::verify`], but tells a missing key apart
        /// from a bad signature.
        pub fn try_verify(&self, message: &[u8], signature: &[u8]) -> LicenseResult<()> {
            let key = self
                .key
                .as_ref()
                .ok_or_else(|| Error::signature_verifier(reason::signature_verifier::KEY_NOT_SET))?;

            let digest = Sha256::digest(message);
            key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
                .map_err(|_| Error::signature_verifier(reason::signature_verifier::INVALID_SIGNATURE))
        }

        fn rebuild(&mut self, failure: i32) -> LicenseResult<()> {
            let Some(n) = self.modulus.clone() else {
                return Ok(());
            };
            match RsaPublicKey::new(n, self.exponent.clone()) {
                Ok(key) => {
                    debug!(bits = key_bits(&key), "RSA public key configured");
                    self.key = Some(key);
                    Ok(())
                }
                Err(e) => {
                    warn!("rejected RSA public key: {e}");
                    self.key = None;
                    Err(Error::signature_verifier(failure))
                }
            }
        }
    }

    fn key_bits(key: &RsaPublicKey) -> usize {
        use rsa::traits::PublicKeyParts;
        key.size() * 8
    }

    fn decode_nonempty(input: &str) -> Option<Vec<u8>> {
        BASE64.decode(input.trim()).ok().filter(|b| !b.is_empty())
    }

    impl SignatureVerifier for RsaSha256Verifier {
        fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
            self.try_verify(message, signature).is_ok()
        }
    }
}
