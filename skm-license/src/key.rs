//! Verified license keys.
//!
//! A [`LicenseKey`] is the result of a successful activation: the typed
//! [`LicenseKeyInformation`] together with the [`RawLicenseKey`] it was
//! decoded from, so the signed reply can be stored and re-verified later.

use crate::checker::LicenseKeyChecker;
use crate::error::LicenseResult;
use crate::info::LicenseKeyInformation;
use crate::raw::RawLicenseKey;

/// A verified, decoded license key.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseKey {
    info: LicenseKeyInformation,
    raw: RawLicenseKey,
}

impl LicenseKey {
    /// Decodes the fields of a verified raw key.
    ///
    /// # Errors
    ///
    /// Fails when [`LicenseKeyInformation::make`] does.
    pub fn make(raw: RawLicenseKey) -> LicenseResult<Self> {
        let info = LicenseKeyInformation::make(&raw)?;
        Ok(Self { info, raw })
    }

    /// Returns the decoded license fields.
    #[must_use]
    pub fn info(&self) -> &LicenseKeyInformation {
        &self.info
    }

    /// Returns the signed payload this key was decoded from.
    #[must_use]
    pub fn raw(&self) -> &RawLicenseKey {
        &self.raw
    }

    /// Splits the key into its parts.
    #[must_use]
    pub fn into_parts(self) -> (LicenseKeyInformation, RawLicenseKey) {
        (self.info, self.raw)
    }

    /// Starts a fluent check of this license.
    #[must_use]
    pub fn check(&self) -> LicenseKeyChecker<'_> {
        self.info.check()
    }

    #[must_use]
    pub fn product_id(&self) -> i32 {
        self.info.product_id()
    }

    /// Returns true if the key is unblocked and has not expired at the current system time.
    #[must_use]
    pub fn is_valid_now(&self) -> bool {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        self.check().is_not_blocked().has_not_expired(now).passed()
    }
}
