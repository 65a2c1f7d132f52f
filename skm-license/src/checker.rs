//! Fluent checks over a license.
//!
//! ```ignore
//! if key.check().has_not_expired(now).has_feature(1).is_not_blocked().passed() {
//!     enable_pro_features();
//! }
//! ```
//!
//! Every predicate in a chain runs and is ANDed into the result, in call order.

use tracing::warn;

use crate::info::LicenseKeyInformation;

/// Accumulates predicates over a [`LicenseKeyInformation`].
#[derive(Debug, Clone, Copy)]
#[must_use = "a checker does nothing unless its result is read"]
pub struct LicenseKeyChecker<'a> {
    info: &'a LicenseKeyInformation,
    status: bool,
}

impl<'a> LicenseKeyChecker<'a> {
    pub(crate) fn new(info: &'a LicenseKeyInformation) -> Self {
        Self { info, status: true }
    }

    fn and(mut self, ok: bool) -> Self {
        self.status &= ok;
        self
    }

    /// The license has expired at `now` (Unix seconds): `expires <= now`.
    pub fn has_expired(self, now: u64) -> Self {
        let ok = self.info.expires() <= now;
        self.and(ok)
    }

    /// The license is still valid at `now`: `expires > now`.
    pub fn has_not_expired(self, now: u64) -> Self {
        let ok = self.info.expires() > now;
        self.and(ok)
    }

    /// Feature flag `n` (1 to 8) is set. Out-of-range features are never set.
    pub fn has_feature(self, n: u32) -> Self {
        let ok = self.feature(n).unwrap_or(false);
        self.and(ok)
    }

    /// Feature flag `n` (1 to 8) is not set. Out-of-range features fail this check too.
    pub fn has_not_feature(self, n: u32) -> Self {
        let ok = self.feature(n).is_some_and(|f| !f);
        self.and(ok)
    }

    pub fn is_blocked(self) -> Self {
        let ok = self.info.block();
        self.and(ok)
    }

    pub fn is_not_blocked(self) -> Self {
        let ok = !self.info.block();
        self.and(ok)
    }

    /// The key was issued as a trial activation.
    pub fn is_trial(self) -> Self {
        let ok = self.info.trial_activation();
        self.and(ok)
    }

    /// `machine_code` is among the activated machines.
    ///
    /// Fails if activated machines were not requested with `FieldsToReturn`.
    pub fn is_on_right_machine(self, machine_code: &str) -> Self {
        let ok = self
            .info
            .activated_machines()
            .is_some_and(|machines| machines.iter().any(|m| m.mid == machine_code));
        self.and(ok)
    }

    /// Another machine can still be activated.
    ///
    /// A missing or zero machine limit means unlimited. With a limit set,
    /// fails if activated machines were not requested with `FieldsToReturn`.
    pub fn has_machine_slots_left(self) -> Self {
        let ok = match self.info.maxnoofmachines() {
            None | Some(0) => true,
            Some(max) => self.info.activated_machines().is_some_and(|machines| {
                usize::try_from(max).is_ok_and(|max| machines.len() < max)
            }),
        };
        self.and(ok)
    }

    /// Returns the conjunction of every predicate called so far.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status
    }

    fn feature(&self, n: u32) -> Option<bool> {
        let flag = self.info.feature(n);
        if flag.is_none() {
            warn!(feature = n, "feature number out of range 1..=8");
        }
        flag
    }
}

impl From<LicenseKeyChecker<'_>> for bool {
    fn from(checker: LicenseKeyChecker<'_>) -> Self {
        checker.status
    }
}

impl PartialEq<bool> for LicenseKeyChecker<'_> {
    fn eq(&self, other: &bool) -> bool {
        self.status == *other
    }
}
