//! Typed view of a verified license payload.
//!
//! Field names follow the Web API's wire format (`ProductId`, `Created`,
//! `F1`..`F8`, ...). Optional fields are only present when they were requested
//! through `FieldsToReturn`; a missing optional field and an explicit `null`
//! both decode to `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::checker::LicenseKeyChecker;
use crate::error::{reason, Error, LicenseResult};
use crate::raw::RawLicenseKey;

/// The customer a license is registered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "CompanyName", default)]
    pub company_name: Option<String>,
    /// Unix timestamp.
    #[serde(rename = "Created")]
    pub created: u64,
}

/// A device the license has been activated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationData {
    /// Machine code.
    #[serde(rename = "Mid")]
    pub mid: String,
    #[serde(rename = "IP")]
    pub ip: String,
    /// Activation time, Unix timestamp.
    #[serde(rename = "Time")]
    pub time: u64,
    #[serde(rename = "FriendlyName", default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

/// A name/value record attached to a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataObject {
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "StringValue", default)]
    pub string_value: Option<String>,
    #[serde(rename = "IntValue")]
    pub int_value: i64,
}

/// Immutable license record decoded from a verified payload.
///
/// Build one with [`LicenseKeyInformation::make`]; use [`check`](Self::check)
/// to test business rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseKeyInformation {
    #[serde(rename = "ProductId")]
    product_id: i32,
    #[serde(rename = "Created")]
    created: u64,
    #[serde(rename = "Expires")]
    expires: u64,
    #[serde(rename = "Period")]
    period: i32,
    #[serde(rename = "Block")]
    block: bool,
    #[serde(rename = "TrialActivation")]
    trial_activation: bool,
    #[serde(rename = "SignDate")]
    sign_date: u64,
    #[serde(rename = "F1")]
    f1: bool,
    #[serde(rename = "F2")]
    f2: bool,
    #[serde(rename = "F3")]
    f3: bool,
    #[serde(rename = "F4")]
    f4: bool,
    #[serde(rename = "F5")]
    f5: bool,
    #[serde(rename = "F6")]
    f6: bool,
    #[serde(rename = "F7")]
    f7: bool,
    #[serde(rename = "F8")]
    f8: bool,

    #[serde(rename = "ID", alias = "Id", default)]
    id: Option<i32>,
    #[serde(rename = "Key", default)]
    key: Option<String>,
    #[serde(rename = "Notes", default)]
    notes: Option<String>,
    #[serde(rename = "GlobalId", default)]
    global_id: Option<i32>,
    #[serde(rename = "Customer", default)]
    customer: Option<Customer>,
    #[serde(rename = "ActivatedMachines", default)]
    activated_machines: Option<Vec<ActivationData>>,
    #[serde(rename = "MaxNoOfMachines", alias = "Maxnoofmachines", default)]
    maxnoofmachines: Option<i32>,
    #[serde(rename = "AllowedMachines", default)]
    allowed_machines: Option<String>,
    #[serde(rename = "DataObjects", default)]
    data_objects: Option<Vec<DataObject>>,
}

impl LicenseKeyInformation {
    /// Decodes the fields of a verified [`RawLicenseKey`].
    ///
    /// # Errors
    ///
    /// [`Subsystem::Main`](crate::Subsystem::Main) / `UNKNOWN_SERVER_REPLY` if a
    /// mandatory field is missing or any field has the wrong type.
    pub fn make(raw: &RawLicenseKey) -> LicenseResult<Self> {
        serde_json::from_value(Value::Object(raw.fields().clone())).map_err(|e| {
            warn!("license payload has unexpected shape: {e}");
            Error::main(reason::main::UNKNOWN_SERVER_REPLY)
        })
    }

    /// Starts a fluent check of this license.
    #[must_use]
    pub fn check(&self) -> LicenseKeyChecker<'_> {
        LicenseKeyChecker::new(self)
    }

    #[must_use]
    pub fn product_id(&self) -> i32 {
        self.product_id
    }

    /// Creation time, Unix timestamp.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Expiry time, Unix timestamp.
    #[must_use]
    pub fn expires(&self) -> u64 {
        self.expires
    }

    /// Validity period in days; 0 means the key has no periodic expiry.
    #[must_use]
    pub fn period(&self) -> i32 {
        self.period
    }

    #[must_use]
    pub fn block(&self) -> bool {
        self.block
    }

    #[must_use]
    pub fn trial_activation(&self) -> bool {
        self.trial_activation
    }

    /// Time the server signed the reply, Unix timestamp.
    #[must_use]
    pub fn sign_date(&self) -> u64 {
        self.sign_date
    }

    #[must_use]
    pub fn f1(&self) -> bool {
        self.f1
    }

    #[must_use]
    pub fn f2(&self) -> bool {
        self.f2
    }

    #[must_use]
    pub fn f3(&self) -> bool {
        self.f3
    }

    #[must_use]
    pub fn f4(&self) -> bool {
        self.f4
    }

    #[must_use]
    pub fn f5(&self) -> bool {
        self.f5
    }

    #[must_use]
    pub fn f6(&self) -> bool {
        self.f6
    }

    #[must_use]
    pub fn f7(&self) -> bool {
        self.f7
    }

    #[must_use]
    pub fn f8(&self) -> bool {
        self.f8
    }

    /// Returns feature flag `n` (1 to 8), or `None` if `n` is out of range.
    #[must_use]
    pub fn feature(&self, n: u32) -> Option<bool> {
        let flag = match n {
            1 => self.f1,
            2 => self.f2,
            3 => self.f3,
            4 => self.f4,
            5 => self.f5,
            6 => self.f6,
            7 => self.f7,
            8 => self.f8,
            _ => return None,
        };
        Some(flag)
    }

    #[must_use]
    pub fn id(&self) -> Option<i32> {
        self.id
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn global_id(&self) -> Option<i32> {
        self.global_id
    }

    #[must_use]
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    #[must_use]
    pub fn activated_machines(&self) -> Option<&[ActivationData]> {
        self.activated_machines.as_deref()
    }

    /// Maximum number of machines; 0 means unlimited.
    #[must_use]
    pub fn maxnoofmachines(&self) -> Option<i32> {
        self.maxnoofmachines
    }

    #[must_use]
    pub fn allowed_machines(&self) -> Option<&str> {
        self.allowed_machines.as_deref()
    }

    #[must_use]
    pub fn data_objects(&self) -> Option<&[DataObject]> {
        self.data_objects.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.created)
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.expires)
    }

    #[must_use]
    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.sign_date)
    }
}

fn to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
}
