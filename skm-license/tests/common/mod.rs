//! Shared test helpers for activation tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use skm_license::{Error, LicenseResult, RequestHandler, SignatureVerifier};

/// Installs a test log subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Stand-in signing scheme: every payload byte XORed with a fixed mask.
pub fn test_sign(message: &[u8]) -> Vec<u8> {
    message.iter().map(|b| b ^ 0x5a).collect()
}

/// Accepts exactly the signatures produced by [`test_sign`].
pub struct XorVerifier;

impl SignatureVerifier for XorVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        test_sign(message) == signature
    }
}

/// Gives a fixed answer for every signature.
pub struct FixedVerifier(pub bool);

impl SignatureVerifier for FixedVerifier {
    fn verify(&self, _message: &[u8], _signature: &[u8]) -> bool {
        self.0
    }
}

/// Returns a canned response and records every request it receives.
pub struct ScriptedTransport {
    response: LicenseResult<String>,
    pub requests: RefCell<Vec<(String, BTreeMap<String, String>)>>,
}

impl ScriptedTransport {
    pub fn replying(body: impl Into<String>) -> Self {
        Self {
            response: Ok(body.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(error: Error) -> Self {
        Self {
            response: Err(error),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl RequestHandler for ScriptedTransport {
    fn make_request(&self, method: &str, params: &BTreeMap<String, String>) -> LicenseResult<String> {
        self.requests
            .borrow_mut()
            .push((method.to_string(), params.clone()));
        self.response.clone()
    }
}

/// A payload with every mandatory field set.
pub fn payload_json(product_id: i32, expires: u64) -> String {
    format!(
        r#"{{"ProductId":{product_id},"Created":1500000000,"Expires":{expires},"Period":30,"Block":false,"TrialActivation":false,"SignDate":1600000000,"F1":true,"F2":false,"F3":true,"F4":false,"F5":false,"F6":false,"F7":false,"F8":true}}"#
    )
}

/// A payload with every mandatory and optional field set.
pub fn full_payload_json() -> String {
    r#"{
        "ProductId": 3646,
        "ID": 12,
        "Key": "MPDWY-PQAOW-FKSCH-SGAAU",
        "Created": 1500000000,
        "Expires": 1900000000,
        "Period": 365,
        "F1": true, "F2": false, "F3": false, "F4": false,
        "F5": false, "F6": false, "F7": true, "F8": false,
        "Notes": "reseller order 991",
        "Block": false,
        "GlobalId": 77,
        "Customer": {"Id": 5, "Name": "Ada", "Email": "ada@example.com", "CompanyName": null, "Created": 1400000000},
        "ActivatedMachines": [
            {"Mid": "289jf2afs3", "IP": "10.0.0.1", "Time": 1550000000},
            {"Mid": "otherbox", "IP": "10.0.0.2", "Time": 1560000000, "FriendlyName": "build server"}
        ],
        "TrialActivation": false,
        "MaxNoOfMachines": 3,
        "AllowedMachines": "289jf2afs3",
        "DataObjects": [{"Id": 1, "Name": "seats", "StringValue": null, "IntValue": 10}],
        "SignDate": 1600000000
    }"#
    .to_string()
}

/// Encodes a payload and its [`test_sign`] signature.
pub fn sign_payload(payload: &str) -> (String, String) {
    let license = BASE64.encode(payload.as_bytes());
    let signature = BASE64.encode(test_sign(payload.as_bytes()));
    (license, signature)
}

/// A successful Activate response carrying `payload`.
pub fn success_response(payload: &str) -> String {
    let (license, signature) = sign_payload(payload);
    format!(r#"{{"result":0,"licenseKey":"{license}","signature":"{signature}"}}"#)
}

/// A failed Activate response with `message`.
pub fn failure_response(message: &str) -> String {
    format!(r#"{{"result":1,"message":"{message}"}}"#)
}
