use skm_license::response::decode;
use skm_license::{reason, Envelope, ServerError, Subsystem};

#[test]
fn success_envelope() {
    let env = decode(r#"{"result":0,"licenseKey":"eyJ9","signature":"c2ln"}"#).unwrap();
    assert_eq!(
        env,
        Envelope {
            license_key: "eyJ9".to_string(),
            signature: "c2ln".to_string(),
        }
    );
}

#[test]
fn not_json() {
    let err = decode("<html>502 Bad Gateway</html>").unwrap_err();
    assert_eq!(err.subsystem(), Subsystem::Json);
    assert_eq!(err.reason(), reason::json::PARSE);
}

#[test]
fn json_but_not_an_object() {
    let err = decode("[1,2,3]").unwrap_err();
    assert_eq!(err.subsystem(), Subsystem::Json);
}

#[test]
fn key_not_found_message() {
    let err = decode(r#"{"result":1,"message":"Key not found."}"#).unwrap_err();
    assert_eq!(err.subsystem(), Subsystem::Main);
    assert_eq!(err.reason(), reason::main::KEY_NOT_FOUND);
}

#[test]
fn known_server_messages() {
    let cases = [
        ("Unable to authenticate.", ServerError::InvalidAccessToken),
        ("Access denied.", ServerError::AccessDenied),
        ("The input parameters were incorrect.", ServerError::IncorrectInputParameter),
        ("Could not find the product.", ServerError::ProductNotFound),
        ("Could not find the key.", ServerError::KeyNotFound),
        ("The key is blocked and cannot be accessed.", ServerError::KeyBlocked),
        (
            "Cannot activate the new device as the limit has been reached.",
            ServerError::DeviceLimitReached,
        ),
    ];
    for (message, expected) in cases {
        let body = format!(r#"{{"result":1,"message":"{message}"}}"#);
        let err = decode(&body).unwrap_err();
        assert_eq!(err.main_reason(), Some(expected), "message: {message}");
    }
}

#[test]
fn unknown_message_maps_to_stable_code() {
    let err = decode(r#"{"result":1,"message":"Server is taking a nap."}"#).unwrap_err();
    assert_eq!(err.subsystem(), Subsystem::Main);
    assert_eq!(err.reason(), reason::main::UNKNOWN_SERVER_ERROR);
}

#[test]
fn failure_without_message() {
    for body in [
        r#"{"result":1}"#,
        r#"{"result":1,"message":null}"#,
        r#"{"result":1,"message":42}"#,
        r#"{"msg":"Access denied."}"#,
    ] {
        let err = decode(body).unwrap_err();
        assert_eq!(err.main_reason(), Some(ServerError::UnknownServerReply), "body: {body}");
    }
}

#[test]
fn missing_result_uses_message() {
    let err = decode(r#"{"message":"Access denied."}"#).unwrap_err();
    assert_eq!(err.main_reason(), Some(ServerError::AccessDenied));
}

#[test]
fn success_requires_license_and_signature() {
    for body in [
        r#"{"result":0,"signature":"c2ln"}"#,
        r#"{"result":0,"licenseKey":"eyJ9"}"#,
        r#"{"result":0,"licenseKey":null,"signature":"c2ln"}"#,
        r#"{"result":0,"licenseKey":"eyJ9","signature":null}"#,
        r#"{"result":0,"licenseKey":12,"signature":"c2ln"}"#,
    ] {
        let err = decode(body).unwrap_err();
        assert_eq!(err.subsystem(), Subsystem::Main, "body: {body}");
        assert_eq!(err.reason(), reason::main::UNKNOWN_SERVER_REPLY, "body: {body}");
    }
}
