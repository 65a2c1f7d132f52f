use skm_license::{reason, Call, Error, ServerError, Subsystem};

#[test]
fn default_is_empty() {
    let err = Error::default();
    assert!(!err.is_err());
    assert_eq!(err.subsystem(), Subsystem::None);
    assert_eq!(err.call(), None);
}

#[test]
fn set_records_failure() {
    let mut err = Error::default();
    err.set(Subsystem::RequestHandler, reason::request_handler::CONNECT, 7);
    assert!(err.is_err());
    assert_eq!(err.subsystem(), Subsystem::RequestHandler);
    assert_eq!(err.reason(), reason::request_handler::CONNECT);
    assert_eq!(err.extra(), 7);
}

#[test]
fn set_never_overwrites_first_failure() {
    let mut err = Error::json(reason::json::PARSE);
    err.set(Subsystem::Main, reason::main::KEY_BLOCKED, 3);
    assert_eq!(err.subsystem(), Subsystem::Json);
    assert_eq!(err.reason(), reason::json::PARSE);
    assert_eq!(err.extra(), 0);
}

#[test]
fn set_call_only_touches_call() {
    let mut err = Error::request_handler(reason::request_handler::STATUS, 503);
    err.set_call(Call::ActivateRaw);
    err.set_call(Call::Activate);
    assert_eq!(err.call(), Some(Call::Activate));
    assert_eq!(err.subsystem(), Subsystem::RequestHandler);
    assert_eq!(err.reason(), reason::request_handler::STATUS);
    assert_eq!(err.extra(), 503);
}

#[test]
fn set_call_on_empty_error_is_ignored() {
    let err = Error::default().with_call(Call::Activate);
    assert!(!err.is_err());
    assert_eq!(err.call(), None);
}

#[test]
fn main_reason_decodes_codes() {
    let err = Error::main(reason::main::KEY_NOT_FOUND);
    assert_eq!(err.main_reason(), Some(ServerError::KeyNotFound));

    let err = Error::signature_verifier(reason::signature_verifier::INVALID_SIGNATURE);
    assert_eq!(err.main_reason(), None);
}

#[test]
fn server_error_codes_roundtrip() {
    let all = [
        ServerError::UnknownServerReply,
        ServerError::InvalidAccessToken,
        ServerError::AccessDenied,
        ServerError::IncorrectInputParameter,
        ServerError::ProductNotFound,
        ServerError::KeyNotFound,
        ServerError::KeyBlocked,
        ServerError::DeviceLimitReached,
        ServerError::UnknownServerError,
    ];
    for err in all {
        assert_eq!(ServerError::from_code(err.code()), Some(err));
    }
    assert_eq!(ServerError::from_code(0), None);
    assert_eq!(ServerError::from_code(1000), None);
}

#[test]
fn error_display() {
    let err = Error::request_handler(reason::request_handler::STATUS, 502);
    let msg = format!("{err}");
    assert!(msg.contains("request handler"));
    assert!(msg.contains("502"));
}

#[test]
fn error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<Error>();
    assert_error::<skm_license::ActivateError>();
}
