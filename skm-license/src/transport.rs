//! Transport capability.
//!
//! The activation pipeline only needs one thing from the network: send a named
//! Web API method with string parameters and hand back the response body.
//! [`HttpTransport`] does this with a blocking `reqwest` client when the
//! `online` feature is enabled.

use std::collections::BTreeMap;

use crate::error::LicenseResult;

/// Performs requests against the Web API.
///
/// Implementations report failures with [`Subsystem::RequestHandler`](crate::Subsystem::RequestHandler)
/// and put backend detail (such as an HTTP status) in `extra`.
pub trait RequestHandler {
    /// Calls `method` with `params` and returns the raw response body.
    fn make_request(&self, method: &str, params: &BTreeMap<String, String>) -> LicenseResult<String>;
}

impl<T: RequestHandler + ?Sized> RequestHandler for &T {
    fn make_request(&self, method: &str, params: &BTreeMap<String, String>) -> LicenseResult<String> {
        (**self).make_request(method, params)
    }
}

impl<T: RequestHandler + ?Sized> RequestHandler for Box<T> {
    fn make_request(&self, method: &str, params: &BTreeMap<String, String>) -> LicenseResult<String> {
        (**self).make_request(method, params)
    }
}

#[cfg(feature = "online")]
pub use http::{HttpTransport, HttpTransportConfig};

#[cfg(feature = "online")]
mod http {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use reqwest::blocking::Client;
    use serde::{Deserialize, Serialize};
    use tracing::{debug, warn};

    use super::RequestHandler;
    use crate::error::{reason, Error, LicenseResult};

    /// Settings for [`HttpTransport`].
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct HttpTransportConfig {
        /// Base URL of the key API; the method name is appended to it.
        pub base_url: String,
        /// Whole-request timeout in seconds.
        pub timeout_secs: u64,
        /// `User-Agent` header value.
        pub user_agent: String,
    }

    impl Default for HttpTransportConfig {
        fn default() -> Self {
            Self {
                base_url: "https://app.cryptolens.io/api/key/".to_string(),
                timeout_secs: 30,
                user_agent: format!("skm-license/{}", env!("CARGO_PKG_VERSION")),
            }
        }
    }

    /// Sends Web API requests as form-encoded HTTPS POSTs.
    ///
    /// Any response with a status below 500 is handed back as a body: the
    /// server reports business errors inside the JSON envelope. A 5xx status
    /// is a `RequestHandler`/`STATUS` error and its body is never parsed.
    pub struct HttpTransport {
        client: Client,
        base_url: String,
    }

    impl HttpTransport {
        /// Creates a transport with the default configuration.
        pub fn new() -> LicenseResult<Self> {
            Self::with_config(HttpTransportConfig::default())
        }

        /// Creates a transport from `config`.
        pub fn with_config(config: HttpTransportConfig) -> LicenseResult<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent)
                .build()
                .map_err(|e| {
                    warn!("failed to build HTTP client: {e}");
                    Error::request_handler(reason::request_handler::BUILD_CLIENT, 0)
                })?;

            let mut base_url = config.base_url;
            if !base_url.ends_with('/') {
                base_url.push('/');
            }

            Ok(Self { client, base_url })
        }

        /// Returns the URL a method is posted to.
        #[must_use]
        pub fn url_for(&self, method: &str) -> String {
            format!("{}{}", self.base_url, method)
        }
    }

    fn status_extra(e: &reqwest::Error) -> i32 {
        e.status().map_or(0, |s| i32::from(s.as_u16()))
    }

    impl RequestHandler for HttpTransport {
        fn make_request(
            &self,
            method: &str,
            params: &BTreeMap<String, String>,
        ) -> LicenseResult<String> {
            let url = self.url_for(method);
            debug!("POST {url}");

            let response = self.client.post(&url).form(params).send().map_err(|e| {
                warn!("request to {url} failed: {e}");
                let reason = if e.is_timeout() {
                    reason::request_handler::TIMEOUT
                } else {
                    reason::request_handler::CONNECT
                };
                Error::request_handler(reason, status_extra(&e))
            })?;

            let status = response.status();
            if status.is_server_error() {
                warn!("server returned {status} for {method}");
                return Err(Error::request_handler(
                    reason::request_handler::STATUS,
                    i32::from(status.as_u16()),
                ));
            }

            response.text().map_err(|e| {
                warn!("failed to read response body: {e}");
                Error::request_handler(reason::request_handler::BODY, i32::from(status.as_u16()))
            })
        }
    }
}
