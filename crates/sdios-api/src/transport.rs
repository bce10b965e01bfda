//! HTTP client construction shared by the token manager and the driver.

use std::time::Duration;

use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::error::{SdiosError, SdiosResult};
use crate::types::ClientConfig;
use crate::version::ApiVersion;

/// Build the `reqwest` client for one driver.
pub fn build_client(config: &ClientConfig) -> SdiosResult<Client> {
    if config.insecure {
        warn!(
            "TLS certificate verification disabled for {}",
            config.domain
        );
    }
    Client::builder()
        .danger_accept_invalid_certs(config.insecure)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| SdiosError::config(format!("Failed to build HTTP client: {e}")))
}

/// `application/json; version=X` when a version is pinned.
pub fn accept_header(version: Option<&ApiVersion>) -> Option<String> {
    version.map(|v| format!("application/json; version={v}"))
}

/// Headers every request carries regardless of auth state.
pub fn version_headers(version: Option<&ApiVersion>) -> SdiosResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(accept) = accept_header(version) {
        headers.insert(ACCEPT, header_value(&accept)?);
    }
    Ok(headers)
}

pub(crate) fn header_value(raw: &str) -> SdiosResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| SdiosError::config(format!("Invalid header value: {e}")))
}
