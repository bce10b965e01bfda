//! Read-only view over a resource-call response.

use std::fmt;

use bytes::Bytes;
use hyper::ext::ReasonPhrase;
use reqwest::header::ALLOW;
use reqwest::{Response, StatusCode};

use crate::error::SdiosResult;
use crate::format::JsonFormatter;
use crate::types::HttpMethod;

/// Normalised HTTP response returned by every driver call.
///
/// Non-2xx statuses are data here, not errors; branch on [`ok`](Self::ok).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    url: String,
    method: HttpMethod,
    /// Reason phrase sent by the server, when it differs from the canonical one
    reason: Option<String>,
    allow: Option<String>,
    body: Bytes,
}

impl ApiResponse {
    /// Drain a `reqwest` response into a wrapper.
    pub async fn from_reqwest(method: HttpMethod, resp: Response) -> SdiosResult<Self> {
        let status = resp.status();
        let url = resp.url().to_string();
        let reason = resp
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        let allow = resp
            .headers()
            .get(ALLOW)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;
        let mut wrapped = Self::from_parts(status, url, method, allow, body);
        wrapped.reason = reason;
        Ok(wrapped)
    }

    pub fn from_parts(
        status: StatusCode,
        url: impl Into<String>,
        method: HttpMethod,
        allow: Option<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            method,
            reason: None,
            allow,
            body: body.into(),
        }
    }

    /// Override the reason phrase, e.g. a server-specific one.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// e.g. 404 or 200.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Reason phrase as received, e.g. "Not Found" or "OK".
    ///
    /// Falls back to the canonical phrase; empty for non-standard codes
    /// the server sent without one.
    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }

    /// `status_code < 400`.
    pub fn ok(&self) -> bool {
        self.status.as_u16() < 400
    }

    /// Final URL of the request.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Verb sent to the server.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Methods the resource supports, from the `Allow` header.
    pub fn allow(&self) -> Vec<String> {
        self.allow
            .as_deref()
            .map(|raw| raw.split(", ").map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// JSON body, or `None` when empty or not JSON.
    pub fn detail(&self) -> Option<serde_json::Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Raw body as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Multi-line summary using `formatter` for the detail block.
    pub fn render(&self, formatter: &JsonFormatter) -> String {
        let detail = match self.detail() {
            Some(value) => formatter.format_value(&value),
            None => "null".to_string(),
        };
        let allow = format!("[{}]", self.allow().join(", "));
        let status = self.status_code();
        let reason = self.reason();
        let ok = self.ok();
        let rows: [(&str, &dyn fmt::Display); 7] = [
            ("Detail", &detail),
            ("Method", &self.method),
            ("Status Code", &status),
            ("Reason", &reason),
            ("Ok", &ok),
            ("URL", &self.url),
            ("Allow", &allow),
        ];
        rows.iter()
            .map(|(label, value)| format!(" {label:>11}: {value}\n"))
            .collect()
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&JsonFormatter::default()))
    }
}
