//! Error types for the SDI OS API client core.

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdiosErrorKind {
    /// Operation needs an active token but none exists (never granted or revoked)
    NoActiveToken,
    /// Token grant or refresh rejected by the auth server
    CreateToken,
    /// Token revocation rejected by the auth server
    RevokeToken,
    /// No version range of an endpoint matches the requested API version
    InvalidUrl,
    /// Version string could not be parsed
    InvalidVersion,
    /// Endpoint template could not be rendered with the supplied args
    UrlFormat,
    /// Version table entry rejected (overlapping ranges, duplicates)
    InvalidTable,
    /// Bad client configuration
    Config,
    /// Server unreachable
    Connection,
    /// Timeout
    Timeout,
    /// JSON encode / decode error
    Serialization,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{kind:?}] {message}")]
pub struct SdiosError {
    pub kind: SdiosErrorKind,
    pub message: String,
    /// HTTP status of the auth-server reply, when one was received.
    pub status: Option<u16>,
}

impl SdiosError {
    pub fn new(kind: SdiosErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn no_active_token() -> Self {
        Self::new(
            SdiosErrorKind::NoActiveToken,
            "API token is no longer active. Please request a new token.",
        )
    }

    pub fn create_token(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::CreateToken, msg)
    }

    pub fn revoke_token(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::RevokeToken, msg)
    }

    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::InvalidUrl, msg)
    }

    pub fn invalid_version(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::InvalidVersion, msg)
    }

    pub fn url_format(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::UrlFormat, msg)
    }

    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::InvalidTable, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::Config, msg)
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::Connection, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::Timeout, msg)
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::new(SdiosErrorKind::Serialization, msg)
    }

    pub fn is_kind(&self, kind: SdiosErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<SdiosError> for String {
    fn from(e: SdiosError) -> String {
        e.to_string()
    }
}

impl From<reqwest::Error> for SdiosError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(SdiosErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for SdiosError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {e}"))
    }
}

/// Convenience alias.
pub type SdiosResult<T> = Result<T, SdiosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = SdiosError::invalid_version("bad");
        assert_eq!(err.to_string(), "[InvalidVersion] bad");
    }

    #[test]
    fn with_status_is_kept() {
        let err = SdiosError::create_token("rejected").with_status(401);
        assert_eq!(err.status, Some(401));
        assert!(err.is_kind(SdiosErrorKind::CreateToken));
    }

    #[test]
    fn json_error_maps_to_serialization() {
        let raw = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SdiosError = raw.into();
        assert_eq!(err.kind, SdiosErrorKind::Serialization);
    }
}
