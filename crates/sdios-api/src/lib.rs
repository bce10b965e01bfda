//! # SDI OS API – client core
//!
//! Async client for the SDI OS virtualization-management REST API:
//! version-aware endpoint routing, OAuth2 password-grant tokens with lazy
//! refresh, and a uniform response wrapper.
//!
//! ## Modules
//!
//! - **types**: Config, credentials, HTTP verbs, request payloads
//! - **error**: Crate-specific error types
//! - **version**: API versions and inclusive version ranges
//! - **urls**: Category / operation endpoint table (built-in SDI OS table)
//! - **resolver**: Picks the template valid for an API version
//! - **transport**: `reqwest` client construction, version headers
//! - **token**: Token grant / refresh / revoke
//! - **context**: User / SDI / machine ids merged into URL args
//! - **driver**: Request dispatcher
//! - **response**: Read-only response wrapper
//! - **format**: JSON output formatting

pub mod types;
pub mod error;
pub mod version;
pub mod urls;
pub mod resolver;
pub mod transport;
pub mod token;
pub mod context;
pub mod driver;
pub mod response;
pub mod format;

pub use context::RequestContext;
pub use driver::{ApiDriver, ApiRequest};
pub use error::{SdiosError, SdiosErrorKind, SdiosResult};
pub use format::JsonFormatter;
pub use response::ApiResponse;
pub use token::{Token, TokenManager};
pub use types::{ClientConfig, Credentials, FilePart, HttpMethod, Payload, Scheme};
pub use urls::{ApiCategory, Endpoint, EndpointTemplate, VersionTable, CURRENT_API_VERSION};
pub use version::{ApiVersion, VersionRange};
