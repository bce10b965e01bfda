//! Request dispatcher for the SDI OS REST API.
//!
//! Resolves `(category, operation)` through the version table, keeps the
//! OAuth token fresh and sends the call to `{scheme}://{domain}/api/...`.
//! Non-2xx replies come back as [`ApiResponse`] values, never as errors.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tokio::sync::{Mutex, MutexGuard};

use crate::context::RequestContext;
use crate::error::{SdiosError, SdiosResult};
use crate::format::JsonFormatter;
use crate::resolver;
use crate::response::ApiResponse;
use crate::token::TokenManager;
use crate::transport::{build_client, header_value, version_headers};
use crate::types::{ClientConfig, Credentials, FilePart, HttpMethod, Payload};
use crate::urls::{ApiCategory, VersionTable};
use crate::version::ApiVersion;

/// Lifetime of a one-time login token when none is given.
pub const DEFAULT_ONE_TIME_LOGIN_SECS: u64 = 900;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Request
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One resource call, built up before it is handed to [`ApiDriver::call`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: HttpMethod,
    category: ApiCategory,
    operation: String,
    args: HashMap<String, String>,
    payload: Payload,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, category: ApiCategory, operation: impl Into<String>) -> Self {
        Self {
            method,
            category,
            operation: operation.into(),
            args: HashMap::new(),
            payload: Payload::None,
        }
    }

    /// Set a URL placeholder value, replacing any earlier one.
    pub fn arg(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.args.insert(name.into(), value.to_string());
        self
    }

    pub fn args<'a>(mut self, args: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (name, value) in args {
            self.args.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Fill missing URL args from `ctx`.
    pub fn context(mut self, ctx: &RequestContext) -> Self {
        ctx.merge_into(&mut self.args);
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Serialise any `Serialize` value as the JSON body.
    pub fn body<T: Serialize + ?Sized>(self, body: &T) -> SdiosResult<Self> {
        let value = serde_json::to_value(body)?;
        Ok(self.json(value))
    }

    pub fn files(mut self, parts: Vec<FilePart>) -> Self {
        self.payload = Payload::Files(parts);
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn category(&self) -> ApiCategory {
        self.category
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn url_args(&self) -> &HashMap<String, String> {
        &self.args
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Driver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// SDI OS API client for one server and one user.
pub struct ApiDriver {
    client: Client,
    base_url: String,
    api_version: Option<ApiVersion>,
    table: Arc<VersionTable>,
    tokens: Mutex<TokenManager>,
    formatter: JsonFormatter,
}

impl ApiDriver {
    /// Build a driver from config (does NOT request a token yet).
    pub fn new(config: &ClientConfig) -> SdiosResult<Self> {
        let api_version = config.validate()?;
        let client = build_client(config)?;
        let tokens = TokenManager::new(client.clone(), config)?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            api_version,
            table: VersionTable::standard(),
            tokens: Mutex::new(tokens),
            formatter: JsonFormatter::from_config(config),
        })
    }

    /// Build a driver and request its first token.
    pub async fn connect(config: &ClientConfig, credentials: Credentials) -> SdiosResult<Self> {
        let driver = Self::new(config)?;
        driver.login(credentials).await?;
        Ok(driver)
    }

    /// Use a custom endpoint table instead of the built-in one.
    pub fn with_table(mut self, table: Arc<VersionTable>) -> Self {
        self.table = table;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn table(&self) -> &VersionTable {
        &self.table
    }

    pub fn formatter(&self) -> &JsonFormatter {
        &self.formatter
    }

    /// Pinned API version; `None` means most current.
    pub fn api_version(&self) -> Option<&ApiVersion> {
        self.api_version.as_ref()
    }

    /// Pin (or unpin) the API version used for routing and `Accept` headers.
    pub fn set_api_version(&mut self, version: Option<&str>) -> SdiosResult<()> {
        let version = version.map(ApiVersion::coerce).transpose()?;
        self.api_version = version;
        self.tokens.get_mut().set_api_version(version);
        Ok(())
    }

    // ── Token ───────────────────────────────────────────────────────

    /// Request a token with the password grant.
    pub async fn login(&self, credentials: Credentials) -> SdiosResult<()> {
        self.tokens.lock().await.request(credentials).await
    }

    /// Exclusive access to the token manager, e.g. to inspect or revoke.
    pub async fn token(&self) -> MutexGuard<'_, TokenManager> {
        self.tokens.lock().await
    }

    /// Refresh once if expired, then read the header under the same lock.
    async fn fresh_authorization(&self) -> SdiosResult<String> {
        let mut tokens = self.tokens.lock().await;
        if tokens.is_expired() {
            debug!("API token expired, refreshing");
            tokens.refresh().await?;
        }
        tokens.authorization()
    }

    // ── Dispatch ────────────────────────────────────────────────────

    pub async fn call(&self, request: ApiRequest) -> SdiosResult<ApiResponse> {
        let ApiRequest {
            method,
            category,
            operation,
            args,
            payload,
        } = request;

        let endpoint = self.table.endpoint(category, &operation)?;
        let template = resolver::resolve(endpoint, self.api_version.as_ref())?;
        let path = template.render(&args)?;
        if !endpoint.allows(method) {
            warn!("{method} is not listed for {category}/{operation}, sending anyway");
        }

        let authorization = self.fresh_authorization().await?;

        let mut headers = version_headers(self.api_version.as_ref())?;
        headers.insert(AUTHORIZATION, header_value(&authorization)?);

        let url = format!("{}/api/{}", self.base_url, path);
        debug!("{method} {url}");

        let payload = if method.has_body() {
            Some(payload)
        } else {
            if !payload.is_none() {
                warn!("Ignoring request body for {method} {url}");
            }
            None
        };

        let builder = self.client.request(method.into(), &url);
        let builder = match payload {
            Some(Payload::Files(parts)) if !parts.is_empty() => {
                builder.headers(headers).multipart(multipart_form(parts)?)
            }
            Some(Payload::Json(value)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                builder.headers(headers).body(serde_json::to_vec(&value)?)
            }
            Some(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                builder.headers(headers).body("{}")
            }
            None => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                builder.headers(headers)
            }
        };

        let resp = builder.send().await?;
        ApiResponse::from_reqwest(method, resp).await
    }

    // ── Per-verb helpers ────────────────────────────────────────────

    pub async fn get(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
    ) -> SdiosResult<ApiResponse> {
        self.call(ApiRequest::new(HttpMethod::Get, category, operation).args(args.iter().copied()))
            .await
    }

    pub async fn head(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
    ) -> SdiosResult<ApiResponse> {
        self.call(ApiRequest::new(HttpMethod::Head, category, operation).args(args.iter().copied()))
            .await
    }

    pub async fn options(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
    ) -> SdiosResult<ApiResponse> {
        self.call(
            ApiRequest::new(HttpMethod::Options, category, operation).args(args.iter().copied()),
        )
        .await
    }

    pub async fn delete(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
    ) -> SdiosResult<ApiResponse> {
        self.call(ApiRequest::new(HttpMethod::Delete, category, operation).args(args.iter().copied()))
            .await
    }

    pub async fn post(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
        payload: Payload,
    ) -> SdiosResult<ApiResponse> {
        self.call(
            ApiRequest::new(HttpMethod::Post, category, operation)
                .args(args.iter().copied())
                .payload(payload),
        )
        .await
    }

    pub async fn put(
        &self,
        category: ApiCategory,
        operation: &str,
        args: &[(&str, &str)],
        payload: Payload,
    ) -> SdiosResult<ApiResponse> {
        self.call(
            ApiRequest::new(HttpMethod::Put, category, operation)
                .args(args.iter().copied())
                .payload(payload),
        )
        .await
    }

    /// Create a token that logs `user_pk` in once, valid for `expires_secs`
    /// (900 s when `None`).
    pub async fn create_one_time_login(
        &self,
        user_pk: u64,
        expires_secs: Option<u64>,
    ) -> SdiosResult<ApiResponse> {
        let body = json!({
            "user": user_pk,
            "expires": expires_secs.unwrap_or(DEFAULT_ONE_TIME_LOGIN_SECS),
        });
        self.call(ApiRequest::new(HttpMethod::Post, ApiCategory::Authentication, "token").json(body))
            .await
    }
}

impl std::fmt::Debug for ApiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDriver")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("endpoints", &self.table.len())
            .finish()
    }
}

fn multipart_form(parts: Vec<FilePart>) -> SdiosResult<Form> {
    let mut form = Form::new();
    for file in parts {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime {
            part = part.mime_str(&mime).map_err(|e| {
                SdiosError::serialization(format!("Invalid MIME type {mime:?}: {e}"))
            })?;
        }
        form = form.part(file.field, part);
    }
    Ok(form)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdiosErrorKind;
    use crate::types::Scheme;
    use crate::urls::Endpoint;
    use crate::version::VersionRange;
    use httpmock::prelude::*;

    fn creds() -> Credentials {
        Credentials::new("admin", "hunter2", "cid", "csecret")
    }

    fn config(server: &MockServer, version: Option<&str>) -> ClientConfig {
        let mut config = ClientConfig::new(server.address().to_string()).with_scheme(Scheme::Http);
        config.api_version = version.map(str::to_string);
        config
    }

    fn grant_body(access: &str, refresh: &str, expires_in: u64) -> serde_json::Value {
        json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "Bearer",
            "expires_in": expires_in,
        })
    }

    async fn mock_grant(server: &MockServer, expires_in: u64) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/o/token/")
                    .x_www_form_urlencoded_tuple("grant_type", "password");
                then.status(200).json_body(grant_body("acc-1", "ref-1", expires_in));
            })
            .await
    }

    async fn logged_in(server: &MockServer, version: Option<&str>) -> ApiDriver {
        mock_grant(server, 900).await;
        ApiDriver::connect(&config(server, version), creds()).await.unwrap()
    }

    // ── No HTTP ───────────────────────────────────────────────────────

    #[test]
    fn request_builder_merges_context_as_defaults() {
        let ctx = RequestContext::new().with_user_pk(7).with_sdi("sdi-1");
        let req = ApiRequest::new(HttpMethod::Get, ApiCategory::Sdis, "user_detail")
            .arg("sdi_id", "sdi-9")
            .context(&ctx);
        assert_eq!(req.url_args()["sdi_id"], "sdi-9");
        assert_eq!(req.url_args()["pk"], "7");
        assert_eq!(req.operation(), "user_detail");
    }

    #[test]
    fn body_serialises_structs() {
        #[derive(Serialize)]
        struct Rename<'a> {
            name: &'a str,
        }
        let req = ApiRequest::new(HttpMethod::Put, ApiCategory::Sdis, "user_detail")
            .body(&Rename { name: "lab" })
            .unwrap();
        assert!(matches!(req.payload, Payload::Json(ref v) if v == &json!({"name": "lab"})));
    }

    #[test]
    fn bad_version_is_rejected_on_set() {
        let mut driver = ApiDriver::new(&ClientConfig::new("sdi.lab.local")).unwrap();
        assert_eq!(driver.api_version(), None);
        let err = driver.set_api_version(Some("two")).unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::InvalidVersion);
        driver.set_api_version(Some("1")).unwrap();
        assert_eq!(driver.api_version(), Some(&ApiVersion::new(1, 0, 0)));
    }

    #[tokio::test]
    async fn version_change_reaches_token_manager() {
        let mut driver = ApiDriver::new(&ClientConfig::new("sdi.lab.local")).unwrap();
        driver.set_api_version(Some("2.0")).unwrap();
        assert_eq!(driver.token().await.api_version(), Some(&ApiVersion::new(2, 0, 0)));
    }

    #[tokio::test]
    async fn call_without_login_is_no_active_token() {
        let driver = ApiDriver::new(&ClientConfig::new("sdi.lab.local")).unwrap();
        let err = driver.get(ApiCategory::Sdis, "list", &[]).await.unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::NoActiveToken);
    }

    #[tokio::test]
    async fn unknown_operation_is_invalid_url() {
        let driver = ApiDriver::new(&ClientConfig::new("sdi.lab.local")).unwrap();
        let err = driver.get(ApiCategory::Sdis, "no_such_thing", &[]).await.unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::InvalidUrl);
    }

    // ── httpmock tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn get_sends_bearer_and_accept() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, Some("2.1")).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/sdis/sdi-1/")
                    .header("authorization", "Bearer acc-1")
                    .header("accept", "application/json; version=2.1.0")
                    .header("content-type", "application/json");
                then.status(200)
                    .header("allow", "GET, PUT, DELETE, HEAD, OPTIONS")
                    .json_body(json!({"id": "sdi-1"}));
            })
            .await;

        let resp = driver
            .get(ApiCategory::Sdis, "user_detail", &[("sdi_id", "sdi-1")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(resp.ok());
        assert_eq!(resp.method(), HttpMethod::Get);
        assert_eq!(resp.detail(), Some(json!({"id": "sdi-1"})));
        assert_eq!(resp.allow(), vec!["GET", "PUT", "DELETE", "HEAD", "OPTIONS"]);
        assert!(resp.url().ends_with("/api/sdis/sdi-1/"));
    }

    #[tokio::test]
    async fn legacy_version_routes_to_legacy_path() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, Some("1.0")).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/clouds/7/sdi-1/");
                then.status(200).json_body(json!({}));
            })
            .await;

        let ctx = RequestContext::new().with_user_pk(7).with_sdi("sdi-1");
        let req = ApiRequest::new(HttpMethod::Get, ApiCategory::Sdis, "user_detail").context(&ctx);
        assert!(driver.call(req).await.unwrap().ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_exactly_once() {
        let server = MockServer::start_async().await;
        let grant = mock_grant(&server, 0).await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/o/token/")
                    .x_www_form_urlencoded_tuple("grant_type", "refresh_token")
                    .x_www_form_urlencoded_tuple("refresh_token", "ref-1");
                then.status(200).json_body(grant_body("acc-2", "ref-2", 900));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/sdis/")
                    .header("authorization", "Bearer acc-2");
                then.status(200).json_body(json!([]));
            })
            .await;

        let driver = ApiDriver::connect(&config(&server, None), creds()).await.unwrap();
        assert!(driver.token().await.is_expired());

        let resp = driver.get(ApiCategory::Sdis, "list", &[]).await.unwrap();
        assert!(resp.ok());
        grant.assert_hits_async(1).await;
        refresh.assert_hits_async(1).await;
        resource.assert_hits_async(1).await;

        // the refreshed token is still valid, no second refresh
        driver.get(ApiCategory::Sdis, "list", &[]).await.unwrap();
        refresh.assert_hits_async(1).await;
        resource.assert_hits_async(2).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_share_one_refresh() {
        let server = MockServer::start_async().await;
        mock_grant(&server, 0).await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/o/token/")
                    .x_www_form_urlencoded_tuple("grant_type", "refresh_token");
                then.status(200)
                    .delay(std::time::Duration::from_millis(200))
                    .json_body(grant_body("acc-2", "ref-2", 900));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/sdis/")
                    .header("authorization", "Bearer acc-2");
                then.status(200).json_body(json!([]));
            })
            .await;

        let driver = Arc::new(ApiDriver::connect(&config(&server, None), creds()).await.unwrap());
        let calls: Vec<_> = (0..8)
            .map(|_| {
                let driver = Arc::clone(&driver);
                tokio::spawn(async move { driver.get(ApiCategory::Sdis, "list", &[]).await })
            })
            .collect();
        for call in calls {
            assert!(call.await.unwrap().unwrap().ok());
        }

        refresh.assert_hits_async(1).await;
        resource.assert_hits_async(8).await;
        assert_eq!(driver.token().await.access_token(), "acc-2");
    }

    #[tokio::test]
    async fn failed_refresh_fails_the_call() {
        let server = MockServer::start_async().await;
        mock_grant(&server, 0).await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/o/token/")
                    .x_www_form_urlencoded_tuple("grant_type", "refresh_token");
                then.status(400).body(r#"{"error":"invalid_grant"}"#);
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/sdis/");
                then.status(200);
            })
            .await;

        let driver = ApiDriver::connect(&config(&server, None), creds()).await.unwrap();
        let err = driver.get(ApiCategory::Sdis, "list", &[]).await.unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::CreateToken);
        resource.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn not_found_is_returned_not_raised() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/sdis/missing/");
                then.status(404).json_body(json!({"detail": "Not found."}));
            })
            .await;

        let resp = driver
            .get(ApiCategory::Sdis, "user_detail", &[("sdi_id", "missing")])
            .await
            .unwrap();
        assert!(!resp.ok());
        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.reason(), "Not Found");
        assert_eq!(resp.detail(), Some(json!({"detail": "Not found."})));
    }

    #[tokio::test]
    async fn post_without_payload_sends_empty_object() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/sdis/sdi-1/start/").body("{}");
                then.status(202);
            })
            .await;

        let resp = driver
            .post(ApiCategory::Sdis, "start", &[("sdi_id", "sdi-1")], Payload::None)
            .await
            .unwrap();
        assert_eq!(resp.status_code(), 202);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn put_sends_json_payload() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/sdis/sdi-1/settings/")
                    .json_body(json!({"name": "lab"}));
                then.status(200).json_body(json!({"name": "lab"}));
            })
            .await;

        let resp = driver
            .put(
                ApiCategory::Sdis,
                "settings",
                &[("sdi_id", "sdi-1")],
                Payload::Json(json!({"name": "lab"})),
            )
            .await
            .unwrap();
        assert!(resp.ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn files_go_out_as_multipart() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/storage/general/7/uploads/")
                    .header_exists("content-type")
                    .body_contains("filename=\"disk.img\"")
                    .body_contains("payload-bytes");
                then.status(201);
            })
            .await;

        let req = ApiRequest::new(HttpMethod::Post, ApiCategory::General, "upload_list")
            .arg("pk", 7)
            .files(vec![FilePart::new("file", "disk.img", b"payload-bytes".to_vec())
                .with_mime("application/octet-stream")]);
        let resp = driver.call(req).await.unwrap();
        assert_eq!(resp.status_code(), 201);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn one_time_login_posts_user_and_expiry() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/accounts/login/token/")
                    .json_body(json!({"user": 12, "expires": 900}));
                then.status(201).json_body(json!({"token": "once"}));
            })
            .await;

        let resp = driver.create_one_time_login(12, None).await.unwrap();
        assert_eq!(resp.detail(), Some(json!({"token": "once"})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_placeholder_fails_before_sending() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, None).await;
        let any = server
            .mock_async(|when, then| {
                when.path_contains("/api/sdis/");
                then.status(200);
            })
            .await;

        let err = driver.get(ApiCategory::Sdis, "user_detail", &[]).await.unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::UrlFormat);
        any.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn version_outside_every_range_is_invalid_url() {
        let server = MockServer::start_async().await;
        let driver = logged_in(&server, Some("1.0")).await;
        let err = driver
            .get(ApiCategory::Users, "sharing_sdis", &[("pk", "1")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, SdiosErrorKind::InvalidUrl);
        assert!(err.message.contains("1.0.0"));
    }

    #[tokio::test]
    async fn custom_table_is_used() {
        let server = MockServer::start_async().await;
        let mut table = VersionTable::new();
        table
            .insert(
                ApiCategory::General,
                "ping",
                Endpoint::new(&[HttpMethod::Get])
                    .url(VersionRange::open(ApiVersion::new(1, 0, 0)), "ping/"),
            )
            .unwrap();
        mock_grant(&server, 900).await;
        let driver = ApiDriver::connect(&config(&server, Some("7.0")), creds())
            .await
            .unwrap()
            .with_table(Arc::new(table));
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ping/");
                then.status(204);
            })
            .await;

        assert!(driver.get(ApiCategory::General, "ping", &[]).await.unwrap().ok());
        mock.assert_async().await;
    }
}
