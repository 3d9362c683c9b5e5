//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use libris_config::ResolvedEnvironment;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{AdminApi, AuthApi, BooksApi, BorrowsApi};
use crate::error::{Error, NETWORK_ERROR, Result, server_message};
use crate::hooks::{LogHooks, SharedUiHooks};
use crate::session::{InMemorySessionStore, SessionStore, SharedSessionStore};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ─────────────────────────────────────────────────────────────────────────────
// Request descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP verbs the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One API call, built fresh per request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Path appended to the base URL.
    pub path: String,
    pub method: Method,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach query parameters from a serializable struct or map.
    ///
    /// `null` values are dropped, so `Option::None` fields never reach the
    /// wire.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        if let serde_json::Value::Object(map) = serde_json::to_value(query)? {
            for (key, value) in map {
                let value = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                self.query.push((key, value));
            }
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Libris API client.
///
/// Every call reads the bearer token from the session store at send time,
/// so a login or logout elsewhere takes effect on the next request.
///
/// # Example
///
/// ```no_run
/// use libris_client::LibrisClient;
///
/// # async fn example() -> libris_client::Result<()> {
/// let client = LibrisClient::builder()
///     .base_url("http://localhost:8000/api/v1")
///     .build()?;
///
/// let books = client.books().recent(5).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LibrisClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    session: SharedSessionStore,
    hooks: SharedUiHooks,
}

impl std::fmt::Debug for LibrisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibrisClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl LibrisClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// The session store this client reads its token from.
    pub fn session(&self) -> &SharedSessionStore {
        &self.inner.session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the books API.
    pub fn books(&self) -> BooksApi {
        BooksApi::new(self.clone())
    }

    /// Access the borrows API.
    pub fn borrows(&self) -> BorrowsApi {
        BorrowsApi::new(self.clone())
    }

    /// Access the admin API.
    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Send a request and map the outcome.
    ///
    /// - success: the parsed body (`null` when empty)
    /// - 401: session cleared, login redirect raised, [`Error::Unauthenticated`]
    /// - other failures: user notified, [`Error::Server`]
    /// - no response: user notified, [`Error::Transport`]
    pub async fn send(&self, request: Request) -> Result<serde_json::Value> {
        let url = self.url(&request.path)?;

        let mut builder = self
            .inner
            .http
            .request(request.method.into(), url)
            .timeout(self.inner.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.inner.session.token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method = ?request.method, path = %request.path, "sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(e)),
        };
        self.handle_response(request.method, &request.path, response)
            .await
    }

    fn transport_failure(&self, error: reqwest::Error) -> Error {
        tracing::warn!(error = %error, "no response from server");
        self.inner.hooks.notify(NETWORK_ERROR);
        Error::Transport(error)
    }

    async fn handle_response(
        &self,
        method: Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value> {
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.transport_failure(e)),
        };

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(serde_json::Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::info!(method = ?method, path, "server rejected session");
            self.inner.session.clear();
            self.inner.hooks.redirect_to_login();
            return Err(Error::Unauthenticated);
        }

        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        };
        let message = server_message(body.as_ref());
        tracing::warn!(status = status.as_u16(), method = ?method, path, message = %message, "request rejected");
        self.inner.hooks.notify(&message);

        Err(Error::Server {
            status: status.as_u16(),
            message,
            body,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verb helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.send(Request::get(path)).await?)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        decode(self.send(Request::get(path).query(query)?).await?)
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode(self.send(Request::post(path).body(body)?).await?)
    }

    /// Make a POST request without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.send(Request::post(path)).await?)
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode(self.send(Request::put(path).body(body)?).await?)
    }

    /// Make a PUT request without a body.
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.send(Request::put(path)).await?)
    }

    /// Make a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.send(Request::delete(path)).await?)
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(Error::from)
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a LibrisClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    session: Option<SharedSessionStore>,
    hooks: Option<SharedUiHooks>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            session: None,
            hooks: None,
        }
    }

    /// Take base URL and timeout from the environment chosen at startup.
    pub fn environment(self, env: &ResolvedEnvironment) -> Self {
        self.base_url(env.base_url()).timeout(env.timeout())
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the session store. Defaults to an empty in-memory store.
    pub fn session_store(mut self, store: SharedSessionStore) -> Self {
        self.session = Some(store);
        self
    }

    /// Set the UI hooks. Defaults to [`LogHooks`].
    pub fn hooks(mut self, hooks: SharedUiHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LibrisClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL so relative joins keep its path
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("libris-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(LibrisClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                session: self
                    .session
                    .unwrap_or_else(|| Arc::new(InMemorySessionStore::new())),
                hooks: self.hooks.unwrap_or_else(|| Arc::new(LogHooks)),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
