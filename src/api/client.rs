//! Authenticated HTTP client for the fuel-log backend
//!
//! Every request built through [`ApiClient::request`] goes through
//! [`ApiClient::authorize`], which reads the current credential from the
//! shared [`SessionStore`] at send time. A login or logout takes effect on the
//! very next request without rebuilding the client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::error_handler::extract_backend_message;
use crate::core::config::Config;
use crate::core::session::SessionStore;
use crate::error::{FuelLogError, Result};

/// Successful (2xx) response payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Whether the body is empty or whitespace
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Decode a JSON body that must be present
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.is_empty() {
            return Err(FuelLogError::Decode(
                "expected a JSON body but the response was empty".to_string(),
            ));
        }
        serde_json::from_str(&self.body).map_err(|e| FuelLogError::Decode(e.to_string()))
    }

    /// Decode a JSON body that may be empty or `null`
    pub fn json_opt<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<T>>(&self.body)
            .map_err(|e| FuelLogError::Decode(e.to_string()))
    }

    /// The body as text
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// HTTP client bound to one backend and one session
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client for the given base URL
    pub fn new(base_url: Url, session: Arc<SessionStore>, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(FuelLogError::Config(format!(
                "API base URL '{}' cannot have paths appended",
                base_url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fuellog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config, session: Arc<SessionStore>) -> Result<Self> {
        Self::new(config.base_url()?, session, config.timeout())
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session this client reads credentials from
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Join an API path onto the base URL
    ///
    /// The base URL's own path is kept: base `http://host/api` with path
    /// `/fuel-logs` gives `http://host/api/fuel-logs`. The path is split on
    /// `/`; use [`endpoint_segments`](Self::endpoint_segments) when a segment
    /// holds caller data.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.endpoint_segments(path.split('/').filter(|segment| !segment.is_empty()))
    }

    /// Append segments to the base URL, each as exactly one segment
    ///
    /// `/` inside a segment is percent-encoded. Empty, `.` and `..` segments
    /// are refused since they would change which resource is addressed.
    pub fn endpoint_segments<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<S> = segments.into_iter().collect();
        if let Some(bad) = segments
            .iter()
            .map(AsRef::as_ref)
            .find(|segment| matches!(*segment, "" | "." | ".."))
        {
            return Err(FuelLogError::InvalidInput(format!(
                "Invalid path segment '{}'",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                FuelLogError::Config(format!(
                    "API base URL '{}' cannot have paths appended",
                    self.base_url
                ))
            })?;
            path.pop_if_empty()
                .extend(segments.iter().map(AsRef::as_ref));
        }
        Ok(url)
    }

    /// Build a request with the current credential attached
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.authorize(self.anonymous_request(method, path)?))
    }

    /// Build a request without credentials (login, registration)
    pub fn anonymous_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self.http.request(method, url))
    }

    /// Build an authorized request for a prepared URL
    pub fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        self.authorize(self.http.request(method, url))
    }

    /// Attach `Authorization: Bearer <token>` when a credential is active
    ///
    /// Without a credential the request goes out unauthenticated and the
    /// backend answers 401, which the caller handles.
    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_header() {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => {
                tracing::debug!("no active credential, sending request unauthenticated");
                builder
            }
        }
    }

    /// Send a prepared request and check the status
    ///
    /// Non-2xx responses become [`FuelLogError::Api`] with the backend
    /// message when one can be extracted.
    pub async fn send(&self, builder: RequestBuilder) -> Result<ApiResponse> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), "received response");

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(FuelLogError::api(
                status.as_u16(),
                extract_backend_message(&body),
            ))
        }
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.get_url(self.endpoint(path)?).await
    }

    /// GET a prepared URL
    pub async fn get_url(&self, url: Url) -> Result<ApiResponse> {
        tracing::debug!(path = url.path(), "GET");
        self.send(self.request_url(Method::GET, url)).await
    }

    /// GET a path where 404 or an empty body means "nothing there"
    pub async fn get_optional(&self, path: &str) -> Result<Option<ApiResponse>> {
        self.get_optional_url(self.endpoint(path)?).await
    }

    /// GET a prepared URL where 404 or an empty body means "nothing there"
    pub async fn get_optional_url(&self, url: Url) -> Result<Option<ApiResponse>> {
        match self.get_url(url).await {
            Ok(response) if response.is_empty() => Ok(None),
            Ok(response) => Ok(Some(response)),
            Err(FuelLogError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST a JSON body to a path
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        tracing::debug!(path, "POST");
        self.send(self.request(Method::POST, path)?.json(body)).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
