use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};
use url::{ParseError, Url};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::hooks::{PassThrough, RequestHook, ResponseHook};
use crate::request::{Request, RequestBuilder};
use crate::response::Response;

/// Configured HTTP client.
///
/// Cloning is cheap: clones share configuration, hooks and the connection
/// pool. Build one at startup and hand it to whatever issues backend calls.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    base_url: Url,
    default_headers: HeaderMap,
    http_client: reqwest::Client,
    request_hook: Arc<dyn RequestHook>,
    response_hook: Arc<dyn ResponseHook>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client bound to `config`, with pass-through hooks.
    ///
    /// # Errors
    /// `BuildError` if the base address does not resolve to a URL, a default
    /// header is invalid, or the underlying HTTP client cannot be built.
    pub fn configure(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_hooks(config, PassThrough, PassThrough)
    }

    /// Build a client with the given request and response hooks.
    ///
    /// # Errors
    /// Same as [`Client::configure`].
    pub fn with_hooks(
        config: ClientConfig,
        request_hook: impl RequestHook + 'static,
        response_hook: impl ResponseHook + 'static,
    ) -> Result<Self, ClientError> {
        let base_url = resolve_base_url(&config)?;
        let default_headers = header_map(&config)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(config.forward_credentials)
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;

        debug!(
            base_url = %base_url,
            timeout = ?config.timeout,
            forward_credentials = config.forward_credentials,
            "http client configured"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                base_url,
                default_headers,
                http_client,
                request_hook: Arc::new(request_hook),
                response_hook: Arc::new(response_hook),
            }),
        })
    }

    /// Replace the request hook. Returns a new client sharing the connection pool.
    #[must_use]
    pub fn on_request(&self, hook: impl RequestHook + 'static) -> Self {
        let mut inner = self.inner.rebuild();
        inner.request_hook = Arc::new(hook);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Replace the response hook. Returns a new client sharing the connection pool.
    #[must_use]
    pub fn on_response(&self, hook: impl ResponseHook + 'static) -> Self {
        let mut inner = self.inner.rebuild();
        inner.response_hook = Arc::new(hook);
        Self {
            inner: Arc::new(inner),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Base address resolved to an absolute URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Issue `request`.
    ///
    /// Default headers are filled in under the request's own, the request
    /// hook runs, the request is sent, the body is read in full, a non-2xx
    /// status is turned into [`ClientError::Http`], and the response hook
    /// runs. Every failure is logged once and returned as is.
    ///
    /// The returned [`Response`] holds the whole body, so reading it cannot
    /// fail on the network. Parsing it is up to the caller; use
    /// [`Client::execute_json`] to have parse failures logged as well.
    ///
    /// # Errors
    /// Request-phase errors from the request hook or URL building, and
    /// response-phase errors from the transport, the status check or the
    /// response hook.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
        request.apply_default_headers(&self.inner.default_headers);

        let method = request.method().clone();
        let path = request.path().to_owned();

        let request = match self.inner.request_hook.on_request(request).await {
            Ok(request) => request,
            Err(e) => {
                let err = ClientError::RequestHook(e);
                error!(%method, %path, error = %err, "request error");
                return Err(err);
            }
        };

        let url = match self.url_for(request.path()) {
            Ok(url) => url,
            Err(err) => {
                error!(%method, %path, error = %err, "request error");
                return Err(err);
            }
        };

        match self.send(&url, request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                error!(%method, %url, error = %err, "response error");
                Err(err)
            }
        }
    }

    /// Issue `request` and deserialize the JSON body.
    ///
    /// # Errors
    /// Everything [`Client::execute`] returns, plus `InvalidResponse` when
    /// the body is not valid JSON for `T`. A parse failure is logged as a
    /// response error.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<T, ClientError> {
        let method = request.method().clone();
        let path = request.path().to_owned();

        let response = self.execute(request).await?;
        response
            .json()
            .await
            .inspect_err(|err| error!(%method, %path, error = %err, "response error"))
    }

    /// GET `path` and deserialize the JSON body.
    ///
    /// # Errors
    /// Same as [`Client::execute_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = prepare(&Method::GET, path, Request::builder().path(path).build())?;
        self.execute_json(request).await
    }

    /// GET `path`.
    ///
    /// # Errors
    /// Same as [`Client::execute`].
    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        let request = prepare(&Method::GET, path, Request::builder().path(path).build())?;
        self.execute(request).await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    /// Same as [`Client::execute`].
    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        let request = prepare(
            &Method::DELETE,
            path,
            Request::builder().method(Method::DELETE).path(path).build(),
        )?;
        self.execute(request).await
    }

    /// POST `body` serialized as JSON.
    ///
    /// # Errors
    /// `Serialization` if `body` cannot be serialized, otherwise the same as
    /// [`Client::execute`].
    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send_json(&Method::POST, path, body).await
    }

    /// PUT `body` serialized as JSON.
    ///
    /// # Errors
    /// `Serialization` if `body` cannot be serialized, otherwise the same as
    /// [`Client::execute`].
    pub async fn put_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send_json(&Method::PUT, path, body).await
    }

    /// PATCH `body` serialized as JSON.
    ///
    /// # Errors
    /// `Serialization` if `body` cannot be serialized, otherwise the same as
    /// [`Client::execute`].
    pub async fn patch_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send_json(&Method::PATCH, path, body).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: &Method,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        let built = Request::builder()
            .method(method.clone())
            .path(path)
            .json(body)
            .and_then(RequestBuilder::build);
        let request = prepare(method, path, built)?;
        self.execute(request).await
    }

    /// Join `path` to the base URL; absolute URLs pass through and a bare
    /// query string attaches to the base path itself
    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path)
                .map_err(|e| ClientError::BuildError(format!("Invalid URL {path:?}: {e}")));
        }
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let joined = if path.is_empty() {
            base.to_owned()
        } else if path.starts_with('/') || path.starts_with('?') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined)
            .map_err(|e| ClientError::BuildError(format!("Invalid URL {joined:?}: {e}")))
    }

    async fn send(&self, url: &Url, request: Request) -> Result<Response, ClientError> {
        let (method, headers, body, timeout) = request.into_parts();

        let mut req_builder = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers);
        if let Some(timeout) = timeout {
            req_builder = req_builder.timeout(timeout);
        }
        if let Some(body) = body.into_reqwest() {
            req_builder = req_builder.body(body);
        }

        debug!(%method, %url, "sending request");

        let resp = req_builder.send().await.map_err(classify_transport_error)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(%method, %url, status = status.as_u16(), "response received");

        // Body read errors (timeouts, resets mid-body) surface here, not in the caller
        let body = resp.bytes().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(ClientError::Http { status, body });
        }

        let response = Response::from_bytes(status, headers, body);

        self.inner
            .response_hook
            .on_response(response)
            .await
            .map_err(ClientError::ResponseHook)
    }
}

impl ClientInner {
    fn rebuild(&self) -> Self {
        Self {
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            default_headers: self.default_headers.clone(),
            http_client: self.http_client.clone(),
            request_hook: Arc::clone(&self.request_hook),
            response_hook: Arc::clone(&self.response_hook),
        }
    }
}

/// Log a request that failed to build before it reaches the hooks
fn prepare(
    method: &Method,
    path: &str,
    built: Result<Request, ClientError>,
) -> Result<Request, ClientError> {
    built.inspect_err(|err| error!(%method, %path, error = %err, "request error"))
}

fn classify_transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else if e.is_connect() {
        ClientError::Connection(e.to_string())
    } else {
        ClientError::Reqwest(e)
    }
}

fn resolve_base_url(config: &ClientConfig) -> Result<Url, ClientError> {
    match Url::parse(&config.base_address) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let origin = config.origin.as_deref().ok_or_else(|| {
                ClientError::BuildError(format!(
                    "relative base address {:?} needs an origin",
                    config.base_address
                ))
            })?;
            let origin = Url::parse(origin)
                .map_err(|e| ClientError::BuildError(format!("Invalid origin {origin:?}: {e}")))?;
            origin.join(&config.base_address).map_err(|e| {
                ClientError::BuildError(format!(
                    "Invalid base address {:?}: {e}",
                    config.base_address
                ))
            })
        }
        Err(e) => Err(ClientError::BuildError(format!(
            "Invalid base address {:?}: {e}",
            config.base_address
        ))),
    }
}

fn header_map(config: &ClientConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::with_capacity(config.default_headers.len());
    for (name, value) in &config.default_headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| ClientError::BuildError(format!("Invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| ClientError::BuildError(format!("Invalid header value {value:?}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
