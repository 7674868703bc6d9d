//! HTTP client for the WR H5 backend.
//!
//! A [`Client`] is built once from a [`ClientConfig`] (base address, timeout,
//! default headers, credential forwarding) and passed to whatever issues
//! backend calls. Every call runs through a [`RequestHook`] before it is sent
//! and a [`ResponseHook`] after a 2xx response arrives. Both default to
//! [`PassThrough`].
//!
//! Failures are logged once through `tracing` and returned unchanged: no
//! retries, no fallbacks. [`ClientError::phase`] tells whether a failure
//! happened before the request was sent or after.
//!
//! # Examples
//!
//! ```no_run
//! use wr_http::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // `/api` is forwarded to the backend by the reverse proxy at this origin
//! let client = Client::configure(ClientConfig::proxied("https://qr.yayaxueqin.cn"))?;
//!
//! let response = client.get("/ping").await?;
//! let data: serde_json::Value = response.json().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Hooks
//!
//! ```no_run
//! use wr_http::{Client, ClientConfig, HeaderValue, HookError, Request};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::configure(ClientConfig::direct("https://qr.yayaxueqin.cn/api"))?
//!     .on_request(|mut request: Request| -> Result<Request, HookError> {
//!         let token = std::env::var("WR_TOKEN").map_err(|e| HookError::new("no token").with_source(e))?;
//!         let value = format!("Bearer {token}")
//!             .parse::<HeaderValue>()
//!             .map_err(|e| HookError::new("bad token").with_source(e))?;
//!         request.headers_mut().insert(http::header::AUTHORIZATION, value);
//!         Ok(request)
//!     });
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod config;
mod error;
mod hooks;
mod request;
mod response;

pub use body::{Body, BodyStream, BoxStream};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_BASE_ADDRESS, DEFAULT_TIMEOUT, H5_ORIGIN};
pub use error::{ClientError, ErrorPhase, HookError};
pub use hooks::{PassThrough, RequestHook, ResponseHook};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export commonly used types from dependencies
pub use http::{HeaderMap, HeaderValue, Method, StatusCode};
pub use url::Url;
