//! Request and response hooks.
//!
//! A hook sees every request just before it is sent, or every successful
//! response just before the caller gets it. Returning `Err` aborts the call;
//! the client logs the failure and hands the error back to the caller.

use crate::error::HookError;
use crate::request::Request;
use crate::response::Response;

/// Hook run on every outbound request, after default headers are applied.
#[async_trait::async_trait]
pub trait RequestHook: Send + Sync {
    /// Transform or reject the outbound request.
    ///
    /// # Errors
    /// Returns `HookError` to stop the request before it is sent.
    async fn on_request(&self, request: Request) -> Result<Request, HookError>;
}

/// Hook run on every 2xx response.
#[async_trait::async_trait]
pub trait ResponseHook: Send + Sync {
    /// Transform or reject the inbound response.
    ///
    /// # Errors
    /// Returns `HookError` to fail the call after the response arrived.
    async fn on_response(&self, response: Response) -> Result<Response, HookError>;
}

#[async_trait::async_trait]
impl<F> RequestHook for F
where
    F: Fn(Request) -> Result<Request, HookError> + Send + Sync,
{
    async fn on_request(&self, request: Request) -> Result<Request, HookError> {
        self(request)
    }
}

#[async_trait::async_trait]
impl<F> ResponseHook for F
where
    F: Fn(Response) -> Result<Response, HookError> + Send + Sync,
{
    async fn on_response(&self, response: Response) -> Result<Response, HookError> {
        self(response)
    }
}

/// Identity hook for both directions
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait::async_trait]
impl RequestHook for PassThrough {
    async fn on_request(&self, request: Request) -> Result<Request, HookError> {
        Ok(request)
    }
}

#[async_trait::async_trait]
impl ResponseHook for PassThrough {
    async fn on_response(&self, response: Response) -> Result<Response, HookError> {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, Method, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_pass_through_request_identity() {
        let request = Request::builder()
            .method(Method::POST)
            .path("/auth/login/")
            .header("X-Trace", "abc")
            .unwrap()
            .json(&json!({"username": "wr"}))
            .unwrap()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        let headers = request.headers().clone();
        let body = request.body().as_bytes().cloned();

        let out = PassThrough.on_request(request).await.unwrap();

        assert_eq!(out.method(), Method::POST);
        assert_eq!(out.path(), "/auth/login/");
        assert_eq!(out.headers(), &headers);
        assert_eq!(out.body().as_bytes().cloned(), body);
        assert_eq!(out.timeout(), Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_pass_through_response_identity() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("42"));
        let response = Response::from_bytes(StatusCode::CREATED, headers.clone(), r#"{"id":7}"#);

        let out = PassThrough.on_response(response).await.unwrap();

        assert_eq!(out.status(), StatusCode::CREATED);
        assert_eq!(out.headers(), &headers);
        assert_eq!(out.text().await.unwrap(), r#"{"id":7}"#);
    }

    #[tokio::test]
    async fn test_closure_hook() {
        let hook = |mut request: Request| -> Result<Request, HookError> {
            request
                .headers_mut()
                .insert("authorization", HeaderValue::from_static("Bearer t"));
            Ok(request)
        };
        let request = Request::builder().path("/users/").build().unwrap();

        let out = hook.on_request(request).await.unwrap();
        assert_eq!(out.headers()["authorization"], "Bearer t");
    }
}
