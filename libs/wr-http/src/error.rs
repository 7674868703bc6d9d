use std::io;
use thiserror::Error;
use bytes::Bytes;
use http::StatusCode;

/// Which side of the exchange an error was raised on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Raised before the request left the client
    Request,
    /// Raised after sending: transport failure, bad status, or response handling
    Response,
}

/// Error returned by a request or response hook.
///
/// The client wraps it in [`ClientError::RequestHook`] or
/// [`ClientError::ResponseHook`] without touching it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    /// Create a hook error with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request build error: {0}")]
    BuildError(String),

    #[error("Request hook rejected the request: {0}")]
    RequestHook(#[source] HookError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: status={status}")]
    Http { status: StatusCode, body: Bytes },

    #[error("Response hook rejected the response: {0}")]
    ResponseHook(#[source] HookError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl ClientError {
    /// Side of the exchange this error belongs to
    #[must_use]
    pub fn phase(&self) -> ErrorPhase {
        match self {
            ClientError::BuildError(_)
            | ClientError::RequestHook(_)
            | ClientError::Serialization(_) => ErrorPhase::Request,
            ClientError::Connection(_)
            | ClientError::Timeout(_)
            | ClientError::InvalidResponse(_)
            | ClientError::Http { .. }
            | ClientError::ResponseHook(_)
            | ClientError::Io(_)
            | ClientError::Reqwest(_) => ErrorPhase::Response,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    /// Status code for `Http` errors
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_phase_request_side() {
        assert_eq!(ClientError::BuildError("x".into()).phase(), ErrorPhase::Request);
        assert_eq!(
            ClientError::RequestHook(HookError::new("denied")).phase(),
            ErrorPhase::Request
        );
    }

    #[test]
    fn test_phase_response_side() {
        assert_eq!(ClientError::Timeout("slow".into()).phase(), ErrorPhase::Response);
        let err = ClientError::Http {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::new(),
        };
        assert_eq!(err.phase(), ErrorPhase::Response);
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_hook_error_source_chain() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "no token");
        let err = ClientError::RequestHook(HookError::new("auth hook failed").with_source(io));

        let hook = err.source().unwrap();
        assert_eq!(hook.to_string(), "auth hook failed");
        assert_eq!(hook.source().unwrap().to_string(), "no token");
    }
}
