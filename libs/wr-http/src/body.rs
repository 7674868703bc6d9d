use bytes::Bytes;
use futures::stream::Stream;
use serde::Serialize;
use std::io;
use std::pin::Pin;

use crate::error::ClientError;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// Chunk stream accepted as a request body
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send + Sync + 'static>>;

/// Outbound request body
#[derive(Default)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Buffered bytes
    Bytes(Bytes),
    /// Chunked body, forwarded as it is produced
    Stream(BodyStream),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
            Body::Stream(_) => write!(f, "Body::Stream(..)"),
        }
    }
}

impl Body {
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Body::Bytes(bytes.into())
    }

    /// Serialize `value` as a JSON body
    ///
    /// # Errors
    /// `Serialization` if `value` cannot be serialized.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        let json = serde_json::to_vec(value)?;
        Ok(Body::Bytes(Bytes::from(json)))
    }

    #[must_use]
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + Sync + 'static,
    {
        Body::Stream(Box::pin(stream))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Buffered bytes, if the body is not a stream
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            Body::Empty | Body::Stream(_) => None,
        }
    }

    pub(crate) fn into_reqwest(self) -> Option<reqwest::Body> {
        match self {
            Body::Empty => None,
            Body::Bytes(bytes) => Some(reqwest::Body::from(bytes)),
            Body::Stream(stream) => Some(reqwest::Body::wrap_stream(stream)),
        }
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Body::Empty
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_buffered() {
        let body = Body::from_json(&json!({"ok": true})).unwrap();
        assert_eq!(body.as_bytes().unwrap().as_ref(), br#"{"ok":true}"#);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Body::default().is_empty());
        assert!(Body::default().into_reqwest().is_none());
    }

    #[test]
    fn test_stream_has_no_buffered_view() {
        let body = Body::from_stream(futures::stream::iter(vec![Ok(Bytes::from_static(b"a"))]));
        assert!(body.as_bytes().is_none());
        assert_eq!(format!("{body:?}"), "Body::Stream(..)");
    }
}
