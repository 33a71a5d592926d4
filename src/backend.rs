//! The request/response capability that [`DigestAuthBackend`](crate::DigestAuthBackend)
//! both consumes and exposes.
//!
//! A [`Backend`] sends a [`Request`] and yields a [`Response`], opens a duplex
//! stream for protocol upgrades, and releases its resources on [`Backend::close`].
//! Decorators implement the same trait around an inner backend so they compose.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use http::{header::HeaderName, HeaderMap, HeaderValue, Method, Uri};
use std::{fmt, io, sync::Arc};

use crate::error::Result;

/// Responses carry a fully buffered body.
pub type Response = http::Response<Bytes>;

/// Username and password used to answer a Digest challenge.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Produces a fresh byte stream each time the body has to be transmitted.
#[derive(Clone)]
pub struct StreamBody(Arc<dyn Fn() -> BoxStream<'static, io::Result<Bytes>> + Send + Sync>);

impl StreamBody {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    pub fn open(&self) -> BoxStream<'static, io::Result<Bytes>> {
        (self.0)()
    }
}

impl fmt::Debug for StreamBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamBody(..)")
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body at all.
    #[default]
    Empty,
    /// A fixed buffer that can be read any number of times.
    Bytes(Bytes),
    /// A streamed body of unknown content.
    Stream(StreamBody),
}

impl Body {
    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Empty => "empty",
            Body::Bytes(_) => "bytes",
            Body::Stream(_) => "streaming",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Bytes(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(v))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

/// An outgoing HTTP request.
///
/// `digest` is the per-request switch for Digest authentication: when set, an
/// authenticating backend answers a `401` challenge with these credentials.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
    digest: Option<Credentials>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Body::Empty,
            digest: None,
        }
    }

    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: Uri) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Append a header, keeping any existing values of the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body<B: Into<Body>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Attempt Digest authentication with these credentials if challenged.
    pub fn digest_auth<U: Into<String>, P: Into<String>>(
        mut self,
        username: U,
        password: P,
    ) -> Self {
        self.digest = Some(Credentials::new(username, password));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body_ref(&self) -> &Body {
        &self.body
    }

    pub fn digest_credentials(&self) -> Option<&Credentials> {
        self.digest.as_ref()
    }
}

/// An asynchronous HTTP sending capability.
///
/// Dropping a returned future cancels the operation in flight.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Duplex stream handed out by [`Backend::open_stream`].
    type Stream: Send;

    /// Send `request` and wait for the complete response.
    async fn send(&self, request: Request) -> Result<Response>;

    /// Open a bidirectional stream (e.g. a websocket) described by `request`.
    async fn open_stream(&self, request: Request) -> Result<Self::Stream>;

    /// Release connections and any other resources held by the backend.
    async fn close(&self) -> Result<()>;
}
