use std::error::Error as StdError;

/// Errors surfaced by the digest calculator and the authenticating backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The challenge named a digest algorithm this crate cannot compute.
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// `auth-int` was negotiated but the request body cannot be hashed.
    #[error("qop=auth-int requires a fixed byte body, request has a {0} body")]
    AuthIntBody(&'static str),

    /// The computed `Authorization` value is not a legal header value.
    #[error("Invalid Authorization header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// A failure reported by the wrapped backend.
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::Backend(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
