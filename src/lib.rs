//! Transparent HTTP Digest Access Authentication, as specified by IETF RFC2617
//! (and the SHA-2 algorithms of RFC7616), for any asynchronous HTTP backend.
//!
//! Wrap a [`Backend`] in a [`DigestAuthBackend`] and mark requests with
//! [`Request::digest_auth`]. A marked request that is answered with
//! `401 Unauthorized` and a `WWW-Authenticate: Digest` challenge is sent once
//! more with the computed `Authorization` header.

mod algorithm;
mod authorization;
mod backend;
pub mod calculator;
mod challenge;
mod error;
mod middleware;

pub use algorithm::{Algorithm, HashFunction, Qop};
pub use authorization::AuthorizationHeader;
pub use backend::{Backend, Body, Credentials, Request, Response, StreamBody};
pub use calculator::DigestSession;
pub use challenge::DigestChallenge;
pub use error::{Error, Result};
pub use middleware::DigestAuthBackend;
