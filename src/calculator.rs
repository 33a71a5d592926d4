//! RFC 2617 digest computations.
//!
//! Every function here is pure apart from [`client_nonce`], which draws from
//! the thread-local RNG.

use http::{Method, Uri};
use rand::Rng;

use crate::{
    algorithm::{Algorithm, Qop},
    backend::{Body, Credentials},
    challenge::DigestChallenge,
    error::{Error, Result},
};

/// A single retry is attempted per challenge, so the count never advances.
pub const NONCE_COUNT: &str = "00000001";

/// 16 random bytes as 32 lowercase hex characters.
pub fn client_nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// The URI used in HA2 and the `uri` directive: the absolute path without the query.
pub fn digest_uri(uri: &Uri) -> &str {
    match uri.path() {
        "" => "/",
        path => path,
    }
}

pub fn ha1(
    algorithm: Algorithm,
    username: &str,
    realm: &str,
    password: &str,
    nonce: &str,
    cnonce: &str,
) -> String {
    let ha1 = algorithm.hash_str(&format!("{}:{}:{}", username, realm, password));
    if algorithm.session {
        algorithm.hash_str(&format!("{}:{}:{}", ha1, nonce, cnonce))
    } else {
        ha1
    }
}

/// Fails for `auth-int` unless the body is a fixed byte buffer.
pub fn ha2(
    algorithm: Algorithm,
    method: &str,
    digest_uri: &str,
    qop: Option<Qop>,
    body: &Body,
) -> Result<String> {
    match qop {
        None | Some(Qop::Auth) => Ok(algorithm.hash_str(&format!("{}:{}", method, digest_uri))),
        Some(Qop::AuthInt) => {
            let entity = body.as_bytes().ok_or(Error::AuthIntBody(body.kind()))?;
            let body_hash = algorithm.hash(entity);
            Ok(algorithm.hash_str(&format!("{}:{}:{}", method, digest_uri, body_hash)))
        }
    }
}

pub fn response(
    algorithm: Algorithm,
    qop: Option<Qop>,
    nonce: &str,
    cnonce: &str,
    nc: &str,
    ha1: &str,
    ha2: &str,
) -> String {
    match qop {
        Some(qop) => algorithm.hash_str(&format!(
            "{}:{}:{}:{}:{}:{}",
            ha1, nonce, nc, cnonce, qop, ha2
        )),
        None => algorithm.hash_str(&format!("{}:{}:{}", ha1, nonce, ha2)),
    }
}

/// Ephemeral values computed for one authenticated retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSession {
    pub algorithm: Algorithm,
    pub qop: Option<Qop>,
    pub cnonce: String,
    pub nc: &'static str,
    pub response: String,
}

impl DigestSession {
    /// Compute the session for `challenge` with a freshly drawn client nonce.
    ///
    /// The challenge must carry a realm and a nonce; missing ones hash as empty.
    pub fn new(
        method: &Method,
        uri: &Uri,
        body: &Body,
        credentials: &Credentials,
        challenge: &DigestChallenge,
    ) -> Result<Self> {
        Self::compute(method, uri, body, credentials, challenge, client_nonce())
    }

    pub fn compute(
        method: &Method,
        uri: &Uri,
        body: &Body,
        credentials: &Credentials,
        challenge: &DigestChallenge,
        cnonce: String,
    ) -> Result<Self> {
        let algorithm = challenge.digest_algorithm()?;
        let qop = challenge.quality_of_protection();
        let realm = challenge.realm().unwrap_or_default();
        let nonce = challenge.nonce().unwrap_or_default();

        let ha2 = ha2(algorithm, method.as_str(), digest_uri(uri), qop, body)?;
        let ha1 = ha1(
            algorithm,
            credentials.username(),
            realm,
            credentials.password(),
            nonce,
            &cnonce,
        );
        let response = response(algorithm, qop, nonce, &cnonce, NONCE_COUNT, &ha1, &ha2);

        Ok(Self {
            algorithm,
            qop,
            cnonce,
            nc: NONCE_COUNT,
            response,
        })
    }
}
