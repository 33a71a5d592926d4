use http::HeaderValue;
use std::fmt;

use crate::{
    algorithm::{Algorithm, Qop},
    calculator::DigestSession,
    error::Result,
};

/// The value of an `Authorization: Digest` request header.
///
/// Fields are written as `username, realm, uri, nonce, qop, response, cnonce,
/// nc, algorithm, opaque`; `qop` and `opaque` only when present. `nc` and
/// `algorithm` are bare tokens, everything else is a quoted string.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationHeader<'a> {
    pub username: &'a str,
    pub realm: &'a str,
    pub uri: &'a str,
    pub nonce: &'a str,
    pub qop: Option<Qop>,
    pub response: &'a str,
    pub cnonce: &'a str,
    pub nc: &'a str,
    pub algorithm: Algorithm,
    pub opaque: Option<&'a str>,
}

impl<'a> AuthorizationHeader<'a> {
    /// Assemble the header from a computed session and the challenge fields it answers.
    pub fn from_session(
        session: &'a DigestSession,
        username: &'a str,
        realm: &'a str,
        uri: &'a str,
        nonce: &'a str,
        opaque: Option<&'a str>,
    ) -> Self {
        Self {
            username,
            realm,
            uri,
            nonce,
            qop: session.qop,
            response: &session.response,
            cnonce: &session.cnonce,
            nc: session.nc,
            algorithm: session.algorithm,
            opaque,
        }
    }

    pub fn to_header_value(&self) -> Result<HeaderValue> {
        Ok(HeaderValue::from_bytes(self.to_string().as_bytes())?)
    }
}

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for ch in self.0.chars() {
            if ch == '"' || ch == '\\' {
                f.write_str("\\")?;
            }
            fmt::Write::write_char(f, ch)?;
        }
        f.write_str("\"")
    }
}

impl fmt::Display for AuthorizationHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digest username={}, realm={}, uri={}, nonce={}",
            Quoted(self.username),
            Quoted(self.realm),
            Quoted(self.uri),
            Quoted(self.nonce)
        )?;
        if let Some(qop) = self.qop {
            write!(f, ", qop={}", Quoted(qop.to_str()))?;
        }
        write!(
            f,
            ", response={}, cnonce={}, nc={}, algorithm={}",
            Quoted(self.response),
            Quoted(self.cnonce),
            self.nc,
            self.algorithm
        )?;
        if let Some(opaque) = self.opaque {
            write!(f, ", opaque={}", Quoted(opaque))?;
        }
        Ok(())
    }
}
