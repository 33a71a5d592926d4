use digest::Digest;
use md5::Md5;
#[cfg(feature = "rfc7616")]
use sha2::{Sha256, Sha512_256};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Digest primitives a challenge may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum HashFunction {
    MD5,
    #[cfg(feature = "rfc7616")]
    SHA256,
    #[cfg(feature = "rfc7616")]
    SHA512_256,
}

impl HashFunction {
    fn to_str(self) -> &'static str {
        match self {
            HashFunction::MD5 => "MD5",
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA256 => "SHA-256",
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA512_256 => "SHA-512-256",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        const TABLE: &[HashFunction] = &[
            HashFunction::MD5,
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA256,
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA512_256,
        ];
        TABLE
            .iter()
            .copied()
            .find(|h| h.to_str().eq_ignore_ascii_case(name))
    }
}

/// A digest primitive plus the `-sess` flag, as named by the `algorithm` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algorithm {
    pub hash: HashFunction,
    pub session: bool,
}

impl Algorithm {
    const SESSION_SUFFIX: &'static str = "-sess";

    pub fn new(hash: HashFunction, session: bool) -> Self {
        Self { hash, session }
    }

    /// Hash `data` and render the digest as lowercase hex.
    pub fn hash(self, data: &[u8]) -> String {
        match self.hash {
            HashFunction::MD5 => hex_digest::<Md5>(data),
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA256 => hex_digest::<Sha256>(data),
            #[cfg(feature = "rfc7616")]
            HashFunction::SHA512_256 => hex_digest::<Sha512_256>(data),
        }
    }

    /// Hash the UTF-8 bytes of `s`.
    pub fn hash_str(self, s: &str) -> String {
        self.hash(s.as_bytes())
    }
}

fn hex_digest<T: Digest>(data: &[u8]) -> String {
    hex::encode(T::digest(data))
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::new(HashFunction::MD5, false)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let trimmed = name.trim();
        let split = trimmed.len().checked_sub(Self::SESSION_SUFFIX.len());
        let (base, session) = match split {
            Some(at)
                if trimmed.is_char_boundary(at)
                    && trimmed[at..].eq_ignore_ascii_case(Self::SESSION_SUFFIX) =>
            {
                (&trimmed[..at], true)
            }
            _ => (trimmed, false),
        };
        HashFunction::lookup(base)
            .map(|hash| Algorithm::new(hash, session))
            .ok_or_else(|| Error::UnsupportedAlgorithm(name.to_owned()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hash.to_str())?;
        if self.session {
            f.write_str(Self::SESSION_SUFFIX)?;
        }
        Ok(())
    }
}

/// Quality of protection chosen for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    Auth,
    AuthInt,
}

impl Qop {
    pub fn to_str(self) -> &'static str {
        match self {
            Qop::Auth => "auth",
            Qop::AuthInt => "auth-int",
        }
    }
}

impl FromStr for Qop {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auth") {
            Ok(Qop::Auth)
        } else if s.eq_ignore_ascii_case("auth-int") {
            Ok(Qop::AuthInt)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Qop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "md5".parse::<Algorithm>().unwrap(),
            Algorithm::new(HashFunction::MD5, false)
        );
        assert_eq!(
            "MD5-SESS".parse::<Algorithm>().unwrap(),
            Algorithm::new(HashFunction::MD5, true)
        );
        assert_eq!("Md5-Sess".parse::<Algorithm>().unwrap().to_string(), "MD5-sess");
    }

    #[test]
    #[cfg(feature = "rfc7616")]
    fn parses_sha2_variants() {
        assert_eq!(
            "SHA-256".parse::<Algorithm>().unwrap(),
            Algorithm::new(HashFunction::SHA256, false)
        );
        assert_eq!(
            "sha-512-256-sess".parse::<Algorithm>().unwrap(),
            Algorithm::new(HashFunction::SHA512_256, true)
        );
        assert_eq!(
            Algorithm::new(HashFunction::SHA512_256, false).hash(b""),
            "c672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a"
        );
    }

    #[test]
    fn rejects_unknown_names() {
        for name in ["SHA-1", "", "-sess", "MD5sess", "MD5-sess-sess", "KECCAK-256"] {
            match name.parse::<Algorithm>() {
                Err(Error::UnsupportedAlgorithm(n)) => assert_eq!(n, name),
                other => panic!("{:?} parsed as {:?}", name, other),
            }
        }
    }

    #[test]
    fn md5_hex_is_lowercase() {
        assert_eq!(
            Algorithm::default().hash_str("Mufasa:testrealm@host.com:Circle Of Life"),
            "939e7578ed9e3c518a452acee763bce9"
        );
    }
}
