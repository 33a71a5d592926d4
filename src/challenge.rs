use http::{header::WWW_AUTHENTICATE, HeaderMap};
use std::{convert::Infallible, str::FromStr};

use crate::{
    algorithm::{Algorithm, Qop},
    error::Result,
};

const DIGEST_SCHEME: &str = "Digest";

/// Directives of a `WWW-Authenticate: Digest` challenge.
///
/// Parsing never fails; absent directives are reported as `None` and it is up
/// to the caller to decide whether the challenge is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestChallenge {
    directives: Vec<(String, String)>,
}

impl FromStr for DigestChallenge {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` header value.
    ///
    /// When the value lists several challenges the first `Digest` one is used.
    /// A value without any scheme token is read as bare Digest directives.
    pub fn parse(header: &str) -> Self {
        Self::select_digest(header).unwrap_or_default()
    }

    /// Returns the first Digest challenge among all `WWW-Authenticate` headers.
    ///
    /// Values are read as UTF-8 so quoted strings may carry non-ASCII text.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| std::str::from_utf8(value.as_bytes()).ok())
            .find_map(Self::select_digest)
    }

    fn select_digest(header: &str) -> Option<Self> {
        let items = tokenize(header);
        let has_scheme = items.iter().any(|i| matches!(i, Item::Scheme(_)));
        let mut challenge = Self::default();
        if has_scheme {
            let mut items = items
                .into_iter()
                .skip_while(|i| !i.is_scheme(DIGEST_SCHEME));
            items.next()?;
            for item in items {
                match item {
                    Item::Directive(name, value) => challenge.insert(name, value),
                    Item::Scheme(_) => break,
                }
            }
        } else {
            for item in items {
                if let Item::Directive(name, value) = item {
                    challenge.insert(name, value);
                }
            }
        }
        Some(challenge)
    }

    fn insert(&mut self, name: &str, value: String) {
        if self.directive(name).is_none() {
            self.directives.push((name.to_ascii_lowercase(), value));
        }
    }

    /// Case-insensitive lookup of any directive.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn realm(&self) -> Option<&str> {
        self.directive("realm")
    }

    pub fn nonce(&self) -> Option<&str> {
        self.directive("nonce")
    }

    /// Raw `qop` directive, possibly a comma-separated list.
    pub fn qop(&self) -> Option<&str> {
        self.directive("qop")
    }

    pub fn algorithm(&self) -> Option<&str> {
        self.directive("algorithm")
    }

    pub fn opaque(&self) -> Option<&str> {
        self.directive("opaque")
    }

    pub fn stale(&self) -> bool {
        self.directive("stale")
            .map_or(false, |s| s.trim().eq_ignore_ascii_case("true"))
    }

    /// The qop to answer with: `auth` when offered, else `auth-int`.
    pub fn quality_of_protection(&self) -> Option<Qop> {
        let offered: Vec<Qop> = self
            .qop()?
            .split(',')
            .filter_map(|q| q.parse().ok())
            .collect();
        if offered.contains(&Qop::Auth) {
            Some(Qop::Auth)
        } else if offered.contains(&Qop::AuthInt) {
            Some(Qop::AuthInt)
        } else {
            None
        }
    }

    /// The algorithm to hash with; MD5 when the challenge names none.
    pub fn digest_algorithm(&self) -> Result<Algorithm> {
        match self.algorithm() {
            Some(name) => name.parse(),
            None => Ok(Algorithm::default()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Item<'a> {
    Scheme(&'a str),
    Directive(&'a str, String),
}

impl Item<'_> {
    fn is_scheme(&self, scheme: &str) -> bool {
        matches!(self, Item::Scheme(s) if s.eq_ignore_ascii_case(scheme))
    }
}

fn tokenize(input: &str) -> Vec<Item<'_>> {
    #[derive(PartialEq)]
    enum State {
        PreToken,
        Token,
        PostToken,
        PreValue,
        QuotedValue,
        EscapedChar,
        Value,
    }

    let mut items = Vec::new();
    let mut state = State::PreToken;
    let mut start = 0;
    let mut end = 0;
    let mut value = String::new();

    for (idx, ch) in input.char_indices() {
        match state {
            State::PreToken => {
                if ch != ',' && !ch.is_whitespace() {
                    start = idx;
                    state = State::Token;
                }
            }
            State::Token => {
                if ch == '=' {
                    end = idx;
                    state = State::PreValue;
                } else if ch == ',' {
                    items.push(Item::Scheme(&input[start..idx]));
                    state = State::PreToken;
                } else if ch.is_whitespace() {
                    end = idx;
                    state = State::PostToken;
                }
            }
            State::PostToken => {
                if ch == '=' {
                    state = State::PreValue;
                } else if ch == ',' {
                    items.push(Item::Scheme(&input[start..end]));
                    state = State::PreToken;
                } else if !ch.is_whitespace() {
                    items.push(Item::Scheme(&input[start..end]));
                    start = idx;
                    state = State::Token;
                }
            }
            State::PreValue => {
                if ch.is_whitespace() {
                    continue;
                }
                value.clear();
                if ch == '"' {
                    state = State::QuotedValue;
                } else if ch == ',' {
                    items.push(Item::Directive(&input[start..end], String::new()));
                    state = State::PreToken;
                } else {
                    value.push(ch);
                    state = State::Value;
                }
            }
            State::QuotedValue => match ch {
                '"' => {
                    items.push(Item::Directive(&input[start..end], value.clone()));
                    state = State::PreToken;
                }
                '\\' => state = State::EscapedChar,
                _ => value.push(ch),
            },
            State::EscapedChar => {
                value.push(ch);
                state = State::QuotedValue;
            }
            State::Value => {
                if ch == ',' || ch.is_whitespace() {
                    items.push(Item::Directive(&input[start..end], value.clone()));
                    state = State::PreToken;
                } else {
                    value.push(ch);
                }
            }
        }
    }

    match state {
        State::Token => items.push(Item::Scheme(&input[start..])),
        State::PostToken => items.push(Item::Scheme(&input[start..end])),
        State::PreValue => items.push(Item::Directive(&input[start..end], String::new())),
        // an unterminated quoted string keeps what was read
        State::Value | State::QuotedValue | State::EscapedChar => {
            items.push(Item::Directive(&input[start..end], value))
        }
        State::PreToken => {}
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const RFC2617: &str = r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

    #[test]
    fn parses_rfc2617_challenge() {
        let c = DigestChallenge::parse(RFC2617);
        assert_eq!(c.realm(), Some("testrealm@host.com"));
        assert_eq!(c.nonce(), Some("dcd98b7102dd2f0e8b11d0f600bfb0c093"));
        assert_eq!(c.qop(), Some("auth,auth-int"));
        assert_eq!(c.opaque(), Some("5ccc069c403ebaf9f0171e9517f40e41"));
        assert_eq!(c.algorithm(), None);
        assert_eq!(c.quality_of_protection(), Some(Qop::Auth));
        assert_eq!(c.digest_algorithm().unwrap(), Algorithm::default());
        assert!(!c.stale());
    }

    #[test]
    fn directive_order_and_spacing_do_not_matter() {
        let directives = [
            ("realm", "\"api@example.org\"", "api@example.org"),
            (
                "nonce",
                "\"5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK\"",
                "5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK",
            ),
            ("qop", "\"auth-int\"", "auth-int"),
            ("algorithm", "MD5-sess", "MD5-sess"),
            (
                "opaque",
                "\"HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS\"",
                "HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS",
            ),
        ];
        let separators = [",", ", ", " ,", " ,  ", ",\n\t"];

        for rotation in 0..directives.len() {
            for sep in separators.iter() {
                let mut ordered = directives.to_vec();
                ordered.rotate_left(rotation);
                if rotation % 2 == 1 {
                    ordered.reverse();
                }
                let body: Vec<String> = ordered
                    .iter()
                    .map(|(k, v, _)| format!("{}={}", k, v))
                    .collect();
                let header = format!("Digest {}", body.join(sep));
                let c = DigestChallenge::parse(&header);
                for (k, _, expected) in directives.iter() {
                    assert_eq!(c.directive(k), Some(*expected), "{} in {:?}", k, header);
                }
            }
        }
    }

    #[test]
    fn directive_names_are_case_insensitive() {
        let c = DigestChallenge::parse(r#"digest REALM="r", Nonce=abc, QOP="AUTH-INT""#);
        assert_eq!(c.realm(), Some("r"));
        assert_eq!(c.nonce(), Some("abc"));
        assert_eq!(c.quality_of_protection(), Some(Qop::AuthInt));
    }

    #[test]
    fn unquoted_and_multiline() {
        let c = DigestChallenge::parse(
            r#"Digest
        realm="http-auth@example.org",
        qop="auth, auth-int",
        algorithm=SHA-256,
        nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
        stale=TRUE"#,
        );
        assert_eq!(c.realm(), Some("http-auth@example.org"));
        assert_eq!(c.algorithm(), Some("SHA-256"));
        assert_eq!(c.nonce(), Some("7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v"));
        assert_eq!(c.qop(), Some("auth, auth-int"));
        assert!(c.stale());
    }

    #[test]
    fn quoted_values_keep_commas_and_escapes() {
        let c = DigestChallenge::parse(r#"Digest realm="a \"quoted\", realm\\", nonce="n""#);
        assert_eq!(c.realm(), Some(r#"a "quoted", realm\"#));
        assert_eq!(c.nonce(), Some("n"));
    }

    #[test]
    fn missing_realm_and_nonce_are_none() {
        let c = DigestChallenge::parse(r#"Digest qop="auth""#);
        assert_eq!(c.realm(), None);
        assert_eq!(c.nonce(), None);

        let c = DigestChallenge::parse("Digest");
        assert_eq!(c, DigestChallenge::default());

        let c = DigestChallenge::parse("");
        assert_eq!(c, DigestChallenge::default());
    }

    #[test]
    fn bare_directives_without_scheme() {
        let c = DigestChallenge::parse(r#"realm="aaa", nonce="bbb""#);
        assert_eq!(c.realm(), Some("aaa"));
        assert_eq!(c.nonce(), Some("bbb"));
    }

    #[test]
    fn picks_first_digest_among_schemes() {
        let c = DigestChallenge::parse(
            r#"Basic realm="basic", Digest realm="first", nonce="1", Negotiate, Digest realm="second", nonce="2""#,
        );
        assert_eq!(c.realm(), Some("first"));
        assert_eq!(c.nonce(), Some("1"));

        let c = DigestChallenge::parse(r#"Basic realm="only-basic""#);
        assert_eq!(c.realm(), None);
    }

    #[test]
    fn unsupported_algorithm_surfaces_on_lookup() {
        let c = DigestChallenge::parse(r#"Digest realm="r", nonce="n", algorithm=SHA-1"#);
        assert_eq!(c.algorithm(), Some("SHA-1"));
        assert!(matches!(
            c.digest_algorithm(),
            Err(crate::Error::UnsupportedAlgorithm(ref n)) if n == "SHA-1"
        ));
    }

    #[test]
    fn unknown_qop_tokens_are_ignored() {
        let c = DigestChallenge::parse(r#"Digest realm="r", nonce="n", qop="token""#);
        assert_eq!(c.quality_of_protection(), None);
    }

    #[test]
    fn from_headers() {
        let mut headers = HeaderMap::new();
        assert!(DigestChallenge::from_headers(&headers).is_none());

        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static(r#"Basic realm="x""#));
        assert!(DigestChallenge::from_headers(&headers).is_none());

        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_static(
                r#"Digest realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093""#,
            ),
        );
        let c = DigestChallenge::from_headers(&headers).unwrap();
        assert_eq!(c.realm(), Some("testrealm@host.com"));
    }

    #[test]
    fn from_headers_reads_utf8_realm() {
        let mut headers = HeaderMap::new();
        headers.insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_bytes("Digest realm=\"Zürich\", nonce=\"n\"".as_bytes()).unwrap(),
        );
        let c = DigestChallenge::from_headers(&headers).unwrap();
        assert_eq!(c.realm(), Some("Zürich"));
        assert_eq!(c.nonce(), Some("n"));
    }
}
