use async_trait::async_trait;
use http::{header::AUTHORIZATION, StatusCode};
use tracing::{debug, trace};

use crate::{
    authorization::AuthorizationHeader,
    backend::{Backend, Request, Response},
    calculator::{digest_uri, DigestSession},
    challenge::DigestChallenge,
    error::Result,
};

/// Answers `401 Digest` challenges on behalf of the wrapped backend.
///
/// Requests that carry digest credentials are sent once as-is. If the reply is
/// a `401` with a usable Digest challenge, the request is sent a second time
/// with a computed `Authorization` header and that second reply is returned,
/// whatever its status. Everything else passes straight through.
#[derive(Debug, Clone)]
pub struct DigestAuthBackend<B> {
    delegate: B,
}

impl<B: Backend> DigestAuthBackend<B> {
    pub fn new(delegate: B) -> Self {
        Self { delegate }
    }

    pub fn get_ref(&self) -> &B {
        &self.delegate
    }

    pub fn into_inner(self) -> B {
        self.delegate
    }

    /// Build the retry for `request` from `challenge`, or `None` when the
    /// challenge lacks a realm or nonce.
    fn authenticate(mut request: Request, challenge: &DigestChallenge) -> Result<Option<Request>> {
        let (realm, nonce) = match (challenge.realm(), challenge.nonce()) {
            (Some(realm), Some(nonce)) => (realm, nonce),
            _ => return Ok(None),
        };
        let credentials = match request.digest_credentials() {
            Some(credentials) => credentials,
            None => return Ok(None),
        };

        let session = DigestSession::new(
            request.method(),
            request.uri(),
            request.body_ref(),
            credentials,
            challenge,
        )?;
        let value = AuthorizationHeader::from_session(
            &session,
            credentials.username(),
            realm,
            digest_uri(request.uri()),
            nonce,
            challenge.opaque(),
        )
        .to_header_value()?;
        trace!(
            algorithm = %session.algorithm,
            qop = ?session.qop,
            "Computed digest response"
        );

        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(Some(request))
    }
}

#[async_trait]
impl<B: Backend> Backend for DigestAuthBackend<B> {
    type Stream = B::Stream;

    async fn send(&self, request: Request) -> Result<Response> {
        if request.digest_credentials().is_none() {
            trace!(uri = %request.uri(), "No digest credentials, passing through");
            return self.delegate.send(request).await;
        }

        let retry = request.clone();
        let response = self.delegate.send(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = match DigestChallenge::from_headers(response.headers()) {
            Some(challenge) => challenge,
            None => {
                debug!(uri = %retry.uri(), "401 without a Digest challenge");
                return Ok(response);
            }
        };

        match Self::authenticate(retry, &challenge)? {
            Some(retry) => {
                debug!(
                    method = %retry.method(),
                    uri = %retry.uri(),
                    "Retrying with Digest authorization"
                );
                self.delegate.send(retry).await
            }
            None => {
                debug!(
                    has_realm = challenge.realm().is_some(),
                    has_nonce = challenge.nonce().is_some(),
                    "Unusable Digest challenge"
                );
                Ok(response)
            }
        }
    }

    async fn open_stream(&self, request: Request) -> Result<Self::Stream> {
        self.delegate.open_stream(request).await
    }

    async fn close(&self) -> Result<()> {
        self.delegate.close().await
    }
}
