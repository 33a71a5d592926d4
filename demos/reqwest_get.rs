use async_trait::async_trait;
use digest_middleware::{Backend, Body, DigestAuthBackend, Error, Request, Response};
use tracing_subscriber::EnvFilter;

/// Sends requests with a `reqwest::Client`.
struct ReqwestBackend {
    client: reqwest::Client,
}

#[async_trait]
impl Backend for ReqwestBackend {
    type Stream = reqwest::Upgraded;

    async fn send(&self, request: Request) -> Result<Response, Error> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone());
        builder = match request.body_ref() {
            Body::Empty => builder,
            Body::Bytes(b) => builder.body(b.clone()),
            Body::Stream(s) => builder.body(reqwest::Body::wrap_stream(s.open())),
        };
        let res = builder.send().await.map_err(Error::backend)?;

        let mut response = http::Response::builder().status(res.status());
        if let Some(headers) = response.headers_mut() {
            *headers = res.headers().clone();
        }
        let body = res.bytes().await.map_err(Error::backend)?;
        response.body(body).map_err(Error::backend)
    }

    async fn open_stream(&self, request: Request) -> Result<Self::Stream, Error> {
        let res = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone())
            .send()
            .await
            .map_err(Error::backend)?;
        res.upgrade().await.map_err(Error::backend)
    }

    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Send a request to httpbin.org to a url that requires Digest Access Authentication
    let user = "FredJones";
    let password = "P@55w0rd!";
    let test_url = format!("http://httpbin.org/digest-auth/auth/{}/{}", user, password);

    let backend = DigestAuthBackend::new(ReqwestBackend {
        client: reqwest::Client::new(),
    });

    let uri = test_url.parse::<http::Uri>().map_err(Error::backend)?;
    let response = backend
        .send(Request::get(uri).digest_auth(user, password))
        .await?;

    println!("Status: {}", response.status());
    println!("Body:\n{}", String::from_utf8_lossy(response.body()));

    backend.close().await
}
