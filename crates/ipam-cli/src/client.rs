use anyhow::{Context, Result};
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response};
use hyper_util::client::legacy::Client;
use hyperlocal::{UnixClientExt, UnixConnector, Uri};
use serde::{de::DeserializeOwned, Serialize};

pub enum ApiClient {
    Unix {
        client: Client<UnixConnector, Full<Bytes>>,
        socket_path: String,
    },
    Http {
        client: Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>,
        base_url: String,
    },
}

impl ApiClient {
    pub fn new_unix(socket_path: &str) -> Self {
        let client = Client::unix();
        Self::Unix {
            client,
            socket_path: socket_path.to_string(),
        }
    }

    pub fn new_http(base_url: &str) -> Self {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build_http();
        Self::Http {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_uri(&self, path: &str) -> Result<hyper::Uri> {
        match self {
            Self::Unix { socket_path, .. } => Ok(Uri::new(socket_path, path).into()),
            Self::Http { base_url, .. } => format!("{}{}", base_url, path)
                .parse()
                .with_context(|| format!("Invalid API URL {}{}", base_url, path)),
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Bytes> {
        let mut builder = Request::builder().method(method).uri(self.build_uri(path)?);
        let body = match body {
            Some(bytes) => {
                builder = builder.header("content-type", "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::default(),
        };
        let req = builder.body(body)?;

        let response: Response<hyper::body::Incoming> = match self {
            Self::Unix { client, .. } => client.request(req).await?,
            Self::Http { client, .. } => client.request(req).await?,
        };

        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            // Error bodies are {"error": "..."}
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
            match message {
                Some(message) => anyhow::bail!("{} ({})", message, status),
                None => anyhow::bail!("Request failed with status: {}", status),
            }
        }

        Ok(bytes)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let body = self.send(Method::GET, path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn post<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let body = self
            .send(Method::POST, path, Some(serde_json::to_vec(body)?))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn put<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let body = self
            .send(Method::PUT, path, Some(serde_json::to_vec(body)?))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }
}
