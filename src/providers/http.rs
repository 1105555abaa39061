//! HTTP fetcher backed by reqwest

use crate::{
    constants::{REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::FetchError,
    provider::EndpointFetcher,
    types::DataSource,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetcher performing plain GET requests
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default request timeout
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Creates a fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self { client })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err)
    }
}

#[async_trait]
impl EndpointFetcher for HttpFetcher {
    async fn fetch_text(&self, source: DataSource, url: &str) -> Result<String, FetchError> {
        tracing::debug!(source = %source, url = url, "Fetching endpoint");

        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(classify)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one connection with a canned raw HTTP response
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/api/blocks/tip/height", addr)
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let url =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\n840000")
                .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.fetch_text(DataSource::BlockHeight, &url).await.unwrap();
        assert_eq!(body, "840000");
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_status() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch_text(DataSource::BlockHeight, &url).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(503))));
    }

    #[tokio::test]
    async fn test_silent_server_is_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/mempool", listener.local_addr().unwrap());

        // Accepts and holds the connection without answering
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = HttpFetcher::with_timeout(Duration::from_millis(200)).unwrap();
        let result = fetcher.fetch_text(DataSource::Unconfirmed, &url).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/mempool", listener.local_addr().unwrap());
        drop(listener);

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch_text(DataSource::Unconfirmed, &url).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
