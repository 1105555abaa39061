//! Fetcher abstraction for retrieving raw bodies from the data sources

use crate::{error::FetchError, types::DataSource};
use async_trait::async_trait;

/// Trait for endpoint fetchers
///
/// Implementations perform one GET against `url` and return the body
/// text. They do not interpret the body; parsing happens in `snapshot`.
#[async_trait]
pub trait EndpointFetcher: Send + Sync {
    /// Fetches the body at `url` for the given source
    ///
    /// # Arguments
    /// * `source` - Which logical source the URL belongs to (for logging)
    /// * `url` - Fully built endpoint URL
    async fn fetch_text(&self, source: DataSource, url: &str) -> Result<String, FetchError>;

    /// Returns the name of this fetcher
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned behavior for one source
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        Body(String),
        Timeout,
        Status(u16),
        /// Never answers; only the caller's timeout ends the request
        Hang,
    }

    /// Mock fetcher for testing
    pub struct MockFetcher {
        responses: Arc<Mutex<HashMap<DataSource, MockResponse>>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl Default for MockFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self {
                responses: Arc::new(Mutex::new(HashMap::new())),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Mock answering every source with the reference fixtures
        pub fn healthy() -> Self {
            let mock = Self::new();
            for source in DataSource::all() {
                mock.set_body(*source, crate::snapshot::fixtures::body(*source));
            }
            mock
        }

        pub fn set_body(&self, source: DataSource, body: &str) {
            self.set_response(source, MockResponse::Body(body.to_string()));
        }

        pub fn set_response(&self, source: DataSource, response: MockResponse) {
            self.responses.lock().unwrap().insert(source, response);
        }

        /// URLs requested so far, in completion order
        pub fn requested_urls(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requested.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EndpointFetcher for MockFetcher {
        async fn fetch_text(&self, source: DataSource, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            let response = self.responses.lock().unwrap().get(&source).cloned();

            match response {
                Some(MockResponse::Body(body)) => Ok(body),
                Some(MockResponse::Timeout) => Err(FetchError::Timeout),
                Some(MockResponse::Status(code)) => Err(FetchError::HttpStatus(code)),
                Some(MockResponse::Hang) => futures::future::pending().await,
                None => Ok(String::new()),
            }
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
