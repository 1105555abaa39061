//! Concurrent fetch of all sources and assembly of the report

use crate::{
    constants::{MAX_CONCURRENT_REQUESTS, REQUEST_TIMEOUT_SECS},
    endpoints::EndpointSet,
    error::FetchError,
    metrics::{MetricsCollector, SourceMetrics},
    provider::EndpointFetcher,
    report::render_report,
    snapshot::MarketSnapshot,
    types::{DataSource, RawResponse},
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fetches all five sources and turns them into a report
///
/// All requests of a cycle run concurrently and are awaited together;
/// one slow or failing source never cancels the others. Any failure
/// voids the whole cycle.
pub struct FetchAggregator {
    fetcher: Arc<dyn EndpointFetcher>,
    metrics: Arc<MetricsCollector>,
    request_timeout: Duration,
}

impl FetchAggregator {
    /// Creates an aggregator with the default request timeout
    pub fn new(fetcher: Arc<dyn EndpointFetcher>) -> Self {
        Self::with_timeout(fetcher, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Creates an aggregator with a custom per-request timeout
    pub fn with_timeout(fetcher: Arc<dyn EndpointFetcher>, request_timeout: Duration) -> Self {
        Self {
            fetcher,
            metrics: Arc::new(MetricsCollector::new()),
            request_timeout,
        }
    }

    /// Runs one cycle and returns either the report or the error sentence
    pub async fn fetch_and_format(&self, endpoints: &EndpointSet) -> Result<String, String> {
        match self.fetch_snapshot(endpoints).await {
            Ok(snapshot) => Ok(render_report(&snapshot)),
            Err(e) => {
                tracing::warn!(
                    fetcher = self.fetcher.name(),
                    error = %e,
                    "Refresh cycle failed"
                );
                Err(e.user_message().to_string())
            }
        }
    }

    /// Runs one cycle and returns the parsed snapshot
    pub async fn fetch_snapshot(
        &self,
        endpoints: &EndpointSet,
    ) -> Result<MarketSnapshot, FetchError> {
        let start = Instant::now();
        let outcomes = self.fetch_all(endpoints).await;

        let mut responses = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for (source, outcome) in outcomes {
            match outcome {
                Ok(body) if body.trim().is_empty() => {
                    first_error.get_or_insert(FetchError::EmptyResponse(source));
                }
                Ok(body) => responses.push(RawResponse::new(source, body)),
                Err(e) => {
                    tracing::debug!(source = %source, error = %e, "Source failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let snapshot = MarketSnapshot::from_responses(endpoints.quote_currency(), &responses)?;

        tracing::debug!(
            quote = %snapshot.quote,
            price = snapshot.price,
            block_height = snapshot.block_height,
            latency_ms = start.elapsed().as_millis() as u64,
            "Refresh cycle succeeded"
        );

        Ok(snapshot)
    }

    /// Metrics for every source, in canonical order
    pub async fn source_metrics(&self) -> Vec<SourceMetrics> {
        self.metrics.all_metrics().await
    }

    /// Issues every request and waits for all of them
    ///
    /// Results come back in canonical source order regardless of which
    /// request finished first.
    async fn fetch_all(
        &self,
        endpoints: &EndpointSet,
    ) -> Vec<(DataSource, Result<String, FetchError>)> {
        let requests: Vec<(DataSource, String)> = endpoints
            .iter()
            .map(|(source, url)| (source, url.to_string()))
            .collect();

        let mut outcomes: Vec<(DataSource, Result<String, FetchError>)> = stream::iter(requests)
            .map(|(source, url)| async move {
                let outcome = self.fetch_one(source, &url).await;
                (source, outcome)
            })
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await;

        outcomes.sort_by_key(|(source, _)| {
            DataSource::all()
                .iter()
                .position(|s| s == source)
                .unwrap_or(usize::MAX)
        });
        outcomes
    }

    async fn fetch_one(&self, source: DataSource, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.fetcher.fetch_text(source, url),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        };

        let success = matches!(&result, Ok(body) if !body.trim().is_empty());
        self.metrics
            .record_request(source, start.elapsed(), success)
            .await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FETCH_ERROR_MESSAGE;
    use crate::provider::mock::{MockFetcher, MockResponse};
    use crate::types::Currency;

    fn aggregator(mock: Arc<MockFetcher>) -> FetchAggregator {
        FetchAggregator::new(mock)
    }

    #[tokio::test]
    async fn test_full_report_when_all_sources_succeed() {
        let mock = Arc::new(MockFetcher::healthy());
        let aggregator = aggregator(mock.clone());

        let report = aggregator
            .fetch_and_format(&EndpointSet::new(Currency::EUR))
            .await
            .unwrap();

        assert!(report.starts_with("BTC ➔ EUR\n\n"));
        let data_lines = report.lines().filter(|l| l.contains(':')).count();
        assert_eq!(data_lines, 9);
        assert_eq!(mock.call_count(), 5);
    }

    #[tokio::test]
    async fn test_any_single_failure_yields_error_sentence() {
        let failures = [
            MockResponse::Body(String::new()),
            MockResponse::Body("   ".to_string()),
            MockResponse::Timeout,
            MockResponse::Status(502),
            MockResponse::Body("{not json".to_string()),
        ];

        for source in DataSource::all() {
            for failure in &failures {
                let mock = Arc::new(MockFetcher::healthy());
                mock.set_response(*source, failure.clone());

                let outcome = aggregator(mock.clone())
                    .fetch_and_format(&EndpointSet::new(Currency::USD))
                    .await;

                assert_eq!(
                    outcome,
                    Err(FETCH_ERROR_MESSAGE.to_string()),
                    "source {} with {:?}",
                    source,
                    failure
                );
                // Every request is still issued
                assert_eq!(mock.call_count(), 5);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_body_reported_as_empty_response() {
        let mock = Arc::new(MockFetcher::healthy());
        mock.set_body(DataSource::Fees, "");

        let err = aggregator(mock)
            .fetch_snapshot(&EndpointSet::new(Currency::EUR))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::EmptyResponse(DataSource::Fees)));
    }

    #[tokio::test]
    async fn test_zero_price_fails_cycle() {
        let mock = Arc::new(MockFetcher::healthy());
        mock.set_body(DataSource::Price, r#"{"data":{"amount":"0"}}"#);

        let err = aggregator(mock)
            .fetch_snapshot(&EndpointSet::new(Currency::EUR))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Domain(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_times_out_without_blocking_others() {
        let mock = Arc::new(MockFetcher::healthy());
        mock.set_response(DataSource::Hashrate, MockResponse::Hang);
        let aggregator = aggregator(mock.clone());

        let started = tokio::time::Instant::now();
        let err = aggregator
            .fetch_snapshot(&EndpointSet::new(Currency::EUR))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(REQUEST_TIMEOUT_SECS));
        assert!(elapsed < Duration::from_secs(REQUEST_TIMEOUT_SECS + 1));
        assert_eq!(mock.call_count(), 5);

        let metrics = aggregator.source_metrics().await;
        let hashrate = metrics
            .iter()
            .find(|m| m.source == DataSource::Hashrate)
            .unwrap();
        assert_eq!(hashrate.failed_requests, 1);
        let price = metrics
            .iter()
            .find(|m| m.source == DataSource::Price)
            .unwrap();
        assert_eq!(price.failed_requests, 0);
        assert_eq!(price.total_requests, 1);
    }

    #[tokio::test]
    async fn test_requests_follow_endpoint_set() {
        let mock = Arc::new(MockFetcher::healthy());
        let endpoints = EndpointSet::new(Currency::PLN);

        aggregator(mock.clone())
            .fetch_and_format(&endpoints)
            .await
            .unwrap();

        let mut requested = mock.requested_urls();
        requested.sort();
        let mut expected: Vec<String> = endpoints.iter().map(|(_, u)| u.to_string()).collect();
        expected.sort();
        assert_eq!(requested, expected);
    }
}
