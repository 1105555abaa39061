//! Per-source fetch metrics
//!
//! Tracks latency percentiles and success rates for each data source.

use crate::types::DataSource;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep per source
const MAX_SAMPLES: usize = 100;

/// Metrics for a single data source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetrics {
    /// The data source
    pub source: DataSource,
    /// 50th percentile latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of requests tracked
    pub total_requests: u64,
    /// Number of failed requests
    pub failed_requests: u64,
}

impl SourceMetrics {
    /// Creates metrics with no data
    pub fn empty(source: DataSource) -> Self {
        Self {
            source,
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct SourceWindow {
    samples: VecDeque<LatencySample>,
    total_requests: u64,
    failed_requests: u64,
}

/// Collects and computes metrics for every source
#[derive(Debug, Default)]
pub struct MetricsCollector {
    windows: RwLock<HashMap<DataSource, SourceWindow>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one request with its duration and success status
    pub async fn record_request(&self, source: DataSource, duration: Duration, success: bool) {
        let mut windows = self.windows.write().await;
        let window = windows.entry(source).or_default();

        window.total_requests += 1;
        if !success {
            window.failed_requests += 1;
        }

        if window.samples.len() >= MAX_SAMPLES {
            window.samples.pop_front();
        }
        window.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    /// Computes current metrics for one source
    pub async fn get_metrics(&self, source: DataSource) -> SourceMetrics {
        let windows = self.windows.read().await;
        match windows.get(&source) {
            Some(window) => compute(source, window),
            None => SourceMetrics::empty(source),
        }
    }

    /// Computes current metrics for all sources, in canonical order
    pub async fn all_metrics(&self) -> Vec<SourceMetrics> {
        let windows = self.windows.read().await;
        DataSource::all()
            .iter()
            .map(|source| match windows.get(source) {
                Some(window) => compute(*source, window),
                None => SourceMetrics::empty(*source),
            })
            .collect()
    }
}

fn compute(source: DataSource, window: &SourceWindow) -> SourceMetrics {
    if window.samples.is_empty() {
        return SourceMetrics::empty(source);
    }

    // Percentiles only over successful requests
    let mut latencies: Vec<f64> = window
        .samples
        .iter()
        .filter(|s| s.success)
        .map(|s| s.duration_ms)
        .collect();

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let success_rate = if window.total_requests > 0 {
        (window.total_requests - window.failed_requests) as f64 / window.total_requests as f64
    } else {
        1.0
    };

    SourceMetrics {
        source,
        latency_p50_ms: percentile(&latencies, 50.0),
        latency_p99_ms: percentile(&latencies, 99.0),
        success_rate,
        total_requests: window.total_requests,
        failed_requests: window.failed_requests,
    }
}

/// Nearest-rank percentile of sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let rank = (p / 100.0 * sorted_values.len() as f64).ceil() as usize;
    sorted_values[rank.saturating_sub(1).min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let collector = MetricsCollector::new();

        collector
            .record_request(DataSource::Fees, Duration::from_millis(100), true)
            .await;
        collector
            .record_request(DataSource::Fees, Duration::from_millis(200), true)
            .await;
        collector
            .record_request(DataSource::Fees, Duration::from_millis(150), false)
            .await;

        let metrics = collector.get_metrics(DataSource::Fees).await;

        assert_eq!(metrics.source, DataSource::Fees);
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
        assert_eq!(metrics.latency_p50_ms, 100.0);
        assert_eq!(metrics.latency_p99_ms, 200.0);
    }

    #[tokio::test]
    async fn test_sources_are_tracked_separately() {
        let collector = MetricsCollector::new();
        collector
            .record_request(DataSource::Price, Duration::from_millis(50), false)
            .await;

        let all = collector.all_metrics().await;
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].failed_requests, 1);
        assert_eq!(all[1], SourceMetrics::empty(DataSource::BlockHeight));
    }

    #[tokio::test]
    async fn test_window_is_bounded() {
        let collector = MetricsCollector::new();
        for _ in 0..(MAX_SAMPLES + 20) {
            collector
                .record_request(DataSource::Hashrate, Duration::from_millis(10), true)
                .await;
        }

        let windows = collector.windows.read().await;
        let window = &windows[&DataSource::Hashrate];
        assert_eq!(window.samples.len(), MAX_SAMPLES);
        assert_eq!(window.total_requests, (MAX_SAMPLES + 20) as u64);
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 90.0), 9.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&[42.0], 50.0), 42.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
