//! # BTC Info
//!
//! Relevant BTC information at a glance: price in a selectable quote
//! currency, sats per currency unit, recommended fees, block height,
//! network hash rate and mempool size.
//!
//! Every refresh cycle queries five public endpoints (Coinbase for the
//! price, mempool.space for the rest) concurrently and renders one
//! fixed-layout text report. If any source fails, the cycle yields a
//! single error sentence instead; partial reports are never produced.
//!
//! ## Usage
//!
//! ```no_run
//! use btc_info::{
//!     Currency, EndpointSet, FetchAggregator, HttpFetcher, RefreshInterval, RefreshScheduler,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = FetchAggregator::new(Arc::new(HttpFetcher::new()?));
//!
//! // One-off report
//! let endpoints = EndpointSet::new(Currency::USD);
//! match aggregator.fetch_and_format(&endpoints).await {
//!     Ok(report) => println!("{}", report),
//!     Err(message) => eprintln!("{}", message),
//! }
//!
//! // Recurring reports
//! let scheduler = RefreshScheduler::new(
//!     aggregator,
//!     endpoints,
//!     Arc::new(|text: &str| println!("{}", text)),
//! );
//! scheduler.start(RefreshInterval::FiveMinutes).await;
//! scheduler.set_currency(Currency::CHF).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RefreshScheduler (timer, currency, interval)
//!     ↓
//! FetchAggregator (5 concurrent GETs, join-all)
//!     ↓
//! MarketSnapshot (parse + derive)
//!     ↓
//! render_report → ReportSink
//! ```

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod report;
pub mod scheduler;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use aggregator::FetchAggregator;
pub use config::AppConfig;
pub use endpoints::EndpointSet;
pub use error::{ConfigError, FetchError};
pub use metrics::SourceMetrics;
pub use provider::EndpointFetcher;
pub use providers::HttpFetcher;
pub use report::render_report;
pub use scheduler::{RefreshScheduler, ReportSink, SchedulerState};
pub use snapshot::{FeeTiers, MarketSnapshot};
pub use types::{CycleReport, CycleTrigger, Currency, DataSource, RawResponse, RefreshInterval};
