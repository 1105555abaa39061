//! Constants for the BTC info widget
//!
//! Endpoint layout, timeouts and derivation factors live here. Runtime
//! settings (currency, interval, base URLs) come from `config`.

/// The asset being priced
pub const BASE_ASSET: &str = "BTC";

/// Coinbase API base URL (price source)
pub const COINBASE_API_URL: &str = "https://api.coinbase.com/v2";

/// mempool.space API base URL (block height, fees, hash rate, mempool)
pub const MEMPOOL_API_URL: &str = "https://mempool.space/api";

/// Path of the block tip height endpoint, relative to the mempool base
pub const MEMPOOL_TIP_HEIGHT_PATH: &str = "/blocks/tip/height";

/// Path of the recommended fees endpoint
pub const MEMPOOL_FEES_PATH: &str = "/v1/fees/recommended";

/// Path of the one-week hash rate endpoint
pub const MEMPOOL_HASHRATE_PATH: &str = "/v1/mining/hashrate/1w";

/// Path of the mempool summary endpoint
pub const MEMPOOL_SUMMARY_PATH: &str = "/mempool";

/// HTTP request timeout for each endpoint (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum in-flight requests during one refresh cycle
pub const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Satoshis per bitcoin, numerator of the "Moscow time" figure
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Hashes per second in one peta-hash per second
pub const HASHES_PER_PETAHASH: f64 = 1e15;

/// Width of the right-aligned numeric column in the report
pub const REPORT_COLUMN_WIDTH: usize = 11;

/// Text shown instead of a report when any source fails
pub const FETCH_ERROR_MESSAGE: &str = "Error retrieving data from one of the APIs.";

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("btc-info/", env!("CARGO_PKG_VERSION"));

/// Program name shown in the about text
pub const PROGRAM_NAME: &str = "Bitcoin Info";

/// One-line description shown in the about text
pub const PROGRAM_COMMENT: &str = "Relevant BTC information at a glance.";
