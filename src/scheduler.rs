//! Refresh scheduler
//!
//! Owns the repeating timer and the endpoint set, runs refresh cycles and
//! hands each resulting text to the registered sink.
//!
//! ```text
//! start / reconfigure / trigger_now / set_currency / timer tick
//!     ↓
//! cycle gate (one cycle at a time, in call order)
//!     ↓
//! FetchAggregator::fetch_and_format
//!     ↓
//! ReportSink::on_report
//! ```

use crate::{
    aggregator::FetchAggregator,
    endpoints::EndpointSet,
    metrics::SourceMetrics,
    types::{CycleReport, CycleTrigger, Currency, RefreshInterval},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use uuid::Uuid;

/// Receiver of every cycle's text, report or error sentence alike
pub trait ReportSink: Send + Sync {
    fn on_report(&self, text: &str);
}

impl<F> ReportSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_report(&self, text: &str) {
        self(text)
    }
}

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed
    Idle,
    /// One repeating timer armed at `interval`
    Scheduled { interval: RefreshInterval },
}

/// Interval and timer handle; at most one handle exists at a time
struct RefreshConfig {
    interval: RefreshInterval,
    timer: Option<JoinHandle<()>>,
}

/// State shared between the scheduler and its timer task
struct Shared {
    aggregator: FetchAggregator,
    endpoints: RwLock<EndpointSet>,
    sink: Arc<dyn ReportSink>,
    cycle_gate: Mutex<()>,
    last_report: RwLock<Option<CycleReport>>,
    closed: AtomicBool,
}

impl Shared {
    async fn run_cycle(&self, trigger: CycleTrigger) {
        let _gate = self.cycle_gate.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let id = Uuid::new_v4();
        let endpoints = self.endpoints.read().await.clone();
        tracing::debug!(
            cycle_id = %id,
            trigger = ?trigger,
            quote = %endpoints.quote_currency(),
            "Starting refresh cycle"
        );

        let outcome = self.aggregator.fetch_and_format(&endpoints).await;
        let report = CycleReport::new(id, trigger, outcome);

        if self.closed.load(Ordering::Acquire) {
            tracing::debug!(cycle_id = %id, "Scheduler shut down, dropping report");
            return;
        }

        self.sink.on_report(&report.text);
        tracing::info!(
            cycle_id = %id,
            trigger = ?trigger,
            succeeded = report.succeeded,
            "Report delivered"
        );

        *self.last_report.write().await = Some(report);
    }
}

/// Runs refresh cycles on a reconfigurable repeating timer
///
/// # Example
/// ```no_run
/// use btc_info::{
///     Currency, EndpointSet, FetchAggregator, HttpFetcher, RefreshInterval, RefreshScheduler,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let aggregator = FetchAggregator::new(Arc::new(HttpFetcher::new()?));
/// let scheduler = RefreshScheduler::new(
///     aggregator,
///     EndpointSet::new(Currency::EUR),
///     Arc::new(|text: &str| println!("{}", text)),
/// );
///
/// scheduler.start(RefreshInterval::OneMinute).await;
/// scheduler.reconfigure(RefreshInterval::FiveMinutes).await;
/// # Ok(())
/// # }
/// ```
pub struct RefreshScheduler {
    shared: Arc<Shared>,
    config: Mutex<RefreshConfig>,
}

impl RefreshScheduler {
    /// Creates an idle scheduler
    pub fn new(
        aggregator: FetchAggregator,
        endpoints: EndpointSet,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let shared = Arc::new(Shared {
            aggregator,
            endpoints: RwLock::new(endpoints),
            sink,
            cycle_gate: Mutex::new(()),
            last_report: RwLock::new(None),
            closed: AtomicBool::new(false),
        });

        Self {
            shared,
            config: Mutex::new(RefreshConfig {
                interval: RefreshInterval::default(),
                timer: None,
            }),
        }
    }

    /// Runs one cycle immediately, then arms the timer at `interval`
    ///
    /// Starting an already scheduled scheduler replaces its timer.
    pub async fn start(&self, interval: RefreshInterval) {
        if self.is_closed() {
            tracing::warn!("Ignoring start on a shut down scheduler");
            return;
        }

        tracing::info!(
            refresh_interval_secs = interval.secs(),
            "Starting refresh scheduler"
        );
        self.shared.run_cycle(CycleTrigger::Startup).await;

        let mut config = self.config.lock().await;
        Self::disarm(&mut config);
        self.arm(&mut config, interval);
    }

    /// Runs one timer-driven cycle
    pub async fn on_tick(&self) {
        self.shared.run_cycle(CycleTrigger::Timer).await;
    }

    /// Replaces the timer with one at `interval`, then refreshes immediately
    pub async fn reconfigure(&self, interval: RefreshInterval) {
        if self.is_closed() {
            return;
        }

        {
            let mut config = self.config.lock().await;
            Self::disarm(&mut config);
            self.arm(&mut config, interval);
        }

        tracing::info!(
            refresh_interval_secs = interval.secs(),
            "Refresh interval changed"
        );
        self.shared.run_cycle(CycleTrigger::IntervalChange).await;
    }

    /// Runs one cycle without touching the timer
    pub async fn trigger_now(&self) {
        self.shared.run_cycle(CycleTrigger::Manual).await;
    }

    /// Switches the quote currency, then refreshes immediately
    pub async fn set_currency(&self, currency: Currency) {
        self.shared
            .endpoints
            .write()
            .await
            .set_quote_currency(currency);

        tracing::info!(currency = %currency, name = currency.name(), "Currency changed");
        self.shared.run_cycle(CycleTrigger::CurrencyChange).await;
    }

    /// Disarms the timer; safe to call when already idle
    ///
    /// A cycle already running finishes and is still delivered.
    pub async fn cancel(&self) {
        let mut config = self.config.lock().await;
        Self::disarm(&mut config);
    }

    /// Disarms the timer and stops delivering reports
    pub async fn shutdown(&self) {
        self.shared.closed.store(true, Ordering::Release);
        self.cancel().await;
        tracing::info!("Refresh scheduler shut down");
    }

    /// Current scheduler state
    pub async fn state(&self) -> SchedulerState {
        let config = self.config.lock().await;
        match config.timer {
            Some(_) => SchedulerState::Scheduled {
                interval: config.interval,
            },
            None => SchedulerState::Idle,
        }
    }

    /// Most recently requested refresh interval
    pub async fn current_interval(&self) -> RefreshInterval {
        self.config.lock().await.interval
    }

    /// Current quote currency
    pub async fn current_currency(&self) -> Currency {
        self.shared.endpoints.read().await.quote_currency()
    }

    /// Outcome of the last delivered cycle
    pub async fn last_report(&self) -> Option<CycleReport> {
        self.shared.last_report.read().await.clone()
    }

    /// Per-source fetch metrics
    pub async fn source_metrics(&self) -> Vec<SourceMetrics> {
        self.shared.aggregator.source_metrics().await
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    fn arm(&self, config: &mut RefreshConfig, interval: RefreshInterval) {
        // Checked under the config lock; shutdown sets the flag before taking it
        if self.is_closed() {
            tracing::debug!("Scheduler shut down, not arming timer");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = interval.duration();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // Separate task: aborting the timer must not abort a running cycle
                let shared = Arc::clone(&shared);
                let cycle =
                    tokio::spawn(async move { shared.run_cycle(CycleTrigger::Timer).await });
                if let Err(e) = cycle.await {
                    tracing::warn!(error = %e, "Refresh cycle task failed");
                }
            }
        });

        config.interval = interval;
        config.timer = Some(handle);
    }

    fn disarm(config: &mut RefreshConfig) {
        if let Some(handle) = config.timer.take() {
            handle.abort();
            tracing::debug!(
                refresh_interval_secs = config.interval.secs(),
                "Refresh timer cancelled"
            );
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        Self::disarm(self.config.get_mut());
    }
}
