//! Types for the BTC info widget

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Supported quote currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro
    #[default]
    EUR,
    /// US Dollar
    USD,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
    /// Swiss Franc
    CHF,
    /// British Pound
    GBP,
    /// Russian Ruble
    RUB,
    /// Brazilian Real
    BRL,
    /// Hungarian Forint
    HUF,
    /// Turkish Lira
    TRY,
    /// Polish Zloty
    PLN,
}

impl Currency {
    /// Get the ISO currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::GBP => "GBP",
            Currency::RUB => "RUB",
            Currency::BRL => "BRL",
            Currency::HUF => "HUF",
            Currency::TRY => "TRY",
            Currency::PLN => "PLN",
        }
    }

    /// Get the display name shown in the currency menu
    pub fn name(&self) -> &'static str {
        match self {
            Currency::EUR => "Euro",
            Currency::USD => "US Dollar",
            Currency::CAD => "Canadian Dollar",
            Currency::AUD => "Australian Dollar",
            Currency::CHF => "Swiss Franc",
            Currency::GBP => "British Pound",
            Currency::RUB => "Russian Ruble",
            Currency::BRL => "Brazilian Real",
            Currency::HUF => "Hungary Forint",
            Currency::TRY => "Turkish Lira",
            Currency::PLN => "Polish Zloty",
        }
    }

    /// Get all supported currencies, in menu order
    pub fn all() -> &'static [Currency] {
        &[
            Currency::EUR,
            Currency::USD,
            Currency::CAD,
            Currency::AUD,
            Currency::CHF,
            Currency::GBP,
            Currency::RUB,
            Currency::BRL,
            Currency::HUF,
            Currency::TRY,
            Currency::PLN,
        ]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ConfigError::UnsupportedCurrency(code.to_string()))
    }
}

/// Supported refresh intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum RefreshInterval {
    #[default]
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl RefreshInterval {
    /// Interval length in seconds
    pub fn secs(&self) -> u64 {
        match self {
            RefreshInterval::OneMinute => 60,
            RefreshInterval::TwoMinutes => 120,
            RefreshInterval::FiveMinutes => 300,
            RefreshInterval::TenMinutes => 600,
            RefreshInterval::FifteenMinutes => 900,
            RefreshInterval::ThirtyMinutes => 1800,
            RefreshInterval::OneHour => 3600,
        }
    }

    /// Interval as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.secs())
    }

    /// Label shown in the interval menu
    pub fn label(&self) -> &'static str {
        match self {
            RefreshInterval::OneMinute => "01 min",
            RefreshInterval::TwoMinutes => "02 min",
            RefreshInterval::FiveMinutes => "05 min",
            RefreshInterval::TenMinutes => "10 min",
            RefreshInterval::FifteenMinutes => "15 min",
            RefreshInterval::ThirtyMinutes => "30 min",
            RefreshInterval::OneHour => "01 hrs",
        }
    }

    /// Get all supported intervals, shortest first
    pub fn all() -> &'static [RefreshInterval] {
        &[
            RefreshInterval::OneMinute,
            RefreshInterval::TwoMinutes,
            RefreshInterval::FiveMinutes,
            RefreshInterval::TenMinutes,
            RefreshInterval::FifteenMinutes,
            RefreshInterval::ThirtyMinutes,
            RefreshInterval::OneHour,
        ]
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = ConfigError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        RefreshInterval::all()
            .iter()
            .copied()
            .find(|i| i.secs() == secs)
            .ok_or(ConfigError::UnsupportedInterval(secs))
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.secs()
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

/// Logical data sources queried every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Spot price in the quote currency
    Price,
    /// Height of the chain tip
    BlockHeight,
    /// Recommended fee rates
    Fees,
    /// Network hash rate
    Hashrate,
    /// Unconfirmed transaction count
    Unconfirmed,
}

impl DataSource {
    /// Stable identifier used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Price => "price",
            DataSource::BlockHeight => "block_height",
            DataSource::Fees => "fees",
            DataSource::Hashrate => "hashrate",
            DataSource::Unconfirmed => "unconfirmed",
        }
    }

    /// All sources in canonical order
    pub fn all() -> &'static [DataSource] {
        &[
            DataSource::Price,
            DataSource::BlockHeight,
            DataSource::Fees,
            DataSource::Hashrate,
            DataSource::Unconfirmed,
        ]
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unparsed body returned by one source
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub source: DataSource,
    pub body: String,
}

impl RawResponse {
    pub fn new(source: DataSource, body: impl Into<String>) -> Self {
        Self {
            source,
            body: body.into(),
        }
    }
}

/// What caused a refresh cycle to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrigger {
    /// First cycle, before the timer is armed
    Startup,
    /// Regular timer tick
    Timer,
    /// User asked for a refresh
    Manual,
    /// Quote currency was changed
    CurrencyChange,
    /// Refresh interval was changed
    IntervalChange,
}

/// Outcome of one completed refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Unique cycle id, also used to correlate log lines
    pub id: Uuid,

    /// What started the cycle
    pub trigger: CycleTrigger,

    /// Text delivered to the sink (report or error sentence)
    pub text: String,

    /// Whether every source succeeded
    pub succeeded: bool,

    /// When the cycle finished
    pub completed_at: DateTime<Utc>,
}

impl CycleReport {
    /// Builds a report from the aggregator outcome
    pub fn new(id: Uuid, trigger: CycleTrigger, outcome: Result<String, String>) -> Self {
        let (text, succeeded) = match outcome {
            Ok(text) => (text, true),
            Err(text) => (text, false),
        };

        Self {
            id,
            trigger,
            text,
            succeeded,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" Chf ".parse::<Currency>().unwrap(), Currency::CHF);
        assert!(matches!(
            "JPY".parse::<Currency>(),
            Err(ConfigError::UnsupportedCurrency(code)) if code == "JPY"
        ));
    }

    #[test]
    fn test_currency_list_matches_menu() {
        let codes: Vec<&str> = Currency::all().iter().map(|c| c.code()).collect();
        assert_eq!(
            codes,
            ["EUR", "USD", "CAD", "AUD", "CHF", "GBP", "RUB", "BRL", "HUF", "TRY", "PLN"]
        );
        assert_eq!(Currency::default(), Currency::EUR);
    }

    #[test]
    fn test_interval_from_secs() {
        assert_eq!(
            RefreshInterval::try_from(300).unwrap(),
            RefreshInterval::FiveMinutes
        );
        assert_eq!(RefreshInterval::OneHour.label(), "01 hrs");
        assert!(matches!(
            RefreshInterval::try_from(45),
            Err(ConfigError::UnsupportedInterval(45))
        ));

        let secs: Vec<u64> = RefreshInterval::all().iter().map(|i| i.secs()).collect();
        assert_eq!(secs, [60, 120, 300, 600, 900, 1800, 3600]);
    }

    #[test]
    fn test_cycle_report_from_outcome() {
        let ok = CycleReport::new(Uuid::new_v4(), CycleTrigger::Manual, Ok("report".into()));
        assert!(ok.succeeded);
        assert_eq!(ok.text, "report");

        let failed = CycleReport::new(Uuid::new_v4(), CycleTrigger::Timer, Err("oops".into()));
        assert!(!failed.succeeded);
        assert_eq!(failed.text, "oops");
    }
}
