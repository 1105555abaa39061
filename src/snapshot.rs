//! Parsing of raw source bodies into a market snapshot

use crate::{
    constants::{HASHES_PER_PETAHASH, SATS_PER_BTC},
    error::FetchError,
    types::{Currency, DataSource, RawResponse},
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Coinbase `/prices/{pair}/buy` response
#[derive(Debug, Deserialize)]
struct CoinbasePriceResponse {
    data: CoinbasePriceData,
}

#[derive(Debug, Deserialize)]
struct CoinbasePriceData {
    amount: String,
}

/// mempool.space `/v1/fees/recommended` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedFeesResponse {
    economy_fee: u64,
    hour_fee: u64,
    half_hour_fee: u64,
    fastest_fee: u64,
}

/// mempool.space `/v1/mining/hashrate/1w` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashrateResponse {
    current_hashrate: f64,
}

/// mempool.space `/mempool` response
#[derive(Debug, Deserialize)]
struct MempoolSummaryResponse {
    count: u64,
}

/// Recommended fee rates in sat/vB, slowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTiers {
    pub economy: u64,
    pub hour: u64,
    pub half_hour: u64,
    pub fastest: u64,
}

/// One complete, internally consistent set of market data
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Quote currency the price is expressed in
    pub quote: Currency,

    /// Price of one BTC in the quote currency
    pub price: f64,

    /// Satoshis per unit of quote currency ("Moscow time")
    pub sats_per_unit: f64,

    /// Recommended fee tiers
    pub fees: FeeTiers,

    /// Height of the chain tip
    pub block_height: u64,

    /// Network hash rate in PH/s
    pub hashrate_phs: f64,

    /// Unconfirmed transactions in the mempool
    pub unconfirmed: u64,
}

impl MarketSnapshot {
    /// Builds a snapshot from one body per source
    ///
    /// Fails if any source is missing, empty or malformed, or if the
    /// derived values are undefined. No partial snapshot is produced.
    pub fn from_responses(quote: Currency, responses: &[RawResponse]) -> Result<Self, FetchError> {
        let price = parse_price(body_for(responses, DataSource::Price)?)?;
        let block_height = parse_block_height(body_for(responses, DataSource::BlockHeight)?)?;
        let fees = parse_fees(body_for(responses, DataSource::Fees)?)?;
        let hashrate_phs = parse_hashrate(body_for(responses, DataSource::Hashrate)?)?;
        let unconfirmed = parse_unconfirmed(body_for(responses, DataSource::Unconfirmed)?)?;

        Ok(Self {
            quote,
            price,
            sats_per_unit: sats_per_unit(price)?,
            fees,
            block_height,
            hashrate_phs,
            unconfirmed,
        })
    }
}

/// Satoshis bought by one unit of quote currency at `price`
pub fn sats_per_unit(price: f64) -> Result<f64, FetchError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::domain(format!(
            "price must be a positive number, got {}",
            price
        )));
    }

    Ok(SATS_PER_BTC / price)
}

fn body_for(responses: &[RawResponse], source: DataSource) -> Result<&str, FetchError> {
    let response = responses
        .iter()
        .find(|r| r.source == source)
        .ok_or_else(|| FetchError::malformed(source, "no response recorded"))?;

    if response.body.trim().is_empty() {
        return Err(FetchError::EmptyResponse(source));
    }

    Ok(&response.body)
}

fn decode<T: DeserializeOwned>(source: DataSource, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        FetchError::malformed(source, format!("{}. Response: {}", e, body.trim()))
    })
}

fn parse_price(body: &str) -> Result<f64, FetchError> {
    let response: CoinbasePriceResponse = decode(DataSource::Price, body)?;
    let amount = response.data.amount.replace(',', "");

    amount.trim().parse::<f64>().map_err(|e| {
        FetchError::malformed(
            DataSource::Price,
            format!("amount {:?} is not a number: {}", response.data.amount, e),
        )
    })
}

fn parse_block_height(body: &str) -> Result<u64, FetchError> {
    decode(DataSource::BlockHeight, body)
}

fn parse_fees(body: &str) -> Result<FeeTiers, FetchError> {
    let response: RecommendedFeesResponse = decode(DataSource::Fees, body)?;

    Ok(FeeTiers {
        economy: response.economy_fee,
        hour: response.hour_fee,
        half_hour: response.half_hour_fee,
        fastest: response.fastest_fee,
    })
}

fn parse_hashrate(body: &str) -> Result<f64, FetchError> {
    let response: HashrateResponse = decode(DataSource::Hashrate, body)?;
    Ok(response.current_hashrate / HASHES_PER_PETAHASH)
}

fn parse_unconfirmed(body: &str) -> Result<u64, FetchError> {
    let response: MempoolSummaryResponse = decode(DataSource::Unconfirmed, body)?;
    Ok(response.count)
}
