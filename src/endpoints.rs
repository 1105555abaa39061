//! Endpoint URLs queried every refresh cycle

use crate::{
    constants::{
        BASE_ASSET, COINBASE_API_URL, MEMPOOL_API_URL, MEMPOOL_FEES_PATH, MEMPOOL_HASHRATE_PATH,
        MEMPOOL_SUMMARY_PATH, MEMPOOL_TIP_HEIGHT_PATH,
    },
    types::{Currency, DataSource},
};

/// Named URLs for the five data sources
///
/// Only the price URL depends on the quote currency; the four mempool
/// URLs are fixed for the lifetime of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    quote: Currency,
    coinbase_base: String,
    price: String,
    block_height: String,
    fees: String,
    hashrate: String,
    unconfirmed: String,
}

impl EndpointSet {
    /// Creates the endpoint set against the public APIs
    pub fn new(quote: Currency) -> Self {
        Self::with_base_urls(quote, COINBASE_API_URL, MEMPOOL_API_URL)
    }

    /// Creates the endpoint set against custom API hosts
    pub fn with_base_urls(quote: Currency, coinbase_base: &str, mempool_base: &str) -> Self {
        let coinbase_base = coinbase_base.trim_end_matches('/').to_string();
        let mempool_base = mempool_base.trim_end_matches('/');

        Self {
            quote,
            price: price_url(&coinbase_base, quote),
            coinbase_base,
            block_height: format!("{}{}", mempool_base, MEMPOOL_TIP_HEIGHT_PATH),
            fees: format!("{}{}", mempool_base, MEMPOOL_FEES_PATH),
            hashrate: format!("{}{}", mempool_base, MEMPOOL_HASHRATE_PATH),
            unconfirmed: format!("{}{}", mempool_base, MEMPOOL_SUMMARY_PATH),
        }
    }

    /// Current quote currency
    pub fn quote_currency(&self) -> Currency {
        self.quote
    }

    /// Switches the quote currency, regenerating the price URL only
    pub fn set_quote_currency(&mut self, quote: Currency) {
        self.quote = quote;
        self.price = price_url(&self.coinbase_base, quote);
    }

    /// URL for a single source
    pub fn url(&self, source: DataSource) -> &str {
        match source {
            DataSource::Price => &self.price,
            DataSource::BlockHeight => &self.block_height,
            DataSource::Fees => &self.fees,
            DataSource::Hashrate => &self.hashrate,
            DataSource::Unconfirmed => &self.unconfirmed,
        }
    }

    /// All sources with their URLs, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (DataSource, &str)> + '_ {
        DataSource::all().iter().map(move |s| (*s, self.url(*s)))
    }
}

fn price_url(coinbase_base: &str, quote: Currency) -> String {
    format!(
        "{}/prices/{}-{}/buy",
        coinbase_base,
        BASE_ASSET,
        quote.code()
    )
}
