use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use skiff_types::{Asset, ExchangeRate, FiatCurrency};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("no rate for {asset} in {currency}")]
    NoRate { asset: Asset, currency: FiatCurrency },

    #[error("rate lookup failed: {0}")]
    Unavailable(String),
}

/// Fiat price source for one asset at a time.
#[async_trait]
pub trait ExchangeRateService: Send + Sync {
    async fn rate(&self, asset: Asset, currency: FiatCurrency) -> Result<ExchangeRate, RateError>;
}

/// Fixed rate table, used in tests and as an offline fallback.
#[derive(Debug, Default)]
pub struct StaticRates {
    prices: RwLock<HashMap<(Asset, FiatCurrency), f64>>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, asset: Asset, currency: FiatCurrency, price: f64) {
        self.prices.write().insert((asset, currency), price);
    }
}

#[async_trait]
impl ExchangeRateService for StaticRates {
    async fn rate(&self, asset: Asset, currency: FiatCurrency) -> Result<ExchangeRate, RateError> {
        let price = self
            .prices
            .read()
            .get(&(asset, currency))
            .copied()
            .ok_or(RateError::NoRate { asset, currency })?;

        Ok(ExchangeRate::new(asset, currency, price))
    }
}
