use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use skiff_types::{Asset, FeeLimits, TransactionFee};
use tracing::warn;

const ONE_MIN: Duration = Duration::from_secs(60);

/// Client for the fee recommendation service, with a 60 second in-memory
/// cache per asset. ERC-20 lookups are served from the ethereum schedule.
pub struct FeeClient {
    base_url: String,
    client: reqwest::Client,
    cache: Mutex<HashMap<Asset, CachedFees>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedFees {
    fees: TransactionFee,
    last_fetched: Instant,
}

impl FeeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::Client::new(), cache: Mutex::new(HashMap::new()) }
    }

    /// Current fee schedule, served from cache when it is under a minute old.
    pub async fn fees(&self, asset: Asset) -> Result<TransactionFee, reqwest::Error> {
        let asset = asset.fee_asset();

        if let Some(cached) = self.cache.lock().get(&asset) {
            if cached.last_fetched.elapsed() < ONE_MIN {
                return Ok(cached.fees);
            }
        }

        let fees = self.fetch(asset).await?;
        self.cache
            .lock()
            .insert(asset, CachedFees { fees, last_fetched: Instant::now() });

        Ok(fees)
    }

    /// Like [`fees`](Self::fees), but falls back to the hardcoded schedule
    /// when the service is unreachable. A send must never be blocked on the
    /// fee endpoint being down.
    pub async fn fees_or_default(&self, asset: Asset) -> TransactionFee {
        match self.fees(asset).await {
            Ok(fees) => fees,
            Err(error) => {
                warn!("unable to get {} fees, using defaults: {error:?}", asset.code());
                TransactionFee::default_for(asset)
            }
        }
    }

    async fn fetch(&self, asset: Asset) -> Result<TransactionFee, reqwest::Error> {
        let url = format!("{}/mempool/fees/{}", self.base_url, asset.code().to_lowercase());
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let quote: FeeQuoteResponse = response.json().await?;

        Ok(quote.into_fee(asset))
    }
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeQuoteResponse {
    regular: u64,
    priority: u64,
    limits: FeeLimitsResponse,
    gas_limit: Option<u64>,
    gas_limit_contract: Option<u64>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
struct FeeLimitsResponse {
    min: u64,
    max: u64,
}

impl FeeQuoteResponse {
    fn into_fee(self, asset: Asset) -> TransactionFee {
        let defaults = TransactionFee::default_for(asset);

        TransactionFee {
            asset,
            regular: self.regular,
            priority: self.priority,
            limits: FeeLimits { min: self.limits.min, max: self.limits.max },
            gas_limit: self.gas_limit.or(defaults.gas_limit),
            gas_limit_contract: self.gas_limit_contract.or(defaults.gas_limit_contract),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_falls_back_to_defaults_when_unreachable() {
        // nothing listens here
        let client = FeeClient::new("http://127.0.0.1:1");

        let fees = client.fees_or_default(Asset::Bitcoin).await;
        assert_eq!(fees, TransactionFee::default_for(Asset::Bitcoin));
    }

    #[tokio::test]
    async fn test_erc20_uses_ethereum_schedule() {
        let client = FeeClient::new("http://127.0.0.1:1");

        let fees = client.fees_or_default(Asset::Erc20(skiff_types::Erc20Token::Pax)).await;
        assert_eq!(fees.asset, Asset::Ethereum);
        assert_eq!(fees.gas_limit, Some(21_000));
    }

    #[test]
    fn test_decodes_camel_case_quote() {
        let quote: FeeQuoteResponse = serde_json::from_str(
            r#"{"regular": 5, "priority": 11, "limits": {"min": 1, "max": 100}, "gasLimit": 21000, "gasLimitContract": 65000}"#,
        )
        .unwrap();

        let fee = quote.into_fee(Asset::Ethereum);
        assert_eq!(fee.gas_limit_contract, Some(65_000));
        assert_eq!(fee.regular, 5);
    }
}
