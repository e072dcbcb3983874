use std::sync::Arc;

use serde::Deserialize;
use skiff_types::Asset;
use tracing::debug;

use crate::server_error::ServerError;

/// Whether the user has paired a trading account with this wallet. Injected
/// so the fetcher does not reach into global settings.
pub trait LinkedAccountStatus: Send + Sync {
    fn has_linked_account(&self) -> bool;
}

/// A trading-account deposit address may exist but not yet be usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AccountState {
    Pending,
    Active,
    Blocked,
}

impl AccountState {
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(self, AccountState::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeAddress {
    pub asset: Asset,
    pub address: String,
    pub state: AccountState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeAddressError {
    #[error("no trading account is linked to this wallet")]
    MissingAccount,

    #[error("a two-factor token is required to fetch the deposit address")]
    TwoFactorRequired,

    #[error("trading account returned an empty deposit address")]
    EmptyAddress,

    #[error("trading account returned an unknown asset: {0}")]
    UnknownAsset(String),

    #[error("trading account returned an unknown state: {0}")]
    UnknownState(String),

    #[error("trading account for {asset} is {state}")]
    InactiveState { asset: Asset, state: AccountState },

    #[error("deposit address request failed: {0}")]
    Network(String),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Fetches the deposit address of the user's linked trading account, so a
/// send can be pointed at the exchange without copy-pasting.
pub struct ExchangeAddressFetcher {
    client: reqwest::Client,
    base_url: String,
    status: Arc<dyn LinkedAccountStatus>,
}

#[derive(Debug, Deserialize)]
struct LinkedAccountResponse {
    #[serde(default)]
    address: String,
    currency: String,
    state: String,
}

impl ExchangeAddressFetcher {
    pub fn new(base_url: impl Into<String>, status: Arc<dyn LinkedAccountStatus>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), status }
    }

    pub async fn fetch(&self, asset: Asset) -> Result<ExchangeAddress, ExchangeAddressError> {
        if !self.status.has_linked_account() {
            return Err(ExchangeAddressError::MissingAccount);
        }

        let url = format!("{}/payments/accounts/linked", self.base_url);
        let body = serde_json::json!({ "currency": asset.code() });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| ExchangeAddressError::Network(error.to_string()))?;

        if !response.status().is_success() {
            let server_error: ServerError = response
                .json()
                .await
                .map_err(|error| ExchangeAddressError::Network(error.to_string()))?;

            if server_error.is_two_factor() {
                return Err(ExchangeAddressError::TwoFactorRequired);
            }

            return Err(server_error.into());
        }

        let raw: LinkedAccountResponse = response
            .json()
            .await
            .map_err(|error| ExchangeAddressError::Network(error.to_string()))?;

        debug!("linked account for {}: state {}", raw.currency, raw.state);
        Self::decode(raw)
    }

    fn decode(raw: LinkedAccountResponse) -> Result<ExchangeAddress, ExchangeAddressError> {
        let asset = Asset::from_code(&raw.currency)
            .map_err(|_| ExchangeAddressError::UnknownAsset(raw.currency.clone()))?;

        let state = match raw.state.as_str() {
            "PENDING" => AccountState::Pending,
            "ACTIVE" => AccountState::Active,
            "BLOCKED" => AccountState::Blocked,
            other => return Err(ExchangeAddressError::UnknownState(other.to_string())),
        };

        if !state.is_usable() {
            return Err(ExchangeAddressError::InactiveState { asset, state });
        }

        if raw.address.is_empty() {
            return Err(ExchangeAddressError::EmptyAddress);
        }

        Ok(ExchangeAddress { asset, address: raw.address, state })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(address: &str, currency: &str, state: &str) -> LinkedAccountResponse {
        LinkedAccountResponse {
            address: address.to_string(),
            currency: currency.to_string(),
            state: state.to_string(),
        }
    }

    #[test]
    fn test_decode_active_account() {
        let decoded =
            ExchangeAddressFetcher::decode(raw("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", "BTC", "ACTIVE"))
                .unwrap();

        assert_eq!(decoded.asset, Asset::Bitcoin);
        assert_eq!(decoded.state, AccountState::Active);
    }

    #[test]
    fn test_decode_rejects_non_active_states() {
        assert_eq!(
            ExchangeAddressFetcher::decode(raw("addr", "XLM", "PENDING")).unwrap_err(),
            ExchangeAddressError::InactiveState { asset: Asset::Stellar, state: AccountState::Pending }
        );
        assert_eq!(
            ExchangeAddressFetcher::decode(raw("addr", "ETH", "BLOCKED")).unwrap_err(),
            ExchangeAddressError::InactiveState { asset: Asset::Ethereum, state: AccountState::Blocked }
        );
    }

    #[test]
    fn test_decode_rejects_empty_address() {
        let error = ExchangeAddressFetcher::decode(raw("", "BTC", "ACTIVE")).unwrap_err();
        assert_eq!(error, ExchangeAddressError::EmptyAddress);
    }

    #[test]
    fn test_decode_unknown_fields() {
        assert_eq!(
            ExchangeAddressFetcher::decode(raw("addr", "DOGE", "ACTIVE")).unwrap_err(),
            ExchangeAddressError::UnknownAsset("DOGE".to_string())
        );
        assert_eq!(
            ExchangeAddressFetcher::decode(raw("addr", "BTC", "FROZEN")).unwrap_err(),
            ExchangeAddressError::UnknownState("FROZEN".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_account_short_circuits() {
        struct NotLinked;
        impl LinkedAccountStatus for NotLinked {
            fn has_linked_account(&self) -> bool {
                false
            }
        }

        // the base url is never hit
        let fetcher = ExchangeAddressFetcher::new("http://127.0.0.1:1", Arc::new(NotLinked));
        let error = fetcher.fetch(Asset::Bitcoin).await.unwrap_err();
        assert_eq!(error, ExchangeAddressError::MissingAccount);
    }
}
