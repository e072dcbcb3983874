use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use skiff_types::{Asset, AssetAccount, CryptoValue, Erc20Token, TransactionCandidate};

use super::{
    bridge::{
        Erc20Service, EthereumTransactionCandidate, EthereumValidationError,
        EthereumWalletService, LegacyWalletApi, StellarBridge, StellarKeyPair,
        StellarPaymentOperation,
    },
    BuildError, TransactionBuilder,
};
use crate::fee_client::FeeClient;

/// Stages every payment and reports the per-byte rate times the typical
/// transaction size as the absolute fee.
pub(crate) struct StubWallet;

#[async_trait]
impl LegacyWalletApi for StubWallet {
    async fn build_payment(
        &self,
        asset: Asset,
        _candidate: &TransactionCandidate,
        _from: &AssetAccount,
        fee_per_byte: u64,
    ) -> Result<CryptoValue, BuildError> {
        Ok(CryptoValue::from_minor(asset, u128::from(fee_per_byte) * 250))
    }

    async fn send_payment(
        &self,
        _asset: Asset,
        _second_password: Option<&str>,
    ) -> Result<String, BuildError> {
        Ok("btc-hash".to_string())
    }
}

#[derive(Default)]
pub(crate) struct StubEthereum {
    pub pending: AtomicBool,
}

#[async_trait]
impl EthereumWalletService for StubEthereum {
    async fn has_pending_transaction(&self) -> Result<bool, BuildError> {
        Ok(self.pending.load(Ordering::Relaxed))
    }

    async fn build_transaction(
        &self,
        candidate: &TransactionCandidate,
        gas_price_gwei: u64,
        gas_limit: u64,
    ) -> Result<EthereumTransactionCandidate, EthereumValidationError> {
        Ok(EthereumTransactionCandidate {
            to: candidate.destination_address.clone(),
            value_wei: candidate.amount.minor,
            gas_price_wei: u128::from(gas_price_gwei) * 1_000_000_000,
            gas_limit,
        })
    }

    async fn send_transaction(
        &self,
        _candidate: EthereumTransactionCandidate,
        _second_password: Option<&str>,
    ) -> Result<String, BuildError> {
        Ok("eth-hash".to_string())
    }
}

/// Mirrors a wallet that settles token transfers at 21000 gas and 11 gwei
/// regardless of what the fee schedule suggested.
pub(crate) struct StubErc20;

#[async_trait]
impl Erc20Service for StubErc20 {
    async fn transfer(
        &self,
        _token: Erc20Token,
        to: &str,
        amount: CryptoValue,
        _gas_price_gwei: u64,
        _gas_limit: u64,
    ) -> Result<EthereumTransactionCandidate, EthereumValidationError> {
        Ok(EthereumTransactionCandidate {
            to: to.to_string(),
            value_wei: amount.minor,
            gas_price_wei: 11_000_000_000,
            gas_limit: 21_000,
        })
    }
}

pub(crate) struct StubStellar;

#[async_trait]
impl StellarBridge for StubStellar {
    async fn load_keypair(
        &self,
        _second_password: Option<&str>,
    ) -> Result<StellarKeyPair, BuildError> {
        Ok(StellarKeyPair {
            account_id: "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ".to_string(),
            secret_seed: "seed".to_string(),
        })
    }

    async fn send(
        &self,
        _keypair: StellarKeyPair,
        _operation: StellarPaymentOperation,
    ) -> Result<String, BuildError> {
        Ok("xlm-hash".to_string())
    }
}

/// Builder wired to stubs, with a fee client pointed at a dead endpoint so
/// the hardcoded fee schedule applies.
pub(crate) fn stub_builder() -> Arc<TransactionBuilder> {
    builder_with_ethereum(StubEthereum::default())
}

pub(crate) fn builder_with_ethereum(ethereum: StubEthereum) -> Arc<TransactionBuilder> {
    Arc::new(TransactionBuilder::new(
        Arc::new(StubWallet),
        Arc::new(ethereum),
        Arc::new(StubErc20),
        Arc::new(StubStellar),
        Arc::new(FeeClient::new("http://127.0.0.1:1")),
    ))
}
