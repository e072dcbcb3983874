pub mod bitcoin_chain;
pub mod bridge;
pub mod erc20;
pub mod ethereum;
pub mod stellar;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use skiff_types::{
    Asset, AssetAccount, CryptoValue, Erc20Token, FeeLevel, Memo, TransactionCandidate,
};

use crate::{fee_client::FeeClient, server_error::ServerError};

pub use bridge::{
    Erc20Service, EthereumTransactionCandidate, EthereumValidationError, EthereumWalletService,
    LegacyWalletApi, StellarBridge, StellarKeyPair, StellarPaymentOperation,
};

/// Failure while building or broadcasting a payment. Carries the order id
/// when the payment belonged to a registered trade, so the failure can be
/// reported against it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BuildError {
    pub message: String,
    pub transaction_id: Option<String>,
    pub server_error: Option<ServerError>,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), transaction_id: None, server_error: None }
    }

    #[must_use]
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }
}

impl From<EthereumValidationError> for BuildError {
    fn from(error: EthereumValidationError) -> Self {
        Self::new(error.to_string())
    }
}

impl From<ServerError> for BuildError {
    fn from(error: ServerError) -> Self {
        Self { message: error.message.clone(), transaction_id: None, server_error: Some(error) }
    }
}

/// A payment that has been built and is ready to broadcast. Produced by
/// [`TransactionBuilder::prepare`] and consumed by value on send, so one
/// build can never be broadcast twice.
#[derive(Debug, Clone)]
pub enum PreparedPayment {
    BitcoinChain { asset: Asset, amount: CryptoValue, fee: CryptoValue },
    Ethereum { candidate: EthereumTransactionCandidate },
    Erc20 { token: Erc20Token, candidate: EthereumTransactionCandidate },
    Stellar { keypair: StellarKeyPair, operation: StellarPaymentOperation },
}

impl PreparedPayment {
    /// The absolute network fee this payment will pay, in the fee asset.
    #[must_use]
    pub fn fee(&self) -> CryptoValue {
        match self {
            PreparedPayment::BitcoinChain { fee, .. } => *fee,
            PreparedPayment::Ethereum { candidate } => candidate.fee(),
            PreparedPayment::Erc20 { candidate, .. } => candidate.fee(),
            PreparedPayment::Stellar { operation, .. } => operation.fee,
        }
    }

    #[must_use]
    pub fn asset(&self) -> Asset {
        match self {
            PreparedPayment::BitcoinChain { asset, .. } => *asset,
            PreparedPayment::Ethereum { .. } => Asset::Ethereum,
            PreparedPayment::Erc20 { token, .. } => Asset::Erc20(*token),
            PreparedPayment::Stellar { .. } => Asset::Stellar,
        }
    }
}

/// Turns a [`TransactionCandidate`] into an asset-specific prepared payment
/// and broadcasts prepared payments. Asset dispatch is a total match, so a
/// newly added asset fails to compile until every arm exists.
pub struct TransactionBuilder {
    wallet: Arc<dyn LegacyWalletApi>,
    ethereum: Arc<dyn EthereumWalletService>,
    erc20: Arc<dyn Erc20Service>,
    stellar: Arc<dyn StellarBridge>,
    fees: Arc<FeeClient>,
}

impl TransactionBuilder {
    pub fn new(
        wallet: Arc<dyn LegacyWalletApi>,
        ethereum: Arc<dyn EthereumWalletService>,
        erc20: Arc<dyn Erc20Service>,
        stellar: Arc<dyn StellarBridge>,
        fees: Arc<FeeClient>,
    ) -> Self {
        Self { wallet, ethereum, erc20, stellar, fees }
    }

    pub fn stellar_bridge(&self) -> &Arc<dyn StellarBridge> {
        &self.stellar
    }

    pub fn ethereum_wallet(&self) -> &Arc<dyn EthereumWalletService> {
        &self.ethereum
    }

    /// Builds a payment for the candidate's asset. Stellar requires the
    /// signing keypair up front, everything else resolves credentials at
    /// send time.
    pub async fn prepare(
        &self,
        candidate: &TransactionCandidate,
        from: &AssetAccount,
        memo: Option<Memo>,
        stellar_keys: Option<StellarKeyPair>,
        level: FeeLevel,
    ) -> Result<PreparedPayment, BuildError> {
        let asset = candidate.amount.asset;
        let fee = self.fees.fees_or_default(asset).await;

        match asset {
            Asset::Bitcoin | Asset::BitcoinCash => {
                self.prepare_bitcoin_chain(asset, candidate, from, &fee, level).await
            }
            Asset::Ethereum => self.prepare_ethereum(candidate, &fee, level).await,
            Asset::Erc20(token) => self.prepare_erc20(token, candidate, &fee, level).await,
            Asset::Stellar => {
                let keypair = stellar_keys
                    .ok_or_else(|| BuildError::new("stellar payment requires a signing keypair"))?;
                self.prepare_stellar(candidate, memo, &fee, level, keypair)
            }
        }
    }

    /// Broadcasts a prepared payment and returns the transaction hash.
    pub async fn send(
        &self,
        payment: PreparedPayment,
        second_password: Option<&str>,
    ) -> Result<String, BuildError> {
        match payment {
            PreparedPayment::BitcoinChain { asset, .. } => {
                self.wallet.send_payment(asset, second_password).await
            }
            PreparedPayment::Ethereum { candidate } => {
                self.ethereum.send_transaction(candidate, second_password).await
            }
            PreparedPayment::Erc20 { candidate, .. } => {
                self.ethereum.send_transaction(candidate, second_password).await
            }
            PreparedPayment::Stellar { keypair, operation } => {
                self.stellar.send(keypair, operation).await
            }
        }
    }
}
