use async_trait::async_trait;
use skiff_types::{Asset, AssetAccount, CryptoValue, Erc20Token, Memo, TransactionCandidate};

use super::BuildError;

/// Bridge to the legacy wallet payment engine that owns bitcoin-family coin
/// selection. Building stages a payment inside the wallet; sending signs and
/// broadcasts the staged payment.
#[async_trait]
pub trait LegacyWalletApi: Send + Sync {
    /// Stages a payment and returns the absolute fee the wallet settled on.
    async fn build_payment(
        &self,
        asset: Asset,
        candidate: &TransactionCandidate,
        from: &AssetAccount,
        fee_per_byte: u64,
    ) -> Result<CryptoValue, BuildError>;

    /// Signs and broadcasts the staged payment, returning the tx hash.
    async fn send_payment(
        &self,
        asset: Asset,
        second_password: Option<&str>,
    ) -> Result<String, BuildError>;
}

/// Ethereum account service: nonce tracking, balance checks, signing.
#[async_trait]
pub trait EthereumWalletService: Send + Sync {
    /// True while a previously broadcast transaction is still unconfirmed.
    /// Ethereum sends are serialized on the account nonce.
    async fn has_pending_transaction(&self) -> Result<bool, BuildError>;

    async fn build_transaction(
        &self,
        candidate: &TransactionCandidate,
        gas_price_gwei: u64,
        gas_limit: u64,
    ) -> Result<EthereumTransactionCandidate, EthereumValidationError>;

    async fn send_transaction(
        &self,
        candidate: EthereumTransactionCandidate,
        second_password: Option<&str>,
    ) -> Result<String, BuildError>;
}

/// Builds token transfer calls against the token contract.
#[async_trait]
pub trait Erc20Service: Send + Sync {
    async fn transfer(
        &self,
        token: Erc20Token,
        to: &str,
        amount: CryptoValue,
        gas_price_gwei: u64,
        gas_limit: u64,
    ) -> Result<EthereumTransactionCandidate, EthereumValidationError>;
}

/// Stellar horizon bridge. Key material never leaves the bridge except as an
/// opaque [`StellarKeyPair`].
#[async_trait]
pub trait StellarBridge: Send + Sync {
    /// Loads the signing keypair, decrypting with the second password when
    /// the wallet is double encrypted.
    async fn load_keypair(&self, second_password: Option<&str>) -> Result<StellarKeyPair, BuildError>;

    async fn send(
        &self,
        keypair: StellarKeyPair,
        operation: StellarPaymentOperation,
    ) -> Result<String, BuildError>;
}

/// An unsigned ethereum transaction, value and gas price in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthereumTransactionCandidate {
    pub to: String,
    pub value_wei: u128,
    pub gas_price_wei: u128,
    pub gas_limit: u64,
}

impl EthereumTransactionCandidate {
    #[must_use]
    pub fn fee(&self) -> CryptoValue {
        CryptoValue::from_minor(Asset::Ethereum, self.gas_price_wei * u128::from(self.gas_limit))
    }
}

/// Validation failures surfaced while building an ethereum-family payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EthereumValidationError {
    #[error("insufficient funds to cover the amount")]
    InsufficientFunds,

    #[error("insufficient ETH to cover the network fee")]
    InsufficientFeeCoverage,

    #[error("waiting on a pending transaction to confirm")]
    WaitingOnPendingTransaction,

    #[error("insufficient gas to execute the token transfer")]
    InsufficientGasForTokenTransfer,
}

#[derive(Clone)]
pub struct StellarKeyPair {
    pub account_id: String,
    pub secret_seed: String,
}

impl std::fmt::Debug for StellarKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StellarKeyPair")
            .field("account_id", &self.account_id)
            .field("secret_seed", &"<redacted>")
            .finish()
    }
}

/// A stellar payment ready to sign, fee in stroops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StellarPaymentOperation {
    pub destination: String,
    pub amount: CryptoValue,
    pub fee: CryptoValue,
    pub memo: Option<Memo>,
}
