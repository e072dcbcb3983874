use skiff_types::{FeeLevel, TransactionCandidate, TransactionFee};

use super::{
    bridge::EthereumValidationError, BuildError, PreparedPayment, TransactionBuilder,
};

impl TransactionBuilder {
    /// Ethereum sends are serialized on the account nonce, so a build is
    /// refused while an earlier transaction is still unconfirmed.
    pub(super) async fn prepare_ethereum(
        &self,
        candidate: &TransactionCandidate,
        fee: &TransactionFee,
        level: FeeLevel,
    ) -> Result<PreparedPayment, BuildError> {
        if self.ethereum.has_pending_transaction().await? {
            return Err(EthereumValidationError::WaitingOnPendingTransaction.into());
        }

        let gas_limit = fee.gas_limit.unwrap_or(21_000);
        let built = self
            .ethereum
            .build_transaction(candidate, fee.rate(level), gas_limit)
            .await?;

        Ok(PreparedPayment::Ethereum { candidate: built })
    }
}
