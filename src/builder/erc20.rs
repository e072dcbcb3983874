use skiff_types::{Erc20Token, FeeLevel, TransactionCandidate, TransactionFee};

use super::{
    bridge::EthereumValidationError, BuildError, PreparedPayment, TransactionBuilder,
};

impl TransactionBuilder {
    /// Token transfers are contract calls: same nonce rules as a plain
    /// ethereum send, but with the contract gas limit.
    pub(super) async fn prepare_erc20(
        &self,
        token: Erc20Token,
        candidate: &TransactionCandidate,
        fee: &TransactionFee,
        level: FeeLevel,
    ) -> Result<PreparedPayment, BuildError> {
        if self.ethereum.has_pending_transaction().await? {
            return Err(EthereumValidationError::WaitingOnPendingTransaction.into());
        }

        let gas_limit = fee.gas_limit_contract.or(fee.gas_limit).unwrap_or(65_000);
        let built = self
            .erc20
            .transfer(
                token,
                &candidate.destination_address,
                candidate.amount,
                fee.rate(level),
                gas_limit,
            )
            .await?;

        Ok(PreparedPayment::Erc20 { token, candidate: built })
    }
}
