use skiff_types::{Asset, CryptoValue, FeeLevel, Memo, TransactionCandidate, TransactionFee};

use super::{
    bridge::{StellarKeyPair, StellarPaymentOperation},
    BuildError, PreparedPayment, TransactionBuilder,
};

impl TransactionBuilder {
    /// Stellar payments need no server round trip to build. The keypair is
    /// loaded before anything irreversible happens, so a wrong second
    /// password can never strand a registered order.
    pub(super) fn prepare_stellar(
        &self,
        candidate: &TransactionCandidate,
        memo: Option<Memo>,
        fee: &TransactionFee,
        level: FeeLevel,
        keypair: StellarKeyPair,
    ) -> Result<PreparedPayment, BuildError> {
        let operation = StellarPaymentOperation {
            destination: candidate.destination_address.clone(),
            amount: candidate.amount,
            fee: CryptoValue::from_minor(Asset::Stellar, u128::from(fee.rate(level))),
            memo,
        };

        Ok(PreparedPayment::Stellar { keypair, operation })
    }
}
