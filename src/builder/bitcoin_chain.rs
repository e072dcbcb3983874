use skiff_types::{Asset, AssetAccount, FeeLevel, TransactionCandidate, TransactionFee};
use tracing::debug;

use super::{BuildError, PreparedPayment, TransactionBuilder};

impl TransactionBuilder {
    /// BTC and BCH share the legacy wallet payment engine. The wallet does
    /// coin selection and reports the absolute fee it settled on.
    pub(super) async fn prepare_bitcoin_chain(
        &self,
        asset: Asset,
        candidate: &TransactionCandidate,
        from: &AssetAccount,
        fee: &TransactionFee,
        level: FeeLevel,
    ) -> Result<PreparedPayment, BuildError> {
        let absolute_fee = self
            .wallet
            .build_payment(asset, candidate, from, fee.rate(level))
            .await?;

        debug!(
            "staged {} payment of {} with fee {}",
            asset.code(),
            candidate.amount,
            absolute_fee
        );

        Ok(PreparedPayment::BitcoinChain { asset, amount: candidate.amount, fee: absolute_fee })
    }
}
