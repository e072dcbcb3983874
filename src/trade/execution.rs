use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;
use skiff_types::{Asset, AssetAccount, CryptoValue, FeeLevel, Memo, TransactionCandidate};
use tracing::{error, warn};

use super::{
    client::{TradeApi, TradeClientError},
    models::{Conversion, Order, OrderTransaction, TradeLimits},
};
use crate::builder::{BuildError, PreparedPayment, StellarKeyPair, TransactionBuilder};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    #[error("another trade is already executing")]
    AlreadyExecuting,

    #[error("the built payment was already sent or discarded")]
    NullifiedPayment,

    #[error("quote pair {pair} does not match the selected accounts")]
    AccountMismatch { pair: String },

    #[error("quote contains an unusable amount: {0}")]
    InvalidQuote(String),

    #[error("volume is below the minimum order size of {minimum}")]
    BelowMinimumVolume { minimum: CryptoValue },

    #[error("volume is above the maximum order size of {maximum}")]
    AboveMaximumVolume { maximum: CryptoValue },

    #[error("limits are denominated in {limits}, volume in {volume}")]
    MismatchedLimits { volume: Asset, limits: Asset },

    #[error(transparent)]
    Client(#[from] TradeClientError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Clears the executing flag on drop unless the trade made it far enough
/// that the flag must stay up for the send step.
struct ExecutionGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl<'a> ExecutionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, TradeError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TradeError::AlreadyExecuting)?;

        Ok(Self { flag, armed: true })
    }

    fn keep_executing(mut self) {
        self.armed = false;
    }
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

struct PendingTrade {
    order_id: Option<String>,
    payment: PreparedPayment,
}

/// Runs a trade end to end: registers the order, builds the payment to the
/// server's deposit address, and broadcasts it. One trade at a time; a
/// failure after registration is reported against the order id.
pub struct TradeExecutionService {
    client: Arc<dyn TradeApi>,
    builder: Arc<TransactionBuilder>,
    is_executing: AtomicBool,
    pending: Mutex<Option<PendingTrade>>,
}

impl TradeExecutionService {
    pub fn new(client: Arc<dyn TradeApi>, builder: Arc<TransactionBuilder>) -> Self {
        Self { client, builder, is_executing: AtomicBool::new(false), pending: Mutex::new(None) }
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing.load(Ordering::Acquire)
    }

    /// Ethereum-family trades are refused while an earlier transaction is
    /// still unconfirmed. Everything else can always trade.
    pub async fn can_trade(&self, asset: Asset) -> Result<bool, BuildError> {
        if asset.is_ethereum_family() {
            let pending = self.builder.ethereum_wallet().has_pending_transaction().await?;
            return Ok(!pending);
        }

        Ok(true)
    }

    pub fn validate_volume(
        &self,
        volume: &CryptoValue,
        limits: &TradeLimits,
    ) -> Result<(), TradeError> {
        if volume.asset != limits.min_order.asset || volume.asset != limits.max_order.asset {
            return Err(TradeError::MismatchedLimits {
                volume: volume.asset,
                limits: limits.min_order.asset,
            });
        }

        if volume.minor < limits.min_order.minor {
            return Err(TradeError::BelowMinimumVolume { minimum: limits.min_order });
        }

        if volume.minor > limits.max_order.minor {
            return Err(TradeError::AboveMaximumVolume { maximum: limits.max_order });
        }

        Ok(())
    }

    /// Builds the trade payment against the user's own address, purely to
    /// surface the fee before any order exists. No order is registered and
    /// nothing is kept for sending.
    pub async fn prebuild_order(
        &self,
        conversion: &Conversion,
        from: &AssetAccount,
        to: &AssetAccount,
    ) -> Result<OrderTransaction, TradeError> {
        let quote = &conversion.quote;
        Self::check_accounts(conversion, from, to)?;

        let ratio = &quote.currency_ratio;
        let amount = CryptoValue::from_major(quote.pair.from, &ratio.base.crypto.value)
            .map_err(|error| TradeError::InvalidQuote(error.to_string()))?;

        // placeholder destination, the real one arrives with the order
        let candidate = TransactionCandidate::new(from.address.clone(), amount);
        let keys = self.prebuild_stellar_keys(quote.pair.from).await?;
        let payment = self
            .builder
            .prepare(&candidate, from, None, keys, FeeLevel::Priority)
            .await?;

        Ok(OrderTransaction {
            order_identifier: None,
            destination: to.clone(),
            from: from.clone(),
            to: candidate.destination_address,
            amount_to_send: ratio.base.crypto.value.clone(),
            amount_to_receive: ratio.counter.crypto.value.clone(),
            fees: payment.fee().major_string(),
        })
    }

    /// Registers the order and builds the payment to the returned deposit
    /// address. The payment is held internally until
    /// [`send_transaction`](Self::send_transaction) consumes it.
    ///
    /// For stellar the signing keypair is loaded first, so a bad second
    /// password fails before the server has an order on its books.
    pub async fn process_and_build_order(
        &self,
        conversion: &Conversion,
        from: &AssetAccount,
        to: &AssetAccount,
        second_password: Option<&str>,
    ) -> Result<OrderTransaction, TradeError> {
        let guard = ExecutionGuard::acquire(&self.is_executing)?;

        let quote = &conversion.quote;
        Self::check_accounts(conversion, from, to)?;

        let stellar_keys = match quote.pair.from {
            Asset::Stellar => Some(self.builder.stellar_bridge().load_keypair(second_password).await?),
            _ => None,
        };

        let order = Order {
            destination_address: to.address.clone(),
            refund_address: from.address.clone(),
            quote: quote.restamped(),
        };

        let result = self.client.create_order(&order).await?;

        if result.pair.from != from.asset() {
            let message = "order asset does not match the funding account";
            self.report_failure(&result.id, message).await;
            return Err(TradeError::AccountMismatch { pair: result.pair.to_string() });
        }

        let amount = match CryptoValue::from_major(result.pair.from, &result.deposit.value) {
            Ok(amount) => amount,
            Err(parse_error) => {
                let message = format!("unusable deposit amount: {parse_error}");
                self.report_failure(&result.id, &message).await;
                return Err(TradeError::InvalidQuote(message));
            }
        };

        let memo = match self.decode_deposit_memo(&result.deposit_memo) {
            Ok(memo) => memo,
            Err(build_error) => {
                self.report_failure(&result.id, &build_error.message).await;
                return Err(build_error.with_transaction_id(result.id).into());
            }
        };

        let candidate = TransactionCandidate::new(result.deposit_address.clone(), amount);
        let payment = match self
            .builder
            .prepare(&candidate, from, memo, stellar_keys, FeeLevel::Priority)
            .await
        {
            Ok(payment) => payment,
            Err(build_error) => {
                self.report_failure(&result.id, &build_error.message).await;
                return Err(build_error.with_transaction_id(result.id).into());
            }
        };

        let fees = payment.fee().major_string();
        *self.pending.lock() =
            Some(PendingTrade { order_id: Some(result.id.clone()), payment });

        // the flag stays up until the send step finishes
        guard.keep_executing();

        Ok(OrderTransaction {
            order_identifier: Some(result.id),
            destination: to.clone(),
            from: from.clone(),
            to: result.deposit_address,
            amount_to_send: result.deposit.value,
            amount_to_receive: result.withdrawal.value,
            fees,
        })
    }

    /// Broadcasts the payment built by the last successful
    /// [`process_and_build_order`](Self::process_and_build_order). The built
    /// payment is consumed either way, so a retry needs a fresh build.
    pub async fn send_transaction(&self, second_password: Option<&str>) -> Result<String, TradeError> {
        let Some(pending) = self.pending.lock().take() else {
            self.is_executing.store(false, Ordering::Release);
            return Err(TradeError::NullifiedPayment);
        };

        let result = self.builder.send(pending.payment, second_password).await;
        self.is_executing.store(false, Ordering::Release);

        match result {
            Ok(hash) => Ok(hash),
            Err(build_error) => {
                if let Some(order_id) = &pending.order_id {
                    self.report_failure(order_id, &build_error.message).await;
                    return Err(build_error.with_transaction_id(order_id.clone()).into());
                }

                Err(build_error.into())
            }
        }
    }

    /// Abandons the built payment without broadcasting, for when the user
    /// backs out of the confirmation screen. Releases the in-flight guard
    /// and reports the abandonment so the backend cancels the order.
    pub async fn cancel(&self) {
        let pending = self.pending.lock().take();

        if let Some(pending) = pending {
            if let Some(order_id) = &pending.order_id {
                self.report_failure(order_id, "cancelled before sending").await;
            }
        }

        self.is_executing.store(false, Ordering::Release);
    }

    /// Convenience wrapper running registration, build and broadcast in one
    /// go.
    pub async fn build_and_send(
        &self,
        conversion: &Conversion,
        from: &AssetAccount,
        to: &AssetAccount,
        second_password: Option<&str>,
    ) -> Result<String, TradeError> {
        self.process_and_build_order(conversion, from, to, second_password).await?;
        self.send_transaction(second_password).await
    }

    fn check_accounts(
        conversion: &Conversion,
        from: &AssetAccount,
        to: &AssetAccount,
    ) -> Result<(), TradeError> {
        let pair = conversion.quote.pair;
        if pair.from != from.asset() || pair.to != to.asset() {
            error!("accounts {}/{} do not match pair {pair}", from.asset(), to.asset());
            return Err(TradeError::AccountMismatch { pair: pair.to_string() });
        }

        Ok(())
    }

    /// Prebuilding a stellar trade needs a keypair for the operation shape
    /// even though nothing is signed. Loaded without a second password; a
    /// double-encrypted wallet resolves credentials at the real build.
    async fn prebuild_stellar_keys(
        &self,
        asset: Asset,
    ) -> Result<Option<StellarKeyPair>, BuildError> {
        match asset {
            Asset::Stellar => Ok(Some(self.builder.stellar_bridge().load_keypair(None).await?)),
            _ => Ok(None),
        }
    }

    fn decode_deposit_memo(&self, raw: &Option<String>) -> Result<Option<Memo>, BuildError> {
        let Some(raw) = raw else { return Ok(None) };

        let memo = if raw.chars().all(|c| c.is_ascii_digit()) && !raw.is_empty() {
            raw.parse::<u64>()
                .map_err(|_| BuildError::new(format!("deposit memo out of range: {raw}")))
                .and_then(|id| Memo::id(id).map_err(|error| BuildError::new(error.to_string())))?
        } else {
            Memo::text(raw.clone()).map_err(|error| BuildError::new(error.to_string()))?
        };

        Ok(Some(memo))
    }

    async fn report_failure(&self, order_id: &str, reason: &str) {
        if let Err(report_error) = self.client.report_failure(order_id, reason).await {
            warn!("unable to report failure for order {order_id}: {report_error}");
        }
    }
}
