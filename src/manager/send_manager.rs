pub mod error;
pub mod input_state;
pub mod state;

mod amount;
mod spendable;

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use flume::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use skiff_types::{
    Asset, CryptoValue, ExchangeRate, FeeLevel, FiatCurrency, Memo, TransactionCandidate,
};
use tracing::{debug, warn};

use crate::{
    accounts::AccountRepository,
    address,
    builder::TransactionBuilder,
    exchange_address::ExchangeAddressFetcher,
    fee_client::FeeClient,
    rates::ExchangeRateService,
    task,
};

use input_state::{
    CalculationState, DestinationState, SendInputState, SourceAccountState,
};
use state::SendManagerState;

pub type Error = error::SendManagerError;
type Result<T, E = Error> = std::result::Result<T, E>;

type Action = SendManagerAction;
type Message = SendManagerReconcileMessage;
type Reconciler = dyn SendManagerReconciler;

/// Receives state changes the frontend must mirror.
pub trait SendManagerReconciler: Send + Sync + 'static {
    fn reconcile(&self, message: Message);
}

/// Everything the send flow talks to. Injected so tests can swap any piece
/// for a double.
pub struct SendManagerServices {
    pub accounts: Arc<dyn AccountRepository>,
    pub rates: Arc<dyn ExchangeRateService>,
    pub fees: Arc<FeeClient>,
    pub builder: Arc<TransactionBuilder>,
    pub exchange_address: Arc<ExchangeAddressFetcher>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendManagerReconcileMessage {
    UpdateEnteringCryptoAmount(String),
    UpdateEnteringFiatAmount(String),
    UpdateEnteringAddress(String),

    UpdateInputState(SendInputState),
    UpdateSpendableBalance(CalculationState),
    UpdateMemo(Option<Memo>),

    SetAlert(Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendManagerAction {
    // frontend text fields
    NotifyCryptoAmountChanged(String),
    NotifyFiatAmountChanged(String),
    NotifyAddressChanged(String),

    UseExchangeAddress,

    SetMemoText(String),
    SetMemoId(u64),
    ClearMemo,

    // service updates
    NotifyBalanceChanged(CryptoValue),
    NotifyRateChanged(ExchangeRate),
    NotifyFeeChanged(CryptoValue),
    NotifySourceStateChanged(SourceAccountState),
}

/// Drives the send screen for one asset: amount entry in crypto or fiat,
/// destination validation, spendable balance, and the final handoff to the
/// transaction builder.
pub struct SendManager {
    services: SendManagerServices,
    pub state: Arc<Mutex<SendManagerState>>,

    reconciler: Sender<Message>,
    reconcile_receiver: Arc<Receiver<Message>>,

    sending: AtomicBool,

    /// Bumped on every destination change. An exchange address fetch that
    /// comes back under an older generation is dropped.
    address_generation: AtomicU64,
}

impl SendManager {
    pub fn new(asset: Asset, fiat_currency: FiatCurrency, services: SendManagerServices) -> Arc<Self> {
        let (sender, receiver) = flume::bounded(50);

        Self {
            services,
            state: Arc::new(Mutex::new(SendManagerState::new(asset, fiat_currency))),
            reconciler: sender,
            reconcile_receiver: Arc::new(receiver),
            sending: AtomicBool::new(false),
            address_generation: AtomicU64::new(0),
        }
        .into()
    }

    /// Loads the funding account, exchange rate and fee schedule in the
    /// background. Until they arrive the form reports `Calculating`.
    pub fn start(self: &Arc<Self>) {
        let me = self.clone();

        task::spawn(async move {
            let (asset, currency) = {
                let state = me.state.lock();
                (state.asset, state.fiat_currency)
            };

            match me.services.accounts.default_account(asset).await {
                Ok(account) => {
                    let balance = account.balance;
                    me.source_changed(SourceAccountState::Available(account));
                    me.balance_changed(balance);
                }
                Err(account_error) => {
                    warn!("unable to load {} account: {account_error}", asset.code());
                    me.send_message(Message::SetAlert(Error::NoSourceAccount(asset)));
                }
            }

            match me.services.rates.rate(asset, currency).await {
                Ok(rate) => me.rate_changed(rate),
                Err(rate_error) => warn!("unable to load {} rate: {rate_error}", asset.code()),
            }

            let fee = me.services.fees.fees_or_default(asset).await;
            let absolute = match asset {
                Asset::Erc20(_) => fee.contract_absolute(FeeLevel::Regular),
                _ => fee.absolute(FeeLevel::Regular),
            };
            me.fee_changed(absolute);
        });
    }

    pub fn listen_for_updates(&self, reconciler: Box<Reconciler>) {
        let reconcile_receiver = self.reconcile_receiver.clone();

        task::spawn(async move {
            while let Ok(message) = reconcile_receiver.recv_async().await {
                reconciler.reconcile(message);
            }
        });
    }

    /// Raw message stream, used by tests and headless callers.
    pub fn updates(&self) -> Arc<Receiver<Message>> {
        self.reconcile_receiver.clone()
    }

    // MARK: read only methods

    pub fn input_state(&self) -> SendInputState {
        self.state.lock().input_state.clone()
    }

    pub fn spendable_balance(&self) -> CalculationState {
        self.state.lock().spendable.clone()
    }

    pub fn entering_crypto_amount(&self) -> String {
        self.state.lock().entering_crypto_amount.clone()
    }

    pub fn entering_fiat_amount(&self) -> String {
        self.state.lock().entering_fiat_amount.clone()
    }

    pub fn memo(&self) -> Option<Memo> {
        self.state.lock().memo.clone()
    }

    // MARK: actions

    pub fn dispatch(self: &Arc<Self>, action: Action) {
        debug!("dispatch: {action:?}");

        match action {
            Action::NotifyCryptoAmountChanged(raw) => self.crypto_amount_changed(raw),
            Action::NotifyFiatAmountChanged(raw) => self.fiat_amount_changed(raw),
            Action::NotifyAddressChanged(raw) => self.address_changed(raw),
            Action::UseExchangeAddress => self.use_exchange_address(),
            Action::SetMemoText(text) => self.set_memo(Memo::text(text)),
            Action::SetMemoId(id) => self.set_memo(Memo::id(id)),
            Action::ClearMemo => self.clear_memo(),
            Action::NotifyBalanceChanged(balance) => self.balance_changed(balance),
            Action::NotifyRateChanged(rate) => self.rate_changed(rate),
            Action::NotifyFeeChanged(fee) => self.fee_changed(fee),
            Action::NotifySourceStateChanged(source) => self.source_changed(source),
        }
    }

    fn address_changed(&self, raw: String) {
        // outdates any in-flight exchange address fetch
        self.address_generation.fetch_add(1, Ordering::SeqCst);

        {
            let mut state = self.state.lock();
            state.entering_address = raw.clone();

            let trimmed = raw.trim();
            state.destination = if trimmed.is_empty() {
                DestinationState::Empty
            } else {
                match address::validate(state.asset, trimmed) {
                    Ok(()) => DestinationState::Valid {
                        address: trimmed.to_string(),
                        is_exchange: false,
                    },
                    Err(address::AddressError::Empty) => DestinationState::Empty,
                    Err(format_error) => DestinationState::Invalid(format_error),
                }
            };
        }

        self.send_message(Message::UpdateEnteringAddress(raw));
        self.recompute_input_state();
    }

    fn use_exchange_address(self: &Arc<Self>) {
        let generation = self.address_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let me = self.clone();

        task::spawn(async move {
            let asset = me.state.lock().asset;
            let result = me.services.exchange_address.fetch(asset).await;

            if me.address_generation.load(Ordering::SeqCst) != generation {
                debug!("exchange address response is stale, dropping");
                return;
            }

            match result {
                Ok(exchange) => {
                    {
                        let mut state = me.state.lock();
                        state.entering_address = exchange.address.clone();
                        state.destination = DestinationState::Valid {
                            address: exchange.address.clone(),
                            is_exchange: true,
                        };
                    }

                    me.send_message(Message::UpdateEnteringAddress(exchange.address));
                    me.recompute_input_state();
                }
                Err(fetch_error) => {
                    me.send_message(Message::SetAlert(fetch_error.into()));
                }
            }
        });
    }

    fn set_memo(&self, memo: std::result::Result<Memo, skiff_types::MemoError>) {
        let asset = self.state.lock().asset;
        if asset != Asset::Stellar {
            self.send_message(Message::SetAlert(Error::MemoUnsupported(asset)));
            return;
        }

        match memo {
            Ok(memo) => {
                // setting either kind replaces the other
                self.state.lock().memo = Some(memo.clone());
                self.send_message(Message::UpdateMemo(Some(memo)));
            }
            Err(memo_error) => {
                self.send_message(Message::SetAlert(memo_error.into()));
            }
        }
    }

    fn clear_memo(&self) {
        let had_memo = self.state.lock().memo.take().is_some();
        if had_memo {
            self.send_message(Message::UpdateMemo(None));
        }
    }

    fn balance_changed(&self, balance: CryptoValue) {
        self.state.lock().balance = Some(balance);
        self.recompute_spendable();
    }

    fn rate_changed(&self, rate: ExchangeRate) {
        self.state.lock().rate = Some(rate);
        self.recompute_amount();
        self.recompute_spendable();
        self.recompute_input_state();
    }

    fn fee_changed(&self, fee: CryptoValue) {
        self.state.lock().fee = Some(fee);
        self.recompute_spendable();
    }

    fn source_changed(&self, source: SourceAccountState) {
        self.state.lock().source = source;
        self.recompute_input_state();
    }

    // MARK: sending

    /// Locks the current form into a candidate. The candidate is written
    /// once; preparing again without sending or discarding is an error.
    pub fn prepare_for_sending(&self) -> Result<TransactionCandidate> {
        let mut state = self.state.lock();

        if state.candidate.is_some() {
            return Err(Error::CandidateAlreadyPrepared);
        }

        let derived =
            input_state::derive(&state.amount, &state.spendable, &state.destination, &state.source);
        if derived != SendInputState::Valid {
            return Err(Error::NotReady(derived));
        }

        let (Some(pair), Some(destination)) = (state.amount.value(), state.destination.address())
        else {
            return Err(Error::NotReady(derived));
        };

        let candidate = TransactionCandidate::new(destination, pair.crypto);
        state.candidate = Some(candidate.clone());

        Ok(candidate)
    }

    /// Throws away a prepared candidate, for when the user backs out of the
    /// confirmation screen.
    pub fn discard_candidate(&self) {
        self.state.lock().candidate = None;
    }

    /// Builds and broadcasts the prepared candidate, consuming it. A second
    /// call without a fresh `prepare_for_sending` fails, as does a call
    /// while another send is in flight.
    pub async fn send(self: &Arc<Self>, second_password: Option<&str>) -> Result<String> {
        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::SendInProgress);
        }

        let result = self.send_inner(second_password).await;
        self.sending.store(false, Ordering::Release);

        result
    }

    async fn send_inner(&self, second_password: Option<&str>) -> Result<String> {
        let (candidate, memo, asset, source) = {
            let mut state = self.state.lock();
            let candidate = state.candidate.take();
            (candidate, state.memo.clone(), state.asset, state.source.clone())
        };

        let Some(candidate) = candidate else {
            return Err(Error::NullifiedCandidate);
        };

        let SourceAccountState::Available(account) = source else {
            return Err(Error::NoSourceAccount(asset));
        };

        let stellar_keys = match asset {
            Asset::Stellar => Some(
                self.services
                    .builder
                    .stellar_bridge()
                    .load_keypair(second_password)
                    .await?,
            ),
            _ => None,
        };

        let payment = self
            .services
            .builder
            .prepare(&candidate, &account, memo, stellar_keys, FeeLevel::Regular)
            .await?;

        let hash = self.services.builder.send(payment, second_password).await?;
        Ok(hash)
    }

    // MARK: internals

    pub(crate) fn recompute_input_state(&self) {
        let message = {
            let mut state = self.state.lock();
            let derived = input_state::derive(
                &state.amount,
                &state.spendable,
                &state.destination,
                &state.source,
            );

            if state.input_state == derived {
                None
            } else {
                state.input_state = derived.clone();
                Some(Message::UpdateInputState(derived))
            }
        };

        if let Some(message) = message {
            self.send_message(message);
        }
    }

    pub(crate) fn send_message(&self, message: Message) {
        match self.reconciler.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                warn!("reconcile channel full, dropping {message:?}")
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skiff_types::{AssetAccount, ExchangeRate};

    use super::{input_state::StateError, *};
    use crate::{
        accounts::InMemoryAccounts,
        builder::testing::stub_builder,
        exchange_address::LinkedAccountStatus,
        rates::StaticRates,
    };

    struct NotLinked;

    impl LinkedAccountStatus for NotLinked {
        fn has_linked_account(&self) -> bool {
            false
        }
    }

    fn manager(asset: Asset) -> Arc<SendManager> {
        let services = SendManagerServices {
            accounts: Arc::new(InMemoryAccounts::new()),
            rates: Arc::new(StaticRates::new()),
            fees: Arc::new(FeeClient::new("http://127.0.0.1:1")),
            builder: stub_builder(),
            exchange_address: Arc::new(ExchangeAddressFetcher::new(
                "http://127.0.0.1:1",
                Arc::new(NotLinked),
            )),
        };

        SendManager::new(asset, FiatCurrency::Usd, services)
    }

    fn btc_account(sats: u128) -> AssetAccount {
        AssetAccount::new(
            0,
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
            CryptoValue::from_minor(Asset::Bitcoin, sats),
            "My Wallet",
        )
    }

    fn load_btc_form(manager: &Arc<SendManager>, balance_sats: u128, fee_sats: u128) {
        let account = btc_account(balance_sats);
        manager.dispatch(Action::NotifySourceStateChanged(SourceAccountState::Available(account)));
        manager.dispatch(Action::NotifyBalanceChanged(CryptoValue::from_minor(
            Asset::Bitcoin,
            balance_sats,
        )));
        manager.dispatch(Action::NotifyRateChanged(ExchangeRate::new(
            Asset::Bitcoin,
            FiatCurrency::Usd,
            40_000.0,
        )));
        manager.dispatch(Action::NotifyFeeChanged(CryptoValue::from_minor(
            Asset::Bitcoin,
            fee_sats,
        )));
    }

    #[tokio::test]
    async fn test_full_form_becomes_valid_and_sends_once() {
        let manager = manager(Asset::Bitcoin);
        load_btc_form(&manager, 100_000_000, 1_250);

        manager.dispatch(Action::NotifyAddressChanged(
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
        ));
        manager.dispatch(Action::NotifyCryptoAmountChanged("0.5".to_string()));

        assert_eq!(manager.input_state(), SendInputState::Valid);
        assert_eq!(manager.entering_fiat_amount(), "20000.00");

        let candidate = manager.prepare_for_sending().unwrap();
        assert_eq!(candidate.amount, CryptoValue::from_minor(Asset::Bitcoin, 50_000_000));

        // candidate is write-once
        assert_eq!(manager.prepare_for_sending(), Err(Error::CandidateAlreadyPrepared));

        let hash = manager.send(None).await.unwrap();
        assert_eq!(hash, "btc-hash");

        // and consume-once
        assert_eq!(manager.send(None).await, Err(Error::NullifiedCandidate));
    }

    #[tokio::test]
    async fn test_fiat_entry_back_computes_crypto() {
        let manager = manager(Asset::Bitcoin);
        load_btc_form(&manager, 100_000_000, 1_250);

        manager.dispatch(Action::NotifyFiatAmountChanged("200.00".to_string()));

        assert_eq!(manager.entering_crypto_amount(), "0.005");
    }

    #[tokio::test]
    async fn test_amount_above_spendable_balance() {
        let manager = manager(Asset::Bitcoin);
        // spendable is 99_750 sats after the fee
        load_btc_form(&manager, 100_000, 250);

        manager.dispatch(Action::NotifyAddressChanged(
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
        ));
        manager.dispatch(Action::NotifyCryptoAmountChanged("0.001".to_string()));

        assert_eq!(
            manager.input_state(),
            SendInputState::Invalid(StateError::AboveSpendableBalance)
        );
        assert!(matches!(manager.prepare_for_sending(), Err(Error::NotReady(_))));
    }

    #[tokio::test]
    async fn test_missing_rate_keeps_the_form_calculating() {
        let manager = manager(Asset::Bitcoin);
        let account = btc_account(100_000_000);
        manager.dispatch(Action::NotifySourceStateChanged(SourceAccountState::Available(account)));
        manager.dispatch(Action::NotifyBalanceChanged(CryptoValue::from_minor(
            Asset::Bitcoin,
            100_000_000,
        )));

        manager.dispatch(Action::NotifyAddressChanged(
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
        ));
        manager.dispatch(Action::NotifyCryptoAmountChanged("0.5".to_string()));

        assert_eq!(manager.input_state(), SendInputState::Calculating);

        // the rate arriving resolves both the amount and the spendable balance
        manager.dispatch(Action::NotifyFeeChanged(CryptoValue::from_minor(Asset::Bitcoin, 1_250)));
        manager.dispatch(Action::NotifyRateChanged(ExchangeRate::new(
            Asset::Bitcoin,
            FiatCurrency::Usd,
            40_000.0,
        )));

        assert_eq!(manager.input_state(), SendInputState::Valid);
    }

    #[tokio::test]
    async fn test_zero_amount_is_empty() {
        let manager = manager(Asset::Bitcoin);
        load_btc_form(&manager, 100_000_000, 1_250);

        manager.dispatch(Action::NotifyAddressChanged(
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
        ));
        manager.dispatch(Action::NotifyCryptoAmountChanged("0".to_string()));

        assert_eq!(manager.input_state(), SendInputState::Empty);
    }

    #[tokio::test]
    async fn test_pending_source_blocks_the_form() {
        let manager = manager(Asset::Ethereum);
        manager.dispatch(Action::NotifySourceStateChanged(
            SourceAccountState::PendingTransactionCompletion,
        ));

        assert_eq!(
            manager.input_state(),
            SendInputState::Invalid(StateError::PendingTransaction)
        );
    }

    #[tokio::test]
    async fn test_memo_is_stellar_only() {
        let bitcoin = manager(Asset::Bitcoin);
        bitcoin.dispatch(Action::SetMemoText("hello".to_string()));
        assert_eq!(bitcoin.memo(), None);

        let stellar = manager(Asset::Stellar);
        stellar.dispatch(Action::SetMemoText("hello".to_string()));
        assert_eq!(stellar.memo(), Some(Memo::Text("hello".to_string())));

        // setting an id replaces the text memo
        stellar.dispatch(Action::SetMemoId(42));
        assert_eq!(stellar.memo(), Some(Memo::Id(42)));

        stellar.dispatch(Action::ClearMemo);
        assert_eq!(stellar.memo(), None);
    }

    #[tokio::test]
    async fn test_oversize_memo_is_rejected_with_alert() {
        let stellar = manager(Asset::Stellar);
        let updates = stellar.updates();

        stellar.dispatch(Action::SetMemoText("a".repeat(29)));
        assert_eq!(stellar.memo(), None);

        let mut saw_alert = false;
        while let Ok(message) = updates.try_recv() {
            if matches!(message, Message::SetAlert(Error::Memo(_))) {
                saw_alert = true;
            }
        }
        assert!(saw_alert);
    }

    #[tokio::test]
    async fn test_unlinked_exchange_account_raises_alert() {
        let manager = manager(Asset::Bitcoin);
        let updates = manager.updates();

        manager.dispatch(Action::UseExchangeAddress);

        // let the background fetch run
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let mut saw_missing_account = false;
        while let Ok(message) = updates.try_recv() {
            if matches!(
                message,
                Message::SetAlert(Error::ExchangeAddress(
                    crate::exchange_address::ExchangeAddressError::MissingAccount
                ))
            ) {
                saw_missing_account = true;
            }
        }
        assert!(saw_missing_account);
    }

    #[tokio::test]
    async fn test_typed_address_outdates_exchange_fetch() {
        let manager = manager(Asset::Bitcoin);
        let updates = manager.updates();

        manager.dispatch(Action::UseExchangeAddress);
        // typing immediately afterwards bumps the generation
        manager.dispatch(Action::NotifyAddressChanged(
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
        ));

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // the stale fetch result is dropped, no alert shows
        while let Ok(message) = updates.try_recv() {
            assert!(!matches!(message, Message::SetAlert(_)), "unexpected {message:?}");
        }

        let state = manager.state.lock();
        assert_eq!(
            state.destination,
            DestinationState::Valid {
                address: "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
                is_exchange: false
            }
        );
    }
}
