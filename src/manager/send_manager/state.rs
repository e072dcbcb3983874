use skiff_types::{
    Asset, CryptoValue, ExchangeRate, FiatCurrency, Memo, TransactionCandidate,
};

use super::input_state::{
    CalculationError, CalculationState, DestinationState, SendInputState, SourceAccountState,
};

/// Which amount field the user touched last. Rate updates re-derive the
/// other field from this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountField {
    #[default]
    Crypto,
    Fiat,
}

#[derive(Debug)]
pub struct SendManagerState {
    pub asset: Asset,
    pub fiat_currency: FiatCurrency,

    // raw text as typed
    pub entering_crypto_amount: String,
    pub entering_fiat_amount: String,
    pub entering_address: String,
    pub last_edited: AmountField,

    // derived sub-states
    pub amount: CalculationState,
    pub spendable: CalculationState,
    pub destination: DestinationState,
    pub source: SourceAccountState,
    pub input_state: SendInputState,

    // latest values from the services
    pub balance: Option<CryptoValue>,
    pub fee: Option<CryptoValue>,
    pub rate: Option<ExchangeRate>,

    pub memo: Option<Memo>,

    /// Written by `prepare_for_sending`, consumed exactly once by `send`.
    pub candidate: Option<TransactionCandidate>,
}

impl SendManagerState {
    pub fn new(asset: Asset, fiat_currency: FiatCurrency) -> Self {
        Self {
            asset,
            fiat_currency,
            entering_crypto_amount: String::new(),
            entering_fiat_amount: String::new(),
            entering_address: String::new(),
            last_edited: AmountField::default(),
            amount: CalculationState::Invalid(CalculationError::Empty),
            spendable: CalculationState::Calculating,
            destination: DestinationState::Empty,
            source: SourceAccountState::Calculating,
            input_state: SendInputState::Empty,
            balance: None,
            fee: None,
            rate: None,
            memo: None,
            candidate: None,
        }
    }
}
