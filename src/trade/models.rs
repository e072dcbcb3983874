use serde::{Deserialize, Serialize};
use skiff_types::{AssetAccount, CryptoValue, TradingPair};

/// Which leg of the pair the user fixed when entering the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fix {
    #[serde(rename = "BASE")]
    Base,
    #[serde(rename = "BASE_IN_FIAT")]
    BaseInFiat,
    #[serde(rename = "COUNTER")]
    Counter,
    #[serde(rename = "COUNTER_IN_FIAT")]
    CounterInFiat,
}

impl Fix {
    #[must_use]
    pub const fn is_base(&self) -> bool {
        matches!(self, Fix::Base | Fix::BaseInFiat)
    }
}

/// Amounts cross the wire as display strings paired with their symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolValue {
    pub symbol: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatCrypto {
    pub fiat: SymbolValue,
    pub crypto: SymbolValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRatio {
    pub base: FiatCrypto,
    pub counter: FiatCrypto,
    pub base_to_fiat_rate: String,
    pub base_to_counter_rate: String,
    pub counter_to_base_rate: String,
    pub counter_to_fiat_rate: String,
}

/// A conversion quote from the markets service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub time: Option<String>,
    pub pair: TradingPair,
    pub fiat_currency: String,
    pub fix: Fix,
    pub volume: String,
    pub currency_ratio: CurrencyRatio,
}

impl Quote {
    /// The quote is restamped when an order is registered so the backend
    /// sees the submission time, not the quote time.
    #[must_use]
    pub fn restamped(&self) -> Self {
        let now = jiff::Timestamp::now();
        let time = now.strftime("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        Self { time: Some(time), ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub quote: Quote,
}

/// Order registration request body for `POST /trades`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub destination_address: String,
    pub refund_address: String,
    pub quote: Quote,
}

/// Registered order returned by the trades endpoint. The payment must be
/// sent to `deposit_address`, not the address the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub id: String,
    pub pair: TradingPair,
    pub deposit_address: String,
    pub deposit: SymbolValue,
    pub withdrawal: SymbolValue,
    #[serde(default)]
    pub deposit_memo: Option<String>,
}

/// Body for `PUT trades/{id}/failure-reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFailure {
    pub message: String,
}

/// Per-pair order size bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeLimits {
    pub min_order: CryptoValue,
    pub max_order: CryptoValue,
}

/// A fully resolved trade payment, ready to show and then broadcast. A
/// missing `order_identifier` means the trade was prebuilt for display only
/// and no order exists on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransaction {
    pub order_identifier: Option<String>,
    pub destination: AssetAccount,
    pub from: AssetAccount,
    pub to: String,
    pub amount_to_send: String,
    pub amount_to_receive: String,
    pub fees: String,
}
