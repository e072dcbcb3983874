pub mod client;
pub mod execution;
pub mod models;

pub use client::{TradeApi, TradeClient, TradeClientError};
pub use execution::{TradeError, TradeExecutionService};
pub use models::{
    Conversion, CurrencyRatio, FiatCrypto, Fix, Order, OrderResult, OrderTransaction, Quote,
    SymbolValue, TradeLimits, TransactionFailure,
};
