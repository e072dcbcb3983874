pub mod account;
pub mod asset;
pub mod candidate;
pub mod fees;
pub mod fiat;
pub mod memo;
pub mod money;
pub mod pair;

// export the types
pub use account::AssetAccount;
pub use asset::{Asset, Erc20Token};
pub use candidate::TransactionCandidate;
pub use fees::{FeeLevel, FeeLimits, TransactionFee};
pub use fiat::FiatCurrency;
pub use memo::{Memo, MemoError};
pub use money::{CryptoValue, ExchangeRate, FiatCryptoPair, FiatValue, MoneyError};
pub use pair::TradingPair;
