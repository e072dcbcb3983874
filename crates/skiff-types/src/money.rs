use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{asset::Asset, fiat::FiatCurrency};

/// Errors produced by money arithmetic. Cross-currency operations are always
/// rejected with a typed error, never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch { lhs: String, rhs: String },

    #[error("amount overflow")]
    AmountOverflow,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

type Result<T, E = MoneyError> = std::result::Result<T, E>;

fn pow10(decimals: u32) -> u128 {
    10u128.pow(decimals)
}

// MARK: CryptoValue

/// A crypto amount held as an integer count of the asset's minor unit
/// (satoshi, wei, stroop, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CryptoValue {
    pub asset: Asset,
    pub minor: u128,
}

impl CryptoValue {
    #[must_use]
    pub const fn zero(asset: Asset) -> Self {
        Self { asset, minor: 0 }
    }

    #[must_use]
    pub const fn from_minor(asset: Asset, minor: u128) -> Self {
        Self { asset, minor }
    }

    /// Parses a major-unit decimal string such as `"6.87022901"`.
    pub fn from_major(asset: Asset, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MoneyError::InvalidAmount(raw.to_string()));
        }

        let (int_part, frac_part) = match raw.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (raw, ""),
        };

        let decimals = asset.decimals() as usize;
        if frac_part.len() > decimals {
            return Err(MoneyError::InvalidAmount(raw.to_string()));
        }

        let valid =
            int_part.chars().all(|c| c.is_ascii_digit()) && frac_part.chars().all(|c| c.is_ascii_digit());
        if !valid || (int_part.is_empty() && frac_part.is_empty()) {
            return Err(MoneyError::InvalidAmount(raw.to_string()));
        }

        let int_value: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?
        };

        let frac_value: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded: u128 =
                frac_part.parse().map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;
            padded * pow10((decimals - frac_part.len()) as u32)
        };

        let minor = int_value
            .checked_mul(pow10(asset.decimals()))
            .and_then(|scaled| scaled.checked_add(frac_value))
            .ok_or(MoneyError::AmountOverflow)?;

        Ok(Self { asset, minor })
    }

    /// Converts a major-unit float to minor units, flooring. Negative input
    /// clamps to zero.
    #[must_use]
    pub fn from_major_f64(asset: Asset, major: f64) -> Self {
        if !major.is_finite() || major <= 0.0 {
            return Self::zero(asset);
        }

        let minor = (major * pow10(asset.decimals()) as f64).floor() as u128;
        Self { asset, minor }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    #[must_use]
    pub fn as_major_f64(&self) -> f64 {
        self.minor as f64 / pow10(self.asset.decimals()) as f64
    }

    /// Major-unit decimal string with trailing zeros trimmed, e.g. `"0.000231"`.
    #[must_use]
    pub fn major_string(&self) -> String {
        let scale = pow10(self.asset.decimals());
        let int_part = self.minor / scale;
        let frac_part = self.minor % scale;

        if frac_part == 0 {
            return format!("{int_part}.0");
        }

        let frac = format!("{frac_part:0width$}", width = self.asset.decimals() as usize);
        let frac = frac.trim_end_matches('0');
        format!("{int_part}.{frac}")
    }

    fn ensure_same_asset(&self, rhs: &Self) -> Result<()> {
        if self.asset != rhs.asset {
            return Err(MoneyError::CurrencyMismatch {
                lhs: self.asset.code().to_string(),
                rhs: rhs.asset.code().to_string(),
            });
        }

        Ok(())
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.ensure_same_asset(rhs)?;
        let minor = self.minor.checked_add(rhs.minor).ok_or(MoneyError::AmountOverflow)?;
        Ok(Self { asset: self.asset, minor })
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        self.ensure_same_asset(rhs)?;
        let minor = self.minor.checked_sub(rhs.minor).ok_or(MoneyError::AmountOverflow)?;
        Ok(Self { asset: self.asset, minor })
    }

    /// Subtraction clamped at zero. Errors only on an asset mismatch.
    pub fn saturating_sub(&self, rhs: &Self) -> Result<Self> {
        self.ensure_same_asset(rhs)?;
        Ok(Self { asset: self.asset, minor: self.minor.saturating_sub(rhs.minor) })
    }
}

impl Display for CryptoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.major_string(), self.asset.code())
    }
}

// MARK: FiatValue

/// A fiat amount held as an integer count of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiatValue {
    pub currency: FiatCurrency,
    pub minor: u64,
}

impl FiatValue {
    pub const DECIMALS: u32 = 2;

    #[must_use]
    pub const fn zero(currency: FiatCurrency) -> Self {
        Self { currency, minor: 0 }
    }

    #[must_use]
    pub const fn from_minor(currency: FiatCurrency, minor: u64) -> Self {
        Self { currency, minor }
    }

    /// Parses a major-unit decimal string such as `"9.00"` with integer
    /// math, so exact cent inputs stay exact. Digits beyond cents are
    /// dropped.
    pub fn from_major(currency: FiatCurrency, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MoneyError::InvalidAmount(raw.to_string()));
        }

        let (int_part, frac_part) = match raw.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (raw, ""),
        };

        let valid =
            int_part.chars().all(|c| c.is_ascii_digit()) && frac_part.chars().all(|c| c.is_ascii_digit());
        if !valid || (int_part.is_empty() && frac_part.is_empty()) {
            return Err(MoneyError::InvalidAmount(raw.to_string()));
        }

        let int_value: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?
        };

        let cents: u64 = match frac_part.len() {
            0 => 0,
            1 => {
                let tenths: u64 =
                    frac_part.parse().map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;
                tenths * 10
            }
            _ => frac_part[..2].parse().map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?,
        };

        let minor = int_value
            .checked_mul(100)
            .and_then(|scaled| scaled.checked_add(cents))
            .ok_or(MoneyError::AmountOverflow)?;

        Ok(Self { currency, minor })
    }

    #[must_use]
    pub fn from_major_f64(currency: FiatCurrency, major: f64) -> Self {
        if !major.is_finite() || major <= 0.0 {
            return Self::zero(currency);
        }

        Self { currency, minor: (major * 100.0).floor() as u64 }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    #[must_use]
    pub fn as_major_f64(&self) -> f64 {
        self.minor as f64 / 100.0
    }

    #[must_use]
    pub fn major_string(&self) -> String {
        format!("{}.{:02}", self.minor / 100, self.minor % 100)
    }

    fn ensure_same_currency(&self, rhs: &Self) -> Result<()> {
        if self.currency != rhs.currency {
            return Err(MoneyError::CurrencyMismatch {
                lhs: self.currency.code().to_string(),
                rhs: rhs.currency.code().to_string(),
            });
        }

        Ok(())
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.ensure_same_currency(rhs)?;
        let minor = self.minor.checked_add(rhs.minor).ok_or(MoneyError::AmountOverflow)?;
        Ok(Self { currency: self.currency, minor })
    }
}

impl Display for FiatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.currency.symbol(), self.major_string())
    }
}

// MARK: ExchangeRate

/// Fiat price of one major unit of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub asset: Asset,
    pub currency: FiatCurrency,
    pub price: f64,
}

impl ExchangeRate {
    pub fn new(asset: Asset, currency: FiatCurrency, price: f64) -> Self {
        Self { asset, currency, price }
    }

    pub fn convert_to_fiat(&self, crypto: &CryptoValue) -> Result<FiatValue> {
        if crypto.asset != self.asset {
            return Err(MoneyError::CurrencyMismatch {
                lhs: crypto.asset.code().to_string(),
                rhs: self.asset.code().to_string(),
            });
        }

        Ok(FiatValue::from_major_f64(self.currency, crypto.as_major_f64() * self.price))
    }

    pub fn convert_to_crypto(&self, fiat: &FiatValue) -> Result<CryptoValue> {
        if fiat.currency != self.currency {
            return Err(MoneyError::CurrencyMismatch {
                lhs: fiat.currency.code().to_string(),
                rhs: self.currency.code().to_string(),
            });
        }

        if self.price <= 0.0 || !self.price.is_finite() {
            return Err(MoneyError::InvalidAmount(format!("price: {}", self.price)));
        }

        Ok(CryptoValue::from_major_f64(self.asset, fiat.as_major_f64() / self.price))
    }
}

// MARK: FiatCryptoPair

/// The same amount represented in both fiat and crypto at a point-in-time
/// exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiatCryptoPair {
    pub fiat: FiatValue,
    pub crypto: CryptoValue,
}

impl FiatCryptoPair {
    pub fn from_crypto(crypto: CryptoValue, rate: &ExchangeRate) -> Result<Self> {
        let fiat = rate.convert_to_fiat(&crypto)?;
        Ok(Self { fiat, crypto })
    }

    pub fn from_fiat(fiat: FiatValue, rate: &ExchangeRate) -> Result<Self> {
        let crypto = rate.convert_to_crypto(&fiat)?;
        Ok(Self { fiat, crypto })
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.crypto.is_zero()
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        Ok(Self {
            fiat: self.fiat.checked_add(&rhs.fiat)?,
            crypto: self.crypto.checked_add(&rhs.crypto)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::asset::Erc20Token;

    #[test]
    fn test_from_major_parses_exact_minor_units() {
        let value = CryptoValue::from_major(Asset::Erc20(Erc20Token::Pax), "6.87022901").unwrap();
        assert_eq!(value.minor, 6_870_229_010_000_000_000);
        assert_eq!(value.major_string(), "6.87022901");
    }

    #[test]
    fn test_from_major_rejects_garbage() {
        assert!(CryptoValue::from_major(Asset::Bitcoin, "").is_err());
        assert!(CryptoValue::from_major(Asset::Bitcoin, "1.2.3").is_err());
        assert!(CryptoValue::from_major(Asset::Bitcoin, "abc").is_err());
        assert!(CryptoValue::from_major(Asset::Bitcoin, "-1").is_err());
        // more fractional digits than the asset carries
        assert!(CryptoValue::from_major(Asset::Bitcoin, "0.123456789").is_err());
    }

    #[test]
    fn test_cross_asset_arithmetic_rejected() {
        let btc = CryptoValue::from_minor(Asset::Bitcoin, 100);
        let eth = CryptoValue::from_minor(Asset::Ethereum, 100);

        assert!(matches!(
            btc.checked_add(&eth),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
        assert!(matches!(
            btc.saturating_sub(&eth),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        let balance = CryptoValue::from_minor(Asset::Bitcoin, 100);
        let fee = CryptoValue::from_minor(Asset::Bitcoin, 250);

        let spendable = balance.saturating_sub(&fee).unwrap();
        assert_eq!(spendable, CryptoValue::zero(Asset::Bitcoin));
    }

    #[test]
    fn test_fee_display_matches_wei_math() {
        // 21_000 gas at 11 gwei
        let fee_wei = 21_000u128 * 11_000_000_000u128;
        let fee = CryptoValue::from_minor(Asset::Ethereum, fee_wei);
        assert_eq!(fee.major_string(), "0.000231");
    }

    #[test]
    fn test_rate_round_trip_within_tolerance() {
        let rate = ExchangeRate::new(Asset::Bitcoin, FiatCurrency::Usd, 40_000.0);
        let crypto = CryptoValue::from_major(Asset::Bitcoin, "0.52310000").unwrap();

        let fiat = rate.convert_to_fiat(&crypto).unwrap();
        let back = rate.convert_to_crypto(&fiat).unwrap();

        let diff = crypto.minor.abs_diff(back.minor);
        // one cent of drift at this price is ~25 sats
        assert!(diff < 50, "diff was {diff}");
    }

    #[test]
    fn test_fiat_from_major_keeps_exact_cents() {
        // amounts whose f64 form rounds below the true value
        assert_eq!(FiatValue::from_major(FiatCurrency::Usd, "0.29").unwrap().minor, 29);
        assert_eq!(FiatValue::from_major(FiatCurrency::Usd, "1.13").unwrap().minor, 113);

        assert_eq!(FiatValue::from_major(FiatCurrency::Usd, "20000").unwrap().minor, 2_000_000);
        assert_eq!(FiatValue::from_major(FiatCurrency::Usd, "0.5").unwrap().minor, 50);
        // sub-cent digits are dropped
        assert_eq!(FiatValue::from_major(FiatCurrency::Usd, "9.999").unwrap().minor, 999);

        assert!(FiatValue::from_major(FiatCurrency::Usd, "").is_err());
        assert!(FiatValue::from_major(FiatCurrency::Usd, "abc").is_err());
        assert!(FiatValue::from_major(FiatCurrency::Usd, "-1").is_err());
    }

    #[test]
    fn test_fiat_mismatch_rejected() {
        let usd = FiatValue::from_minor(FiatCurrency::Usd, 100);
        let cad = FiatValue::from_minor(FiatCurrency::Cad, 100);
        assert!(usd.checked_add(&cad).is_err());
    }
}
