use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Chf,
    Aud,
    Jpy,
}

impl FiatCurrency {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            FiatCurrency::Usd => "USD",
            FiatCurrency::Eur => "EUR",
            FiatCurrency::Gbp => "GBP",
            FiatCurrency::Cad => "CAD",
            FiatCurrency::Chf => "CHF",
            FiatCurrency::Aud => "AUD",
            FiatCurrency::Jpy => "JPY",
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            FiatCurrency::Usd | FiatCurrency::Cad | FiatCurrency::Aud => "$",
            FiatCurrency::Eur => "€",
            FiatCurrency::Gbp => "£",
            FiatCurrency::Chf => "CHF",
            FiatCurrency::Jpy => "¥",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::iter().find(|currency| currency.code().eq_ignore_ascii_case(code))
    }
}

impl Display for FiatCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn all_currencies() -> Vec<FiatCurrency> {
    FiatCurrency::iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(FiatCurrency::from_code("cad"), Some(FiatCurrency::Cad));
        assert_eq!(FiatCurrency::from_code("XYZ"), None);
    }
}
