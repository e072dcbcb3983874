use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Every asset the send and exchange pipelines support. The enum is closed on
/// purpose: asset-keyed logic is written as total matches so an unsupported
/// combination is a compile error, not a runtime crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Bitcoin,
    BitcoinCash,
    Ethereum,
    Erc20(Erc20Token),
    Stellar,
}

/// ERC-20 tokens carried on the Ethereum chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Erc20Token {
    Pax,
    Tether,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset code: {0}")]
pub struct UnknownAssetCode(pub String);

impl Asset {
    pub const ALL: [Asset; 6] = [
        Asset::Bitcoin,
        Asset::BitcoinCash,
        Asset::Ethereum,
        Asset::Erc20(Erc20Token::Pax),
        Asset::Erc20(Erc20Token::Tether),
        Asset::Stellar,
    ];

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "BTC",
            Asset::BitcoinCash => "BCH",
            Asset::Ethereum => "ETH",
            Asset::Erc20(Erc20Token::Pax) => "PAX",
            Asset::Erc20(Erc20Token::Tether) => "USDT",
            Asset::Stellar => "XLM",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "Bitcoin",
            Asset::BitcoinCash => "Bitcoin Cash",
            Asset::Ethereum => "Ether",
            Asset::Erc20(Erc20Token::Pax) => "USD Digital",
            Asset::Erc20(Erc20Token::Tether) => "Tether",
            Asset::Stellar => "Stellar",
        }
    }

    /// Number of decimal places between the minor unit and the major unit.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        match self {
            Asset::Bitcoin | Asset::BitcoinCash => 8,
            Asset::Ethereum | Asset::Erc20(Erc20Token::Pax) => 18,
            Asset::Erc20(Erc20Token::Tether) => 6,
            Asset::Stellar => 7,
        }
    }

    /// The asset whose balance pays the network fee. ERC-20 transfers spend
    /// the token but burn ETH for gas.
    #[must_use]
    pub const fn fee_asset(&self) -> Asset {
        match self {
            Asset::Erc20(_) => Asset::Ethereum,
            other => *other,
        }
    }

    #[must_use]
    pub const fn is_ethereum_family(&self) -> bool {
        matches!(self, Asset::Ethereum | Asset::Erc20(_))
    }

    pub fn from_code(code: &str) -> Result<Self, UnknownAssetCode> {
        Self::ALL
            .iter()
            .find(|asset| asset.code().eq_ignore_ascii_case(code))
            .copied()
            .ok_or_else(|| UnknownAssetCode(code.to_string()))
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Asset {
    type Err = UnknownAssetCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}
