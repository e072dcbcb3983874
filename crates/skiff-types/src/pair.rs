use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, UnknownAssetCode};

/// A directed trading pair, rendered on the wire as `"PAX-ETH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradingPair {
    pub from: Asset,
    pub to: Asset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradingPairError {
    #[error("malformed trading pair: {0}")]
    Malformed(String),

    #[error(transparent)]
    UnknownAsset(#[from] UnknownAssetCode),

    #[error("pair trades an asset against itself: {0}")]
    SameAsset(String),
}

impl TradingPair {
    pub fn new(from: Asset, to: Asset) -> Result<Self, TradingPairError> {
        if from == to {
            return Err(TradingPairError::SameAsset(from.code().to_string()));
        }

        Ok(Self { from, to })
    }
}

impl Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from.code(), self.to.code())
    }
}

impl FromStr for TradingPair {
    type Err = TradingPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('-')
            .ok_or_else(|| TradingPairError::Malformed(s.to_string()))?;

        Self::new(Asset::from_code(from)?, Asset::from_code(to)?)
    }
}

impl Serialize for TradingPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TradingPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
