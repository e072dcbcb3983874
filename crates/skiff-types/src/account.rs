use serde::{Deserialize, Serialize};

use crate::{asset::Asset, money::CryptoValue};

/// A funding account for one asset: where a send draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAccount {
    pub index: u32,
    pub address: String,
    pub balance: CryptoValue,
    pub label: String,
}

impl AssetAccount {
    pub fn new(index: u32, address: impl Into<String>, balance: CryptoValue, label: impl Into<String>) -> Self {
        Self { index, address: address.into(), balance, label: label.into() }
    }

    #[must_use]
    pub const fn asset(&self) -> Asset {
        self.balance.asset
    }
}
