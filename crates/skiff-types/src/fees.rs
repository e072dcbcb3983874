use serde::{Deserialize, Serialize};

use crate::{asset::Asset, money::CryptoValue};

/// Plain sends go out at the regular level; trades pay priority so the
/// deposit confirms inside the order window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeLevel {
    Regular,
    Priority,
}

/// Bounds a user-adjustable fee level must stay inside, in the fee's
/// per-unit denomination (sat/byte, gwei, stroops).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimits {
    pub min: u64,
    pub max: u64,
}

impl FeeLimits {
    #[must_use]
    pub const fn contains(&self, level: u64) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Network fee schedule for one asset, with a regular and a priority level.
///
/// For the bitcoin family the levels are sat/byte, for the ethereum family
/// gwei and for stellar stroops per operation. Ethereum additionally carries
/// the gas limits used to turn a gas price into an absolute fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFee {
    pub asset: Asset,
    pub regular: u64,
    pub priority: u64,
    pub limits: FeeLimits,
    pub gas_limit: Option<u64>,
    pub gas_limit_contract: Option<u64>,
}

impl TransactionFee {
    /// Hardcoded fallback schedule used when the fee service is unreachable.
    #[must_use]
    pub const fn default_for(asset: Asset) -> Self {
        match asset {
            Asset::Bitcoin | Asset::BitcoinCash => Self {
                asset,
                regular: 5,
                priority: 11,
                limits: FeeLimits { min: 2, max: 16 },
                gas_limit: None,
                gas_limit_contract: None,
            },
            Asset::Ethereum | Asset::Erc20(_) => Self {
                asset: Asset::Ethereum,
                regular: 5,
                priority: 11,
                limits: FeeLimits { min: 1, max: 100 },
                gas_limit: Some(21_000),
                gas_limit_contract: Some(65_000),
            },
            Asset::Stellar => Self {
                asset,
                regular: 100,
                priority: 10_000,
                limits: FeeLimits { min: 100, max: 100_000 },
                gas_limit: None,
                gas_limit_contract: None,
            },
        }
    }

    /// The per-unit rate at a level: sat/byte, gwei, or stroops.
    #[must_use]
    pub const fn rate(&self, level: FeeLevel) -> u64 {
        match level {
            FeeLevel::Regular => self.regular,
            FeeLevel::Priority => self.priority,
        }
    }

    /// Absolute fee in the fee asset's minor unit, for an average-size
    /// transaction.
    #[must_use]
    pub fn absolute(&self, level: FeeLevel) -> CryptoValue {
        let rate = self.rate(level);

        match self.asset {
            // sat/byte at the typical 1-in 2-out size
            Asset::Bitcoin | Asset::BitcoinCash => {
                CryptoValue::from_minor(self.asset, rate as u128 * Self::AVERAGE_TX_BYTES as u128)
            }
            Asset::Ethereum | Asset::Erc20(_) => {
                let gas = self.gas_limit.unwrap_or(21_000);
                let wei = rate as u128 * 1_000_000_000 * gas as u128;
                CryptoValue::from_minor(Asset::Ethereum, wei)
            }
            Asset::Stellar => CryptoValue::from_minor(self.asset, rate as u128),
        }
    }

    /// Absolute fee for a contract call (ERC-20 transfer).
    #[must_use]
    pub fn contract_absolute(&self, level: FeeLevel) -> CryptoValue {
        let gas = self.gas_limit_contract.or(self.gas_limit).unwrap_or(65_000);
        let wei = self.rate(level) as u128 * 1_000_000_000 * gas as u128;
        CryptoValue::from_minor(Asset::Ethereum, wei)
    }

    const AVERAGE_TX_BYTES: u64 = 250;
}
