use serde::{Deserialize, Serialize};

use crate::money::CryptoValue;

/// An unsigned payment: where the funds go and how much. Builders turn a
/// candidate into an asset-specific prepared payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub destination_address: String,
    pub amount: CryptoValue,
}

impl TransactionCandidate {
    pub fn new(destination_address: impl Into<String>, amount: CryptoValue) -> Self {
        Self { destination_address: destination_address.into(), amount }
    }
}
