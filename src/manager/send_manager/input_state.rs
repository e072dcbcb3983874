use skiff_types::{Asset, AssetAccount, FiatCryptoPair};

use crate::address::AddressError;

/// A derived amount that may still be waiting on an exchange rate.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationState {
    Calculating,
    Value(FiatCryptoPair),
    Invalid(CalculationError),
}

impl CalculationState {
    #[must_use]
    pub fn value(&self) -> Option<&FiatCryptoPair> {
        match self {
            CalculationState::Value(pair) => Some(pair),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_calculating(&self) -> bool {
        matches!(self, CalculationState::Calculating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationError {
    /// Nothing entered, or the entry parses to zero.
    Empty,
    /// The entry could not be turned into an amount.
    ValueCouldNotBeCalculated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationState {
    Empty,
    Valid { address: String, is_exchange: bool },
    Invalid(AddressError),
}

impl DestinationState {
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            DestinationState::Valid { address, .. } => Some(address),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceAccountState {
    Calculating,
    Available(AssetAccount),
    /// An earlier send from this account must confirm first. Blocks
    /// ethereum-family sends, which are serialized on the account nonce.
    PendingTransactionCompletion,
}

/// Overall readiness of the send form, derived from the sub-states. The
/// screen enables its continue button exactly when this is `Valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendInputState {
    Empty,
    Calculating,
    Valid,
    Invalid(StateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    PendingTransaction,
    InvalidAddress,
    AboveSpendableBalance,
    Generic,
}

impl StateError {
    #[must_use]
    pub fn title(&self, asset: Asset) -> String {
        match self {
            StateError::PendingTransaction => {
                format!("Waiting on your {} send to complete", asset.name())
            }
            StateError::InvalidAddress => format!("Invalid {} address", asset.code()),
            StateError::AboveSpendableBalance => format!("Not enough {}", asset.code()),
            StateError::Generic => "Something went wrong".to_string(),
        }
    }

    #[must_use]
    pub fn description(&self, asset: Asset) -> Option<String> {
        match self {
            StateError::PendingTransaction => Some(match asset {
                Asset::Ethereum | Asset::Erc20(_) => {
                    "Your last transaction must confirm before you can send again. \
                     This usually takes a few minutes."
                        .to_string()
                }
                _ => "Your last transaction is still processing.".to_string(),
            }),
            StateError::InvalidAddress => {
                Some(format!("Double check the destination is a {} address.", asset.name()))
            }
            StateError::AboveSpendableBalance => {
                Some("The amount plus the network fee exceeds your balance.".to_string())
            }
            StateError::Generic => Some("Please try again.".to_string()),
        }
    }
}

/// Collapses the sub-states into one [`SendInputState`].
///
/// Precedence, highest first: a blocked source account, a malformed
/// address, an amount above the spendable balance, anything still
/// calculating, an empty form. Only a fully resolved form is `Valid`;
/// every leftover combination lands on the generic error.
pub fn derive(
    amount: &CalculationState,
    spendable: &CalculationState,
    destination: &DestinationState,
    source: &SourceAccountState,
) -> SendInputState {
    if matches!(source, SourceAccountState::PendingTransactionCompletion) {
        return SendInputState::Invalid(StateError::PendingTransaction);
    }

    if matches!(destination, DestinationState::Invalid(_)) {
        return SendInputState::Invalid(StateError::InvalidAddress);
    }

    if let (Some(amount), Some(spendable)) = (amount.value(), spendable.value()) {
        if amount.crypto.minor > spendable.crypto.minor {
            return SendInputState::Invalid(StateError::AboveSpendableBalance);
        }
    }

    if amount.is_calculating()
        || spendable.is_calculating()
        || matches!(source, SourceAccountState::Calculating)
    {
        return SendInputState::Calculating;
    }

    if matches!(amount, CalculationState::Invalid(CalculationError::Empty))
        || matches!(destination, DestinationState::Empty)
    {
        return SendInputState::Empty;
    }

    match (amount, destination, source) {
        (
            CalculationState::Value(_),
            DestinationState::Valid { .. },
            SourceAccountState::Available(_),
        ) => SendInputState::Valid,
        _ => SendInputState::Invalid(StateError::Generic),
    }
}
