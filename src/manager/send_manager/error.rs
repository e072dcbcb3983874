use skiff_types::{Asset, MemoError};

use super::input_state::SendInputState;
use crate::{builder::BuildError, exchange_address::ExchangeAddressError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SendManagerError {
    #[error("the form is not ready to send")]
    NotReady(SendInputState),

    #[error("no funded {0} account")]
    NoSourceAccount(Asset),

    #[error("a payment is already prepared, send or discard it first")]
    CandidateAlreadyPrepared,

    #[error("the prepared payment was already sent or discarded")]
    NullifiedCandidate,

    #[error("a send is already in flight")]
    SendInProgress,

    #[error("memos only apply to stellar sends")]
    MemoUnsupported(Asset),

    #[error(transparent)]
    Memo(#[from] MemoError),

    #[error(transparent)]
    ExchangeAddress(#[from] ExchangeAddressError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
