use skiff_types::FiatCryptoPair;

use super::{
    input_state::{CalculationError, CalculationState},
    state::SendManagerState,
    Message, SendManager,
};

impl SendManager {
    /// Spendable balance is the balance minus the network fee, floored at
    /// zero. Stays `Calculating` until the balance, fee and rate have all
    /// arrived.
    pub(crate) fn recompute_spendable(&self) {
        let new_spendable = {
            let state = self.state.lock();
            compute(&state)
        };

        let changed = {
            let mut state = self.state.lock();
            if state.spendable == new_spendable {
                false
            } else {
                state.spendable = new_spendable.clone();
                true
            }
        };

        if changed {
            self.send_message(Message::UpdateSpendableBalance(new_spendable));
            self.recompute_input_state();
        }
    }
}

fn compute(state: &SendManagerState) -> CalculationState {
    let (Some(balance), Some(fee), Some(rate)) = (state.balance, state.fee, &state.rate) else {
        return CalculationState::Calculating;
    };

    // token balances are not reduced by the fee, gas comes out of ETH
    let spendable = if fee.asset == balance.asset {
        match balance.saturating_sub(&fee) {
            Ok(value) => value,
            Err(_) => {
                return CalculationState::Invalid(CalculationError::ValueCouldNotBeCalculated)
            }
        }
    } else {
        balance
    };

    match FiatCryptoPair::from_crypto(spendable, rate) {
        Ok(pair) => CalculationState::Value(pair),
        Err(_) => CalculationState::Invalid(CalculationError::ValueCouldNotBeCalculated),
    }
}
