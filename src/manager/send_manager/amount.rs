use skiff_types::{CryptoValue, FiatCryptoPair, FiatValue};

use super::{
    input_state::{CalculationError, CalculationState},
    state::{AmountField, SendManagerState},
    Message, SendManager,
};

/// Strips formatting noise from a typed amount, keeping digits and the
/// first decimal point.
fn sanitize(raw: &str) -> String {
    let mut seen_dot = false;
    raw.chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        })
        .collect()
}

impl SendManager {
    pub(super) fn crypto_amount_changed(&self, raw: String) {
        let sanitized = sanitize(&raw);
        let input = if sanitized.is_empty() { "0".to_string() } else { sanitized };

        {
            let mut state = self.state.lock();
            state.entering_crypto_amount = input.clone();
            state.last_edited = AmountField::Crypto;
        }

        self.send_message(Message::UpdateEnteringCryptoAmount(input));
        self.recompute_amount();
        self.recompute_input_state();
    }

    pub(super) fn fiat_amount_changed(&self, raw: String) {
        let sanitized = sanitize(&raw);
        let input = if sanitized.is_empty() { "0".to_string() } else { sanitized };

        {
            let mut state = self.state.lock();
            state.entering_fiat_amount = input.clone();
            state.last_edited = AmountField::Fiat;
        }

        self.send_message(Message::UpdateEnteringFiatAmount(input));
        self.recompute_amount();
        self.recompute_input_state();
    }

    /// Re-derives the amount from whichever field was edited last and
    /// writes the converted value into the other field. Derivation and the
    /// write happen under one lock so a concurrent dispatch cannot slip a
    /// newer entry in between.
    pub(crate) fn recompute_amount(&self) {
        let message = {
            let mut state = self.state.lock();
            let (new_amount, counterpart) = match state.last_edited {
                AmountField::Crypto => derive_from_crypto(&state),
                AmountField::Fiat => derive_from_fiat(&state),
            };
            state.amount = new_amount;

            match (state.last_edited, counterpart) {
                (AmountField::Crypto, Some(fiat)) => {
                    state.entering_fiat_amount = fiat.clone();
                    Some(Message::UpdateEnteringFiatAmount(fiat))
                }
                (AmountField::Fiat, Some(crypto)) => {
                    state.entering_crypto_amount = crypto.clone();
                    Some(Message::UpdateEnteringCryptoAmount(crypto))
                }
                (_, None) => None,
            }
        };

        if let Some(message) = message {
            self.send_message(message);
        }
    }
}

fn derive_from_crypto(state: &SendManagerState) -> (CalculationState, Option<String>) {
    let value = match CryptoValue::from_major(state.asset, &state.entering_crypto_amount) {
        Ok(value) => value,
        // unparseable entry reads as nothing entered
        Err(_) => return (CalculationState::Invalid(CalculationError::Empty), None),
    };

    if value.is_zero() {
        return (CalculationState::Invalid(CalculationError::Empty), Some("0".to_string()));
    }

    let Some(rate) = &state.rate else {
        return (CalculationState::Calculating, None);
    };

    match FiatCryptoPair::from_crypto(value, rate) {
        Ok(pair) => {
            let fiat = pair.fiat.major_string();
            (CalculationState::Value(pair), Some(fiat))
        }
        Err(_) => (
            CalculationState::Invalid(CalculationError::ValueCouldNotBeCalculated),
            None,
        ),
    }
}

fn derive_from_fiat(state: &SendManagerState) -> (CalculationState, Option<String>) {
    let value = match FiatValue::from_major(state.fiat_currency, &state.entering_fiat_amount) {
        Ok(value) => value,
        Err(_) => {
            return (
                CalculationState::Invalid(CalculationError::ValueCouldNotBeCalculated),
                None,
            )
        }
    };

    if value.is_zero() {
        return (CalculationState::Invalid(CalculationError::Empty), Some("0".to_string()));
    }

    let Some(rate) = &state.rate else {
        return (CalculationState::Calculating, None);
    };

    match FiatCryptoPair::from_fiat(value, rate) {
        Ok(pair) => {
            let crypto = pair.crypto.major_string();
            (CalculationState::Value(pair), Some(crypto))
        }
        Err(_) => (
            CalculationState::Invalid(CalculationError::ValueCouldNotBeCalculated),
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("1,234.56"), "1234.56");
        assert_eq!(sanitize("  0.5 "), "0.5");
        assert_eq!(sanitize("1.2.3"), "1.23");
        assert_eq!(sanitize("abc"), "");
    }
}
