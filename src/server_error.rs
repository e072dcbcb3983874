use serde::{Deserialize, Serialize};

/// Structured error body returned by the trade and payments backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} ({code})")]
pub struct ServerError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ServerError {
    /// The backend signals a missing two-factor token with this code instead
    /// of a dedicated status.
    #[must_use]
    pub fn is_two_factor(&self) -> bool {
        self.code == "bad2fa"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_decodes_backend_body() {
        let error: ServerError =
            serde_json::from_str(r#"{"code": "bad2fa", "message": "2FA token required"}"#).unwrap();

        assert!(error.is_two_factor());
        assert_eq!(error.to_string(), "2FA token required (bad2fa)");
    }

    #[test]
    fn test_missing_fields_default() {
        let error: ServerError = serde_json::from_str("{}").unwrap();
        assert!(!error.is_two_factor());
    }
}
