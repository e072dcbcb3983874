use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::models::{Order, OrderResult, TransactionFailure};
use crate::server_error::ServerError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeClientError {
    #[error("trade request failed: {0}")]
    Network(String),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// The trades backend surface, behind a trait so execution can be tested
/// without a server.
#[async_trait]
pub trait TradeApi: Send + Sync {
    /// Registers an order and returns the server's deposit instructions.
    async fn create_order(&self, order: &Order) -> Result<OrderResult, TradeClientError>;

    /// Reports why a registered order could not be paid, so the backend can
    /// cancel it instead of waiting for a deposit that will never arrive.
    async fn report_failure(&self, order_id: &str, reason: &str) -> Result<(), TradeClientError>;
}

/// Client for the trades backend.
pub struct TradeClient {
    client: reqwest::Client,
    base_url: String,
}

impl TradeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl TradeApi for TradeClient {
    async fn create_order(&self, order: &Order) -> Result<OrderResult, TradeClientError> {
        let url = format!("{}/trades", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(order)
            .send()
            .await
            .map_err(|error| TradeClientError::Network(error.to_string()))?;

        if !response.status().is_success() {
            let server_error: ServerError = response
                .json()
                .await
                .map_err(|error| TradeClientError::Network(error.to_string()))?;
            return Err(server_error.into());
        }

        let result: OrderResult = response
            .json()
            .await
            .map_err(|error| TradeClientError::Network(error.to_string()))?;

        debug!("registered order {} for {}", result.id, result.pair);
        Ok(result)
    }

    /// Retried because losing this report strands the order.
    async fn report_failure(&self, order_id: &str, reason: &str) -> Result<(), TradeClientError> {
        let url = format!("{}/trades/{}/failure-reason", self.base_url, order_id);
        let body = TransactionFailure { message: reason.to_string() };

        tryhard::retry_fn(|| async {
            let response = self
                .client
                .put(&url)
                .json(&body)
                .send()
                .await
                .map_err(|error| TradeClientError::Network(error.to_string()))?;

            if !response.status().is_success() {
                return Err(TradeClientError::Network(format!(
                    "failure report for order {order_id} returned {}",
                    response.status()
                )));
            }

            Ok(())
        })
        .retries(3)
        .exponential_backoff(Duration::from_millis(250))
        .await
    }
}
