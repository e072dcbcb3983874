use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use skiff_types::{Asset, AssetAccount, CryptoValue};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("no funded account for {0}")]
    NoAccount(Asset),

    #[error("account lookup failed: {0}")]
    Unavailable(String),
}

/// Source of funding accounts and balances. Implemented over the wallet
/// payload in production, in memory in tests.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn default_account(&self, asset: Asset) -> Result<AssetAccount, AccountError>;

    async fn balance(&self, asset: Asset) -> Result<CryptoValue, AccountError> {
        Ok(self.default_account(asset).await?.balance)
    }
}

/// In-memory account store, one default account per asset.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<Asset, AssetAccount>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: AssetAccount) {
        self.accounts.write().insert(account.asset(), account);
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn default_account(&self, asset: Asset) -> Result<AssetAccount, AccountError> {
        self.accounts
            .read()
            .get(&asset)
            .cloned()
            .ok_or(AccountError::NoAccount(asset))
    }
}
