//! In-memory account store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Account, Username};

/// Thread-safe in-memory implementation of [`UserRepository`].
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, UserRepositoryError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| UserRepositoryError::query("account store lock poisoned"))?;
        Ok(accounts.get(username.as_str()).cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), UserRepositoryError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| UserRepositoryError::query("account store lock poisoned"))?;
        if accounts.contains_key(account.username.as_str()) {
            return Err(UserRepositoryError::duplicate_username(
                account.username.as_str(),
            ));
        }
        accounts.insert(account.username.to_string(), account.clone());
        Ok(())
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| UserRepositoryError::query("account store lock poisoned"))?;
        Ok(accounts.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{FactoryId, Role};

    fn account(name: &str) -> Account {
        Account::try_new(
            Username::new(name).expect("valid username"),
            format!("{name}@example.com"),
            "$2b$12$hash".into(),
            Role::FactoryEmployee,
            Some(FactoryId::new("wakene_food").expect("valid factory")),
        )
        .expect("valid account")
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let repo = MemoryUserRepository::new();
        repo.insert(&account("alice")).await.expect("insert");
        let found = repo
            .find_by_username(&Username::new("alice").expect("valid username"))
            .await
            .expect("lookup");
        assert_eq!(found.map(|a| a.email), Some("alice@example.com".into()));
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let repo = MemoryUserRepository::new();
        repo.insert(&account("alice")).await.expect("insert");
        let err = repo
            .insert(&account("alice"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, UserRepositoryError::DuplicateUsername { .. }));
    }
}
