//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, Username};

/// Errors surfaced by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Datastore connectivity failed.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// An account with this username already exists.
    #[error("username {username} is already registered")]
    DuplicateUsername { username: String },
}

impl UserRepositoryError {
    /// Helper for connection failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for duplicate registrations.
    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }
}

/// Port for account storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, UserRepositoryError>;

    /// Persist a new account, rejecting duplicate usernames.
    async fn insert(&self, account: &Account) -> Result<(), UserRepositoryError>;

    /// Number of stored accounts. Used by startup seeding to decide
    /// whether the default headquarters account is needed.
    async fn count(&self) -> Result<u64, UserRepositoryError>;
}
