//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on
//! the domain service and ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Account, DailyLogService, Error, FactoryCatalog, Principal};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub logs: DailyLogService,
    pub users: Arc<dyn UserRepository>,
}

impl HttpState {
    /// Construct state over a log service and a user repository.
    pub fn new(logs: DailyLogService, users: Arc<dyn UserRepository>) -> Self {
        Self { logs, users }
    }

    /// The factory catalog the log service validates against.
    pub fn catalog(&self) -> &FactoryCatalog {
        self.logs.catalog()
    }

    pub(crate) fn map_user_repo_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserRepositoryError::DuplicateUsername { .. } => {
                Error::conflict("username already taken")
            }
        }
    }

    /// Resolve the session to a stored account.
    ///
    /// A session naming a deleted account is treated as logged out.
    pub async fn require_account(&self, session: &SessionContext) -> Result<Account, Error> {
        let username = session.require_username()?;
        self.users
            .find_by_username(&username)
            .await
            .map_err(Self::map_user_repo_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Resolve the session to a trusted caller identity.
    pub async fn require_principal(&self, session: &SessionContext) -> Result<Principal, Error> {
        Ok(self.require_account(session).await?.principal())
    }
}
