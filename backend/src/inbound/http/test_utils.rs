//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::{DailyLogService, FactoryCatalog};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{MemoryDailyLogRepository, MemoryUserRepository};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build state over empty in-memory stores and the builtin catalog.
pub fn test_state() -> HttpState {
    let logs = DailyLogService::new(
        Arc::new(MemoryDailyLogRepository::new()),
        FactoryCatalog::builtin(),
    );
    HttpState::new(logs, Arc::new(MemoryUserRepository::new()))
}
