//! Domain primitives, aggregates, and use-cases.
//!
//! Purpose: define the strongly typed core of the reporting portal —
//! principals, daily logs, report identifiers, query scopes — together
//! with the ports it consumes and the services handlers drive. Keep types
//! immutable where possible and document invariants in each type's
//! Rustdoc. Nothing in this module imports the web framework or a
//! storage driver.

pub mod analytics;
pub mod export;
pub mod ports;

mod account;
mod daily_log;
mod daily_log_service;
mod error;
mod factory;
mod principal;
mod report_id;
mod scope;

pub use self::account::Account;
pub use self::daily_log::{DailyLog, DailyLogDraft, DailyLogUpdate, SalesFigures};
pub use self::daily_log_service::DailyLogService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::factory::{CatalogError, FactoryCatalog, FactoryProfile};
pub use self::principal::{FactoryId, Principal, PrincipalValidationError, Role, Username};
pub use self::report_id::{
    REPORT_NUMBER_CEILING, REPORT_NUMBER_FLOOR, ReportId, ReportIdError,
};
pub use self::scope::{DateRange, LogScope, ScopeRequest};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;
