//! Port for daily log persistence.
//!
//! The [`DailyLogRepository`] trait defines the narrow contract the core
//! consumes from the document datastore. Adapters map their own failures
//! into the typed variants below so the service can translate them into
//! predictable domain errors instead of a generic catch-all.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{DailyLog, FactoryId, LogScope};

/// Errors surfaced by daily log repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DailyLogRepositoryError {
    /// Datastore connectivity failed.
    #[error("daily log repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("daily log repository query failed: {message}")]
    Query { message: String },
    /// Insert or update would duplicate a `(factory_id, date)` pair.
    #[error("daily log already exists for factory {factory_id} on {date}")]
    DuplicateEntry { factory_id: String, date: NaiveDate },
    /// Insert or update would duplicate a conforming report identifier.
    ///
    /// This is the adapter-side uniqueness guard that lets the service
    /// retry allocation instead of trusting the naive max-then-increment
    /// read to be race free.
    #[error("report identifier {report_id} is already assigned")]
    DuplicateReportId { report_id: String },
}

impl DailyLogRepositoryError {
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

    /// Helper for `(factory_id, date)` collisions.
    pub fn duplicate_entry(factory_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::DuplicateEntry {
            factory_id: factory_id.into(),
            date,
        }
    }

    /// Helper for report identifier collisions.
    pub fn duplicate_report_id(report_id: impl Into<String>) -> Self {
        Self::DuplicateReportId {
            report_id: report_id.into(),
        }
    }
}

/// Port for daily log storage and retrieval.
///
/// # Uniqueness
///
/// `insert` and `update` must reject records that would duplicate an
/// existing `(factory_id, date)` pair or an existing conforming report
/// identifier, returning the matching error variant. `update` excludes
/// the record being updated from both checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyLogRepository: Send + Sync {
    /// The largest numeric suffix among stored conforming report
    /// identifiers, or `None` when no conforming identifier exists.
    /// Non-conforming values are excluded, never an error.
    async fn max_conforming_report_number(
        &self,
    ) -> Result<Option<u32>, DailyLogRepositoryError>;

    /// Fetch the record for a `(factory_id, date)` pair, if any.
    async fn find_by_factory_and_date(
        &self,
        factory_id: &FactoryId,
        date: NaiveDate,
    ) -> Result<Option<DailyLog>, DailyLogRepositoryError>;

    /// Fetch a record by primary key.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DailyLog>, DailyLogRepositoryError>;

    /// Persist a new record.
    async fn insert(&self, log: &DailyLog) -> Result<(), DailyLogRepositoryError>;

    /// Replace an existing record. Returns `false` when no record with
    /// the given id exists.
    async fn update(&self, log: &DailyLog) -> Result<bool, DailyLogRepositoryError>;

    /// Delete a record. Returns `false` when no record with the given id
    /// exists.
    async fn delete(&self, id: Uuid) -> Result<bool, DailyLogRepositoryError>;

    /// All records matching the scope, ordered by business date then
    /// creation time.
    async fn query(&self, scope: &LogScope) -> Result<Vec<DailyLog>, DailyLogRepositoryError>;

    /// Records whose report identifier is missing, empty, or
    /// non-conforming, in ascending creation-time order.
    async fn unconforming_in_creation_order(
        &self,
    ) -> Result<Vec<DailyLog>, DailyLogRepositoryError>;
}
