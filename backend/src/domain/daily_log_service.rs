//! Daily log access and numbering service.
//!
//! This module implements the driving use-cases for daily logs: creation
//! with report identifier allocation, role-scoped reads, creator-only
//! mutation, and the administrative renumbering backfill. Handlers call
//! the service; the service talks only to the repository port.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{DailyLogRepository, DailyLogRepositoryError};
use crate::domain::{
    DailyLog, DailyLogDraft, DailyLogUpdate, Error, FactoryCatalog, FactoryId, LogScope,
    Principal, ReportId, ReportIdError, Role, ScopeRequest,
};

/// Attempts before giving up on a contended report identifier.
///
/// Allocation reads the current max and writes max+1 as two steps, so two
/// concurrent creations can compute the same number. The repository
/// rejects the duplicate and the loser re-reads; a handful of retries is
/// enough because contention is per-creation, not sustained.
const ALLOCATION_ATTEMPTS: usize = 3;

/// Daily log use-cases over a repository port.
#[derive(Clone)]
pub struct DailyLogService {
    repo: Arc<dyn DailyLogRepository>,
    catalog: FactoryCatalog,
}

impl DailyLogService {
    /// Create a new service with the given repository and catalog.
    pub fn new(repo: Arc<dyn DailyLogRepository>, catalog: FactoryCatalog) -> Self {
        Self { repo, catalog }
    }

    /// The catalog this service validates factories against.
    pub fn catalog(&self) -> &FactoryCatalog {
        &self.catalog
    }

    fn map_repo_error(error: DailyLogRepositoryError) -> Error {
        match error {
            DailyLogRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("daily log repository unavailable: {message}"))
            }
            DailyLogRepositoryError::Query { message } => {
                Error::internal(format!("daily log repository error: {message}"))
            }
            DailyLogRepositoryError::DuplicateEntry { .. } => {
                Error::conflict("daily log for this date already exists")
            }
            DailyLogRepositoryError::DuplicateReportId { report_id } => {
                Error::internal(format!("report identifier {report_id} already assigned"))
            }
        }
    }

    fn map_allocation_error(error: ReportIdError) -> Error {
        Error::internal(format!("report identifier allocation failed: {error}"))
    }

    fn unknown_factory_error(factory_id: &FactoryId) -> Error {
        Error::invalid_request("unknown factory").with_details(json!({
            "factoryId": factory_id.as_str(),
            "code": "unknown_factory",
        }))
    }

    /// Creation-scope rule: an employee may only target their own factory.
    fn check_creation_scope(principal: &Principal, factory_id: &FactoryId) -> Result<(), Error> {
        match principal.role() {
            Role::Headquarters => Ok(()),
            Role::FactoryEmployee if principal.factory_id() == Some(factory_id) => Ok(()),
            Role::FactoryEmployee => Err(Error::forbidden("access denied to this factory")
                .with_details(json!({ "factoryId": factory_id.as_str() }))),
        }
    }

    /// Write-scope rule: ownership is by creator identity, not role.
    /// Headquarters has no override.
    fn check_ownership(principal: &Principal, log: &DailyLog) -> Result<(), Error> {
        if &log.created_by == principal.username() {
            Ok(())
        } else {
            Err(Error::forbidden(
                "only the creator of a daily log may modify it",
            ))
        }
    }

    async fn ensure_date_free(
        &self,
        factory_id: &FactoryId,
        date: chrono::NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<(), Error> {
        let existing = self
            .repo
            .find_by_factory_and_date(factory_id, date)
            .await
            .map_err(Self::map_repo_error)?;
        match existing {
            Some(found) if Some(found.id) != exclude => {
                Err(Error::conflict("daily log for this date already exists").with_details(
                    json!({
                        "factoryId": factory_id.as_str(),
                        "date": date.to_string(),
                    }),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Create a daily log, allocating the next report identifier.
    ///
    /// Allocation happens after all validation passes. A failed insert
    /// does not "spend" the number: the next attempt simply re-reads the
    /// max. Gaps are acceptable; duplicates are rejected by the adapter
    /// and retried here.
    pub async fn create(
        &self,
        principal: &Principal,
        draft: DailyLogDraft,
    ) -> Result<DailyLog, Error> {
        if !self.catalog.contains(&draft.factory_id) {
            return Err(Self::unknown_factory_error(&draft.factory_id));
        }
        Self::check_creation_scope(principal, &draft.factory_id)?;
        self.ensure_date_free(&draft.factory_id, draft.date, None)
            .await?;

        let mut last_contended = None;
        for _ in 0..ALLOCATION_ATTEMPTS {
            let prior_max = self
                .repo
                .max_conforming_report_number()
                .await
                .map_err(Self::map_repo_error)?;
            let report_id =
                ReportId::next_after(prior_max).map_err(Self::map_allocation_error)?;

            let log = DailyLog {
                id: Uuid::new_v4(),
                report_id: Some(report_id.to_string()),
                factory_id: draft.factory_id.clone(),
                date: draft.date,
                production: draft.production.clone(),
                sales: draft.sales.clone(),
                downtime_hours: draft.downtime_hours,
                downtime_reason: draft.downtime_reason.clone(),
                stock: draft.stock.clone(),
                created_by: principal.username().clone(),
                created_at: Utc::now(),
            };

            match self.repo.insert(&log).await {
                Ok(()) => {
                    info!(
                        report_id = %report_id,
                        factory_id = %log.factory_id,
                        date = %log.date,
                        "daily log created"
                    );
                    return Ok(log);
                }
                Err(DailyLogRepositoryError::DuplicateReportId { report_id }) => {
                    // Concurrent creation won the number; re-read and retry.
                    warn!(report_id = %report_id, "report identifier contended, retrying");
                    last_contended = Some(report_id);
                }
                Err(other) => return Err(Self::map_repo_error(other)),
            }
        }

        Err(Error::internal(format!(
            "report identifier allocation contended after {ALLOCATION_ATTEMPTS} attempts (last {})",
            last_contended.unwrap_or_default()
        )))
    }

    /// Fetch a single record, applying the read-scope rule.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<DailyLog, Error> {
        let log = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("daily log not found"))?;
        if principal.role() == Role::FactoryEmployee
            && principal.factory_id() != Some(&log.factory_id)
        {
            return Err(Error::forbidden("access denied to this factory"));
        }
        Ok(log)
    }

    /// List records visible to the caller.
    ///
    /// The caller-supplied request is narrowed by the role rule first;
    /// an employee's requested factory is overridden, never honoured.
    pub async fn list(
        &self,
        principal: &Principal,
        request: ScopeRequest,
    ) -> Result<Vec<DailyLog>, Error> {
        let scope = LogScope::for_principal(principal, request);
        self.repo.query(&scope).await.map_err(Self::map_repo_error)
    }

    /// Update a record's payload, date, or factory.
    ///
    /// Creator-only; a factory change re-applies the creation rule for
    /// the new factory, and date or factory changes re-check the
    /// `(factory_id, date)` uniqueness invariant excluding this record.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        update: DailyLogUpdate,
    ) -> Result<DailyLog, Error> {
        let existing = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("daily log not found"))?;
        Self::check_ownership(principal, &existing)?;

        if let Some(new_factory) = &update.factory_id {
            if new_factory != &existing.factory_id {
                if !self.catalog.contains(new_factory) {
                    return Err(Self::unknown_factory_error(new_factory));
                }
                Self::check_creation_scope(principal, new_factory)?;
            }
        }

        let updated = update.apply_to(&existing);
        if (updated.factory_id.clone(), updated.date) != (existing.factory_id, existing.date) {
            self.ensure_date_free(&updated.factory_id, updated.date, Some(id))
                .await?;
        }

        let found = self
            .repo
            .update(&updated)
            .await
            .map_err(Self::map_repo_error)?;
        if !found {
            return Err(Error::not_found("daily log not found"));
        }
        Ok(updated)
    }

    /// Delete a record. Creator-only, same as update.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error> {
        let existing = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("daily log not found"))?;
        Self::check_ownership(principal, &existing)?;

        let found = self
            .repo
            .delete(id)
            .await
            .map_err(Self::map_repo_error)?;
        if !found {
            return Err(Error::not_found("daily log not found"));
        }
        info!(id = %id, "daily log deleted");
        Ok(())
    }

    /// Assign fresh conforming report identifiers to legacy records.
    ///
    /// Headquarters-only. Processes records in ascending creation-time
    /// order so older records receive lower numbers, continuing from the
    /// current max. A record whose individual update fails is skipped
    /// (its number is reused for the next record) and the run continues;
    /// the returned count reflects only records actually changed.
    /// Running it again when nothing is unconforming updates zero.
    pub async fn renumber_unconforming(&self, principal: &Principal) -> Result<u64, Error> {
        if !principal.is_headquarters() {
            return Err(Error::forbidden(
                "renumbering is restricted to headquarters",
            ));
        }

        let mut current_max = self
            .repo
            .max_conforming_report_number()
            .await
            .map_err(Self::map_repo_error)?;
        let pending = self
            .repo
            .unconforming_in_creation_order()
            .await
            .map_err(Self::map_repo_error)?;

        let mut updated = 0u64;
        for record in pending {
            let report_id =
                ReportId::next_after(current_max).map_err(Self::map_allocation_error)?;
            let mut renumbered = record.clone();
            renumbered.report_id = Some(report_id.to_string());

            match self.repo.update(&renumbered).await {
                Ok(true) => {
                    updated += 1;
                    current_max = Some(report_id.number());
                }
                Ok(false) => {
                    // Record vanished mid-run; its number was never spent.
                    warn!(id = %record.id, "record disappeared during renumbering");
                }
                Err(err) => {
                    warn!(id = %record.id, error = %err, "renumbering skipped a record");
                }
            }
        }

        info!(updated, "report identifier backfill finished");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "daily_log_service_tests.rs"]
mod tests;
