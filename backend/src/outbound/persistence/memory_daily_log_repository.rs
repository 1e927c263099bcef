//! In-memory daily log store.
//!
//! Backs the repository port with a mutex-guarded map, mirroring the
//! document-store collection the portal runs against in production. The
//! datastore driver itself is out of scope; this adapter is the shipped
//! default and the workhorse of the integration tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::ports::{DailyLogRepository, DailyLogRepositoryError};
use crate::domain::{DailyLog, FactoryId, LogScope, ReportId};

/// Thread-safe in-memory implementation of [`DailyLogRepository`].
#[derive(Debug, Default)]
pub struct MemoryDailyLogRepository {
    logs: RwLock<HashMap<Uuid, DailyLog>>,
}

impl MemoryDailyLogRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, DailyLog>>, DailyLogRepositoryError>
    {
        self.logs
            .read()
            .map_err(|_| DailyLogRepositoryError::query("daily log store lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Uuid, DailyLog>>, DailyLogRepositoryError>
    {
        self.logs
            .write()
            .map_err(|_| DailyLogRepositoryError::query("daily log store lock poisoned"))
    }

    /// Uniqueness guard shared by insert and update.
    fn check_uniqueness(
        existing: &HashMap<Uuid, DailyLog>,
        candidate: &DailyLog,
    ) -> Result<(), DailyLogRepositoryError> {
        for other in existing.values() {
            if other.id == candidate.id {
                continue;
            }
            if other.factory_id == candidate.factory_id && other.date == candidate.date {
                return Err(DailyLogRepositoryError::duplicate_entry(
                    candidate.factory_id.as_str(),
                    candidate.date,
                ));
            }
            if let (Some(theirs), Some(ours)) = (
                other.report_id.as_deref().and_then(ReportId::parse),
                candidate.report_id.as_deref().and_then(ReportId::parse),
            ) {
                if theirs == ours {
                    return Err(DailyLogRepositoryError::duplicate_report_id(
                        ours.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DailyLogRepository for MemoryDailyLogRepository {
    async fn max_conforming_report_number(
        &self,
    ) -> Result<Option<u32>, DailyLogRepositoryError> {
        let logs = self.read()?;
        Ok(logs
            .values()
            .filter_map(|log| log.report_id.as_deref().and_then(ReportId::parse))
            .map(ReportId::number)
            .max())
    }

    async fn find_by_factory_and_date(
        &self,
        factory_id: &FactoryId,
        date: NaiveDate,
    ) -> Result<Option<DailyLog>, DailyLogRepositoryError> {
        let logs = self.read()?;
        Ok(logs
            .values()
            .find(|log| &log.factory_id == factory_id && log.date == date)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DailyLog>, DailyLogRepositoryError> {
        let logs = self.read()?;
        Ok(logs.get(&id).cloned())
    }

    async fn insert(&self, log: &DailyLog) -> Result<(), DailyLogRepositoryError> {
        let mut logs = self.write()?;
        Self::check_uniqueness(&logs, log)?;
        logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn update(&self, log: &DailyLog) -> Result<bool, DailyLogRepositoryError> {
        let mut logs = self.write()?;
        if !logs.contains_key(&log.id) {
            return Ok(false);
        }
        Self::check_uniqueness(&logs, log)?;
        logs.insert(log.id, log.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DailyLogRepositoryError> {
        let mut logs = self.write()?;
        Ok(logs.remove(&id).is_some())
    }

    async fn query(&self, scope: &LogScope) -> Result<Vec<DailyLog>, DailyLogRepositoryError> {
        let logs = self.read()?;
        let mut matched: Vec<DailyLog> = logs
            .values()
            .filter(|log| scope.matches(log))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            (a.date, a.created_at, a.id).cmp(&(b.date, b.created_at, b.id))
        });
        Ok(matched)
    }

    async fn unconforming_in_creation_order(
        &self,
    ) -> Result<Vec<DailyLog>, DailyLogRepositoryError> {
        let logs = self.read()?;
        let mut pending: Vec<DailyLog> = logs
            .values()
            .filter(|log| !log.has_conforming_report_id())
            .cloned()
            .collect();
        pending.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(pending)
    }
}
