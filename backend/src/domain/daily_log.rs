//! Daily production log aggregate.
//!
//! The numeric payload (production, sales, downtime, stock) is opaque to
//! the access and numbering logic: the core persists and returns it but
//! never interprets it. Aggregation over the payload lives in
//! [`crate::domain::analytics`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{FactoryId, Username};

/// Per-product sales figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesFigures {
    /// Quantity sold, in the factory's SKU unit.
    pub amount: f64,
    /// Price per unit.
    pub unit_price: f64,
}

impl SalesFigures {
    /// Revenue contributed by this line.
    pub fn revenue(&self) -> f64 {
        self.amount * self.unit_price
    }
}

/// A persisted daily log record.
///
/// ## Invariants
/// - `(factory_id, date)` is unique across the collection.
/// - `id`, `created_by`, and `created_at` are immutable after creation.
/// - `report_id`, once assigned by the allocator, is never reassigned.
///   Legacy records may still carry `None` or a non-conforming raw value
///   until the backfill renumbers them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// Opaque primary key, independent of the report number.
    pub id: Uuid,
    /// Human-facing `RPT-NNNNN` label; raw so legacy values survive reads.
    pub report_id: Option<String>,
    pub factory_id: FactoryId,
    /// Business date the log covers.
    pub date: NaiveDate,
    /// Product name to quantity produced.
    pub production: BTreeMap<String, f64>,
    /// Product name to sales figures.
    pub sales: BTreeMap<String, SalesFigures>,
    pub downtime_hours: f64,
    pub downtime_reason: String,
    /// Product name to current stock level.
    pub stock: BTreeMap<String, f64>,
    pub created_by: Username,
    pub created_at: DateTime<Utc>,
}

impl DailyLog {
    /// Total quantity produced across all products.
    pub fn total_production(&self) -> f64 {
        self.production.values().sum()
    }

    /// Total quantity sold across all products.
    pub fn total_sales(&self) -> f64 {
        self.sales.values().map(|figures| figures.amount).sum()
    }

    /// Total revenue across all products.
    pub fn total_revenue(&self) -> f64 {
        self.sales.values().map(SalesFigures::revenue).sum()
    }

    /// Total stock on hand across all products.
    pub fn total_stock(&self) -> f64 {
        self.stock.values().sum()
    }

    /// Whether this record carries a conforming report identifier.
    pub fn has_conforming_report_id(&self) -> bool {
        self.report_id
            .as_deref()
            .is_some_and(|raw| super::ReportId::parse(raw).is_some())
    }
}

/// Payload for creating a new daily log.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLogDraft {
    pub factory_id: FactoryId,
    pub date: NaiveDate,
    pub production: BTreeMap<String, f64>,
    pub sales: BTreeMap<String, SalesFigures>,
    pub downtime_hours: f64,
    pub downtime_reason: String,
    pub stock: BTreeMap<String, f64>,
}

/// Partial update for an existing daily log.
///
/// Absent fields are left untouched. `id`, `report_id`, `created_by`, and
/// `created_at` have no counterpart here on purpose: they are immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLogUpdate {
    pub factory_id: Option<FactoryId>,
    pub date: Option<NaiveDate>,
    pub production: Option<BTreeMap<String, f64>>,
    pub sales: Option<BTreeMap<String, SalesFigures>>,
    pub downtime_hours: Option<f64>,
    pub downtime_reason: Option<String>,
    pub stock: Option<BTreeMap<String, f64>>,
}

impl DailyLogUpdate {
    /// Apply this patch to a record, returning the updated copy.
    pub fn apply_to(&self, log: &DailyLog) -> DailyLog {
        let mut updated = log.clone();
        if let Some(factory_id) = &self.factory_id {
            updated.factory_id = factory_id.clone();
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(production) = &self.production {
            updated.production = production.clone();
        }
        if let Some(sales) = &self.sales {
            updated.sales = sales.clone();
        }
        if let Some(hours) = self.downtime_hours {
            updated.downtime_hours = hours;
        }
        if let Some(reason) = &self.downtime_reason {
            updated.downtime_reason = reason.clone();
        }
        if let Some(stock) = &self.stock {
            updated.stock = stock.clone();
        }
        updated
    }
}
