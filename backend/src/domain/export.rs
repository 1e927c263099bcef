//! Spreadsheet export rows.
//!
//! The export surface is a typed-row contract: the domain flattens a
//! scoped record set into one row per log and product plus a per-factory
//! rollup, and the inbound adapter decides the wire format. Visual
//! styling is deliberately out of scope.

use chrono::NaiveDate;
use serde::Serialize;

use super::{DailyLog, FactoryCatalog};

/// One spreadsheet row: a single product on a single day at one factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub date: NaiveDate,
    pub factory: String,
    pub sku_unit: String,
    pub product: String,
    pub production_amount: f64,
    pub sales_amount: f64,
    pub unit_price: f64,
    pub revenue: f64,
    pub current_stock: f64,
    pub downtime_hours: f64,
    pub downtime_reason: String,
    pub created_by: String,
}

/// Per-factory rollup appended after the detail rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryRollup {
    pub factory: String,
    pub total_production: f64,
    pub total_sales: f64,
    pub total_revenue: f64,
    pub total_downtime: f64,
    pub average_stock: f64,
    pub record_count: usize,
}

/// Flatten logs into detail rows, one per `(log, produced product)`.
pub fn export_rows(logs: &[DailyLog], catalog: &FactoryCatalog) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for log in logs {
        let factory = catalog.display_name(&log.factory_id);
        let sku_unit = catalog.sku_unit(&log.factory_id);
        for (product, amount) in &log.production {
            let figures = log.sales.get(product).copied().unwrap_or_default();
            rows.push(ExportRow {
                date: log.date,
                factory: factory.clone(),
                sku_unit: sku_unit.clone(),
                product: product.clone(),
                production_amount: *amount,
                sales_amount: figures.amount,
                unit_price: figures.unit_price,
                revenue: figures.revenue(),
                current_stock: log.stock.get(product).copied().unwrap_or(0.0),
                downtime_hours: log.downtime_hours,
                downtime_reason: log.downtime_reason.clone(),
                created_by: log.created_by.to_string(),
            });
        }
    }
    rows
}

/// Roll up totals per catalog factory, skipping factories with no records.
pub fn factory_rollups(logs: &[DailyLog], catalog: &FactoryCatalog) -> Vec<FactoryRollup> {
    let mut rollups = Vec::new();
    for (factory_id, profile) in catalog.iter() {
        let records: Vec<&DailyLog> = logs
            .iter()
            .filter(|log| &log.factory_id == factory_id)
            .collect();
        if records.is_empty() {
            continue;
        }
        let total_stock: f64 = records.iter().map(|log| log.total_stock()).sum();
        #[allow(
            clippy::cast_precision_loss,
            reason = "record counts are far below 2^52"
        )]
        let average_stock = total_stock / records.len() as f64;
        rollups.push(FactoryRollup {
            factory: profile.name.clone(),
            total_production: records.iter().map(|log| log.total_production()).sum(),
            total_sales: records.iter().map(|log| log.total_sales()).sum(),
            total_revenue: records.iter().map(|log| log.total_revenue()).sum(),
            total_downtime: records.iter().map(|log| log.downtime_hours).sum(),
            average_stock,
            record_count: records.len(),
        });
    }
    rollups
}
