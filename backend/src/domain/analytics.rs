//! Aggregation over scoped daily log sets.
//!
//! These are pure functions: handlers fetch the role-scoped record set
//! through the service and hand it here, so every dashboard figure is
//! automatically subject to the same access rules as a plain listing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{DailyLog, FactoryCatalog};

/// Planned output is assumed 20% above actual when computing efficiency.
const PLANNED_PRODUCTION_FACTOR: f64 = 1.2;

/// Totals for one factory on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactorySummary {
    pub name: String,
    pub production: f64,
    pub sales: f64,
    pub downtime: f64,
    pub stock: f64,
}

/// Dashboard headline figures plus a per-factory breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_production: f64,
    pub total_sales: f64,
    pub total_downtime: f64,
    pub total_stock: f64,
    pub factory_summaries: BTreeMap<String, FactorySummary>,
}

/// Compute the dashboard summary over an already-scoped record set.
pub fn dashboard_summary(logs: &[DailyLog], catalog: &FactoryCatalog) -> DashboardSummary {
    let mut summary = DashboardSummary {
        total_production: 0.0,
        total_sales: 0.0,
        total_downtime: 0.0,
        total_stock: 0.0,
        factory_summaries: BTreeMap::new(),
    };

    for log in logs {
        let production = log.total_production();
        let sales = log.total_sales();
        let stock = log.total_stock();

        summary.total_production += production;
        summary.total_sales += sales;
        summary.total_downtime += log.downtime_hours;
        summary.total_stock += stock;

        let entry = summary
            .factory_summaries
            .entry(log.factory_id.to_string())
            .or_insert_with(|| FactorySummary {
                name: catalog.display_name(&log.factory_id),
                production: 0.0,
                sales: 0.0,
                downtime: 0.0,
                stock: 0.0,
            });
        entry.production += production;
        entry.sales += sales;
        entry.downtime += log.downtime_hours;
        entry.stock += stock;
    }

    summary
}

/// Per-day series for trend charts, dates ascending.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub dates: Vec<NaiveDate>,
    pub production: Vec<f64>,
    pub sales: Vec<f64>,
    pub downtime: Vec<f64>,
    pub stock: Vec<f64>,
}

/// Group logs by business date and total each series per day.
pub fn trends(logs: &[DailyLog]) -> TrendSeries {
    #[derive(Default)]
    struct DayTotals {
        production: f64,
        sales: f64,
        downtime: f64,
        stock: f64,
    }

    let mut daily: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for log in logs {
        let totals = daily.entry(log.date).or_default();
        totals.production += log.total_production();
        totals.sales += log.total_sales();
        totals.downtime += log.downtime_hours;
        totals.stock += log.total_stock();
    }

    let mut series = TrendSeries {
        dates: Vec::with_capacity(daily.len()),
        production: Vec::with_capacity(daily.len()),
        sales: Vec::with_capacity(daily.len()),
        downtime: Vec::with_capacity(daily.len()),
        stock: Vec::with_capacity(daily.len()),
    };
    for (date, totals) in daily {
        series.dates.push(date);
        series.production.push(totals.production);
        series.sales.push(totals.sales);
        series.downtime.push(totals.downtime);
        series.stock.push(totals.stock);
    }
    series
}

/// Side-by-side factory figures for the headquarters comparison view.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryComparison {
    pub name: String,
    pub production: f64,
    pub sales: f64,
    pub revenue: f64,
    pub downtime: f64,
    /// Production as a percentage of a planned baseline 20% above actual.
    pub efficiency: f64,
}

/// Compare every catalog factory over the given record set.
///
/// Factories with no records in the window still appear, zeroed, so the
/// comparison chart keeps a stable shape.
pub fn factory_comparison(
    logs: &[DailyLog],
    catalog: &FactoryCatalog,
) -> BTreeMap<String, FactoryComparison> {
    let mut comparison = BTreeMap::new();
    for (factory_id, profile) in catalog.iter() {
        let mut entry = FactoryComparison {
            name: profile.name.clone(),
            production: 0.0,
            sales: 0.0,
            revenue: 0.0,
            downtime: 0.0,
            efficiency: 0.0,
        };
        for log in logs.iter().filter(|log| &log.factory_id == factory_id) {
            entry.production += log.total_production();
            entry.sales += log.total_sales();
            entry.revenue += log.total_revenue();
            entry.downtime += log.downtime_hours;
        }
        if entry.production > 0.0 {
            let planned = entry.production * PLANNED_PRODUCTION_FACTOR;
            entry.efficiency = entry.production / planned * 100.0;
        }
        comparison.insert(factory_id.to_string(), entry);
    }
    comparison
}
