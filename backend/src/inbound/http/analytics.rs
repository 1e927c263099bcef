//! Dashboard and analytics API handlers.
//!
//! ```text
//! GET /api/v1/dashboard/summary
//! GET /api/v1/analytics/trends?days=7
//! GET /api/v1/analytics/factory-comparison
//! ```
//!
//! Every figure is computed over the caller's role-scoped record set, so
//! a factory employee's dashboard only ever reflects their own factory.

use std::collections::BTreeMap;

use actix_web::{get, web};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::domain::analytics::{
    DashboardSummary, FactoryComparison, TrendSeries, dashboard_summary, factory_comparison,
    trends,
};
use crate::domain::{DateRange, Error, ScopeRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Days of history the dashboard summary covers.
const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Default trend window when the caller does not pass `days`.
const DEFAULT_TREND_DAYS: i64 = 7;

/// Upper bound on requested trend windows.
const MAX_TREND_DAYS: i64 = 365;

fn window_request(days: i64) -> ScopeRequest {
    let today = Utc::now().date_naive();
    ScopeRequest {
        date_range: DateRange {
            start: Some(today - Duration::days(days - 1)),
            end: Some(today),
        },
        ..ScopeRequest::default()
    }
}

/// Headline figures for the caller's dashboard, last 30 days.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["analytics"],
    operation_id = "dashboardSummary"
)]
#[get("/dashboard/summary")]
pub async fn get_dashboard_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardSummary>> {
    let principal = state.require_principal(&session).await?;
    let logs = state
        .logs
        .list(&principal, window_request(SUMMARY_WINDOW_DAYS))
        .await?;
    Ok(web::Json(dashboard_summary(&logs, state.catalog())))
}

/// Trend query parameters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    /// Days of history to chart, most recent first. Defaults to 7.
    #[serde(default)]
    pub days: Option<i64>,
}

/// Per-day production, sales, downtime, and stock series.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends",
    params(TrendQuery),
    responses(
        (status = 200, description = "Trend series", body = TrendSeries),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["analytics"],
    operation_id = "analyticsTrends"
)]
#[get("/analytics/trends")]
pub async fn get_trends(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TrendQuery>,
) -> ApiResult<web::Json<TrendSeries>> {
    let principal = state.require_principal(&session).await?;
    let days = query.days.unwrap_or(DEFAULT_TREND_DAYS);
    if !(1..=MAX_TREND_DAYS).contains(&days) {
        return Err(Error::invalid_request(format!(
            "days must be between 1 and {MAX_TREND_DAYS}"
        )));
    }
    let logs = state.logs.list(&principal, window_request(days)).await?;
    Ok(web::Json(trends(&logs)))
}

/// Side-by-side factory figures. Headquarters only.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/factory-comparison",
    responses(
        (status = 200, description = "Per-factory comparison", body = BTreeMap<String, FactoryComparison>),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Restricted to headquarters", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["analytics"],
    operation_id = "factoryComparison"
)]
#[get("/analytics/factory-comparison")]
pub async fn get_factory_comparison(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<BTreeMap<String, FactoryComparison>>> {
    let principal = state.require_principal(&session).await?;
    if !principal.is_headquarters() {
        return Err(Error::forbidden(
            "factory comparison is restricted to headquarters",
        ));
    }
    let logs = state
        .logs
        .list(&principal, window_request(SUMMARY_WINDOW_DAYS))
        .await?;
    Ok(web::Json(factory_comparison(&logs, state.catalog())))
}
