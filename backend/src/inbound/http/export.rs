//! Spreadsheet export handler.
//!
//! ```text
//! GET /api/v1/export/daily-logs?factoryId=&startDate=&endDate=
//! ```
//!
//! Renders the caller's scoped record set as CSV: one detail row per
//! `(log, product)` followed by a per-factory summary section. The row
//! shape comes from [`crate::domain::export`]; this module only decides
//! the wire format.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;

use crate::domain::export::{ExportRow, FactoryRollup, export_rows, factory_rollups};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::daily_logs::ListQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const DETAIL_HEADER: &str = "Date,Factory,Product,SKU Unit,Production Amount,Sales Amount,\
Unit Price,Revenue,Current Stock,Downtime Hours,Downtime Reason,Created By";

const ROLLUP_HEADER: &str =
    "Factory,Total Production,Total Sales,Total Revenue,Total Downtime,Average Stock,Records";

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn detail_line(row: &ExportRow) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        row.date,
        csv_field(&row.factory),
        csv_field(&row.product),
        csv_field(&row.sku_unit),
        row.production_amount,
        row.sales_amount,
        row.unit_price,
        row.revenue,
        row.current_stock,
        row.downtime_hours,
        csv_field(&row.downtime_reason),
        csv_field(&row.created_by),
    )
}

fn rollup_line(rollup: &FactoryRollup) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        csv_field(&rollup.factory),
        rollup.total_production,
        rollup.total_sales,
        rollup.total_revenue,
        rollup.total_downtime,
        rollup.average_stock,
        rollup.record_count,
    )
}

fn render_csv(rows: &[ExportRow], rollups: &[FactoryRollup]) -> String {
    let mut out = String::from(DETAIL_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&detail_line(row));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(ROLLUP_HEADER);
    out.push('\n');
    for rollup in rollups {
        out.push_str(&rollup_line(rollup));
        out.push('\n');
    }
    out
}

/// Download the caller's scoped records as a CSV report.
#[utoipa::path(
    get,
    path = "/api/v1/export/daily-logs",
    params(ListQuery),
    responses(
        (status = 200, description = "CSV report", content_type = "text/csv"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No records to export", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["export"],
    operation_id = "exportDailyLogs"
)]
#[get("/export/daily-logs")]
pub async fn export_daily_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let principal = state.require_principal(&session).await?;
    let request = query.into_inner().into_scope_request()?;
    let logs = state.logs.list(&principal, request).await?;
    if logs.is_empty() {
        return Err(Error::not_found("no records to export"));
    }

    let rows = export_rows(&logs, state.catalog());
    let rollups = factory_rollups(&logs, state.catalog());
    let filename = format!("factory_report_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(render_csv(&rows, &rollups)))
}
