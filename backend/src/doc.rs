//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API:
//! every HTTP endpoint, the shared error envelope, and the session
//! cookie security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::analytics::{DashboardSummary, FactoryComparison, FactorySummary, TrendSeries};
use crate::domain::{DailyLog, Error, ErrorCode, SalesFigures};
use crate::inbound::http::accounts::{AccountResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::daily_logs::{DailyLogPatch, DailyLogRequest, RenumberResponse};
use crate::inbound::http::factories::FactoryResponse;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Factory operations reporting API",
        description = "Session-authenticated daily production logs with \
            sequential report numbering, role-scoped queries, dashboards, \
            and CSV export."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::current_account,
        crate::inbound::http::daily_logs::create_daily_log,
        crate::inbound::http::daily_logs::list_daily_logs,
        crate::inbound::http::daily_logs::get_daily_log,
        crate::inbound::http::daily_logs::update_daily_log,
        crate::inbound::http::daily_logs::delete_daily_log,
        crate::inbound::http::daily_logs::renumber_report_ids,
        crate::inbound::http::analytics::get_dashboard_summary,
        crate::inbound::http::analytics::get_trends,
        crate::inbound::http::analytics::get_factory_comparison,
        crate::inbound::http::export::export_daily_logs,
        crate::inbound::http::factories::list_factories,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        DailyLog,
        SalesFigures,
        DailyLogRequest,
        DailyLogPatch,
        RenumberResponse,
        RegisterRequest,
        LoginRequest,
        AccountResponse,
        DashboardSummary,
        FactorySummary,
        TrendSeries,
        FactoryComparison,
        FactoryResponse,
    )),
    tags(
        (name = "auth", description = "Account registration and sessions"),
        (name = "daily-logs", description = "Daily log CRUD and report numbering"),
        (name = "analytics", description = "Dashboards and trends"),
        (name = "export", description = "Spreadsheet export"),
        (name = "factories", description = "Factory catalog"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
