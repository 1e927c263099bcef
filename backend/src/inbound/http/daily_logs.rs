//! Daily log API handlers.
//!
//! ```text
//! POST   /api/v1/daily-logs
//! GET    /api/v1/daily-logs?factoryId=&createdByMe=&startDate=&endDate=
//! GET    /api/v1/daily-logs/{id}
//! PUT    /api/v1/daily-logs/{id}
//! DELETE /api/v1/daily-logs/{id}
//! POST   /api/v1/admin/report-ids/renumber
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    DailyLog, DailyLogDraft, DailyLogUpdate, DateRange, Error, SalesFigures, ScopeRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, parse_factory_id};

/// Creation request body.
///
/// The payload maps (production, sales, stock) are keyed by product name
/// and passed through to storage uninterpreted.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRequest {
    pub factory_id: String,
    /// Business date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub production: BTreeMap<String, f64>,
    #[serde(default)]
    pub sales: BTreeMap<String, SalesFigures>,
    #[serde(default)]
    pub downtime_hours: f64,
    #[serde(default)]
    pub downtime_reason: String,
    #[serde(default)]
    pub stock: BTreeMap<String, f64>,
}

impl DailyLogRequest {
    fn into_draft(self) -> Result<DailyLogDraft, Error> {
        Ok(DailyLogDraft {
            factory_id: parse_factory_id(&self.factory_id, FieldName::new("factoryId"))?,
            date: parse_date(&self.date, FieldName::new("date"))?,
            production: self.production,
            sales: self.sales,
            downtime_hours: self.downtime_hours,
            downtime_reason: self.downtime_reason,
            stock: self.stock,
        })
    }
}

/// Partial update body; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogPatch {
    #[serde(default)]
    pub factory_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub production: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub sales: Option<BTreeMap<String, SalesFigures>>,
    #[serde(default)]
    pub downtime_hours: Option<f64>,
    #[serde(default)]
    pub downtime_reason: Option<String>,
    #[serde(default)]
    pub stock: Option<BTreeMap<String, f64>>,
}

impl DailyLogPatch {
    fn into_update(self) -> Result<DailyLogUpdate, Error> {
        Ok(DailyLogUpdate {
            factory_id: self
                .factory_id
                .as_deref()
                .map(|raw| parse_factory_id(raw, FieldName::new("factoryId")))
                .transpose()?,
            date: self
                .date
                .as_deref()
                .map(|raw| parse_date(raw, FieldName::new("date")))
                .transpose()?,
            production: self.production,
            sales: self.sales,
            downtime_hours: self.downtime_hours,
            downtime_reason: self.downtime_reason,
            stock: self.stock,
        })
    }
}

/// List filter query parameters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Requested factory; honoured only for headquarters callers.
    #[serde(default)]
    pub factory_id: Option<String>,
    /// Narrow to records the caller created.
    #[serde(default)]
    pub created_by_me: Option<bool>,
    /// Inclusive lower date bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive upper date bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ListQuery {
    pub(crate) fn into_scope_request(self) -> Result<ScopeRequest, Error> {
        Ok(ScopeRequest {
            factory_id: self
                .factory_id
                .as_deref()
                .map(|raw| parse_factory_id(raw, FieldName::new("factoryId")))
                .transpose()?,
            created_by_me: self.created_by_me.unwrap_or(false),
            date_range: DateRange {
                start: self
                    .start_date
                    .as_deref()
                    .map(|raw| parse_date(raw, FieldName::new("startDate")))
                    .transpose()?,
                end: self
                    .end_date
                    .as_deref()
                    .map(|raw| parse_date(raw, FieldName::new("endDate")))
                    .transpose()?,
            },
        })
    }
}

/// Renumbering backfill result.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenumberResponse {
    /// Records that actually received a fresh identifier.
    pub updated: u64,
}

/// Create a daily log. The report identifier is assigned server-side.
#[utoipa::path(
    post,
    path = "/api/v1/daily-logs",
    request_body = DailyLogRequest,
    responses(
        (status = 201, description = "Daily log created", body = DailyLog),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Access denied to this factory", body = Error),
        (status = 409, description = "Daily log for this date already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "createDailyLog"
)]
#[post("/daily-logs")]
pub async fn create_daily_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DailyLogRequest>,
) -> ApiResult<HttpResponse> {
    let principal = state.require_principal(&session).await?;
    let draft = payload.into_inner().into_draft()?;
    let log = state.logs.create(&principal, draft).await?;
    Ok(HttpResponse::Created().json(log))
}

/// List daily logs visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/daily-logs",
    params(ListQuery),
    responses(
        (status = 200, description = "Daily logs in scope", body = [DailyLog]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "listDailyLogs"
)]
#[get("/daily-logs")]
pub async fn list_daily_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<DailyLog>>> {
    let principal = state.require_principal(&session).await?;
    let request = query.into_inner().into_scope_request()?;
    let logs = state.logs.list(&principal, request).await?;
    Ok(web::Json(logs))
}

/// Fetch a single daily log.
#[utoipa::path(
    get,
    path = "/api/v1/daily-logs/{id}",
    params(("id" = Uuid, Path, description = "Daily log identifier")),
    responses(
        (status = 200, description = "Daily log", body = DailyLog),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Access denied to this factory", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "getDailyLog"
)]
#[get("/daily-logs/{id}")]
pub async fn get_daily_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<DailyLog>> {
    let principal = state.require_principal(&session).await?;
    let log = state.logs.get(&principal, id.into_inner()).await?;
    Ok(web::Json(log))
}

/// Update a daily log. Creator-only; the report identifier never changes.
#[utoipa::path(
    put,
    path = "/api/v1/daily-logs/{id}",
    params(("id" = Uuid, Path, description = "Daily log identifier")),
    request_body = DailyLogPatch,
    responses(
        (status = 200, description = "Updated daily log", body = DailyLog),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only the creator may modify", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Daily log for this date already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "updateDailyLog"
)]
#[put("/daily-logs/{id}")]
pub async fn update_daily_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<DailyLogPatch>,
) -> ApiResult<web::Json<DailyLog>> {
    let principal = state.require_principal(&session).await?;
    let update = payload.into_inner().into_update()?;
    let log = state
        .logs
        .update(&principal, id.into_inner(), update)
        .await?;
    Ok(web::Json(log))
}

/// Delete a daily log. Creator-only, same rule as update.
#[utoipa::path(
    delete,
    path = "/api/v1/daily-logs/{id}",
    params(("id" = Uuid, Path, description = "Daily log identifier")),
    responses(
        (status = 204, description = "Daily log deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only the creator may modify", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "deleteDailyLog"
)]
#[delete("/daily-logs/{id}")]
pub async fn delete_daily_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let principal = state.require_principal(&session).await?;
    state.logs.delete(&principal, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign fresh report identifiers to legacy records. Headquarters only.
#[utoipa::path(
    post,
    path = "/api/v1/admin/report-ids/renumber",
    responses(
        (status = 200, description = "Backfill result", body = RenumberResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Restricted to headquarters", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["daily-logs"],
    operation_id = "renumberReportIds"
)]
#[post("/admin/report-ids/renumber")]
pub async fn renumber_report_ids(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RenumberResponse>> {
    let principal = state.require_principal(&session).await?;
    let updated = state.logs.renumber_unconforming(&principal).await?;
    Ok(web::Json(RenumberResponse { updated }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::{Value, json};

    use super::*;
    use crate::inbound::http::accounts::{RegisterRequest, register};
    use crate::inbound::http::test_utils::{test_session_middleware, test_state};

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(create_daily_log)
                    .service(list_daily_logs)
                    .service(get_daily_log)
                    .service(update_daily_log)
                    .service(delete_daily_log)
                    .service(renumber_report_ids),
            )
    }

    /// Register an account; the returned cookie carries its session.
    async fn register_and_get_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        username: &str,
        role: &str,
        factory_id: Option<&str>,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(RegisterRequest {
                    username: username.into(),
                    email: format!("{username}@example.com"),
                    password: "hunter2hunter2".into(),
                    role: role.into(),
                    factory_id: factory_id.map(Into::into),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn log_request(date: &str) -> Value {
        json!({
            "factoryId": "wakene_food",
            "date": date,
            "production": { "Flour": 120.0 },
            "sales": { "Flour": { "amount": 100.0, "unitPrice": 2.5 } },
            "downtimeHours": 1.5,
            "downtimeReason": "boiler maintenance",
            "stock": { "Flour": 80.0 }
        })
    }

    #[actix_web::test]
    async fn creation_numbers_sequentially_from_the_floor() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let cookie =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;

        for (date, expected) in [("2025-08-01", "RPT-10000"), ("2025-08-02", "RPT-10001")] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/daily-logs")
                    .cookie(cookie.clone())
                    .set_json(log_request(date))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: Value = actix_test::read_body_json(res).await;
            assert_eq!(
                body.get("reportId").and_then(Value::as_str),
                Some(expected)
            );
        }
    }

    #[actix_web::test]
    async fn duplicate_date_conflicts() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let cookie =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/daily-logs")
                    .cookie(cookie.clone())
                    .set_json(log_request("2025-08-01"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn employee_cannot_create_for_another_factory() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let cookie =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("amen_water")).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/daily-logs")
                .cookie(cookie)
                .set_json(log_request("2025-08-01"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn headquarters_cannot_delete_someone_elses_record() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let alice =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;
        let hq = register_and_get_cookie(&app, "hq", "headquarters", None).await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/daily-logs")
                .cookie(alice)
                .set_json(log_request("2025-08-01"))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(created).await;
        let id = body.get("id").and_then(Value::as_str).expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/daily-logs/{id}"))
                .cookie(hq)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employee_list_ignores_requested_factory() {
        let state = web::Data::new(test_state());
        let app = actix_test::init_service(test_app(state.clone())).await;
        let alice =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;
        let bob =
            register_and_get_cookie(&app, "bob", "factory_employee", Some("amen_water")).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/daily-logs")
                .cookie(alice.clone())
                .set_json(log_request("2025-08-01"))
                .to_request(),
        )
        .await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/daily-logs")
                .cookie(bob)
                .set_json(json!({
                    "factoryId": "amen_water",
                    "date": "2025-08-01",
                    "production": { "1L Bottle": 500.0 }
                }))
                .to_request(),
        )
        .await;

        // Alice asks for amen_water; her scope stays pinned to wakene_food.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/daily-logs?factoryId=amen_water")
                .cookie(alice)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("factoryId").and_then(Value::as_str),
            Some("wakene_food")
        );
    }

    #[actix_web::test]
    async fn renumber_is_restricted_to_headquarters() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let cookie =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/report-ids/renumber")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn update_preserves_the_report_id() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let cookie =
            register_and_get_cookie(&app, "alice", "factory_employee", Some("wakene_food")).await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/daily-logs")
                .cookie(cookie.clone())
                .set_json(log_request("2025-08-01"))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(created).await;
        let id = body.get("id").and_then(Value::as_str).expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/daily-logs/{id}"))
                .cookie(cookie)
                .set_json(json!({ "downtimeHours": 4.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            updated.get("reportId").and_then(Value::as_str),
            Some("RPT-10000")
        );
        assert_eq!(
            updated.get("downtimeHours").and_then(Value::as_f64),
            Some(4.0)
        );
    }

    #[actix_web::test]
    async fn requests_without_a_session_are_unauthorised() {
        let app = actix_test::init_service(test_app(web::Data::new(test_state()))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/daily-logs")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
