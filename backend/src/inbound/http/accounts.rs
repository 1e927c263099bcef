//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"alice","email":"a@example.com","password":"...","role":"factory_employee","factoryId":"wakene_food"}
//! POST /api/v1/auth/login    {"username":"alice","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Account, Error, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_factory_id, parse_role, parse_username, require_non_empty,
};

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `factory_employee` or `headquarters`.
    pub role: String,
    /// Required for factory employees, rejected for headquarters.
    #[serde(default)]
    pub factory_id: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account representation returned to clients. Never carries the hash.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub factory_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.to_string(),
            email: account.email.clone(),
            role: account.role,
            factory_id: account
                .factory_id
                .as_ref()
                .map(|factory| factory.as_str().to_owned()),
            created_at: account.created_at,
        }
    }
}

fn hash_error(err: impl std::fmt::Display) -> Error {
    Error::internal(format!("password hashing failed: {err}"))
}

/// Build an account from a validated registration request.
fn account_from_request(state: &HttpState, payload: &RegisterRequest) -> Result<Account, Error> {
    let username = parse_username(&payload.username, FieldName::new("username"))?;
    require_non_empty(&payload.email, FieldName::new("email"))?;
    require_non_empty(&payload.password, FieldName::new("password"))?;
    let role = parse_role(&payload.role, FieldName::new("role"))?;
    let factory_id = payload
        .factory_id
        .as_deref()
        .map(|raw| parse_factory_id(raw, FieldName::new("factoryId")))
        .transpose()?;
    if let Some(factory) = &factory_id {
        if !state.catalog().contains(factory) {
            return Err(Error::invalid_request("unknown factory")
                .with_details(json!({ "factoryId": factory.as_str() })));
        }
    }

    let password_hash =
        bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(hash_error)?;
    Account::try_new(username, payload.email.clone(), password_hash, role, factory_id)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Register a new account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let account = account_from_request(&state, &payload)?;
    state
        .users
        .insert(&account)
        .await
        .map_err(HttpState::map_user_repo_error)?;
    session.persist_username(&account.username)?;
    Ok(HttpResponse::Created().json(AccountResponse::from(&account)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AccountResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    require_non_empty(&payload.username, FieldName::new("username"))?;
    require_non_empty(&payload.password, FieldName::new("password"))?;
    let username = parse_username(&payload.username, FieldName::new("username"))?;

    let account = state
        .users
        .find_by_username(&username)
        .await
        .map_err(HttpState::map_user_repo_error)?
        .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
    let matches = bcrypt::verify(&payload.password, &account.password_hash)
        .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
    if !matches {
        return Err(Error::unauthorized("invalid credentials"));
    }

    session.persist_username(&account.username)?;
    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentAccount"
)]
#[get("/auth/me")]
pub async fn current_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountResponse>> {
    let account = state.require_account(&session).await?;
    Ok(web::Json(AccountResponse::from(&account)))
}
