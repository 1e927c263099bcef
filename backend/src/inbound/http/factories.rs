//! Factory catalog API handlers.
//!
//! ```text
//! GET /api/v1/factories
//! ```

use actix_web::{get, web};
use serde::Serialize;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// A catalog entry as exposed to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryResponse {
    pub id: String,
    pub name: String,
    pub products: Vec<String>,
    pub sku_unit: String,
}

/// List the configured factories.
#[utoipa::path(
    get,
    path = "/api/v1/factories",
    responses(
        (status = 200, description = "Configured factories", body = [FactoryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["factories"],
    operation_id = "listFactories"
)]
#[get("/factories")]
pub async fn list_factories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<FactoryResponse>>> {
    state.require_principal(&session).await?;
    let factories = state
        .catalog()
        .iter()
        .map(|(factory_id, profile)| FactoryResponse {
            id: factory_id.to_string(),
            name: profile.name.clone(),
            products: profile.products.clone(),
            sku_unit: profile.sku_unit.clone(),
        })
        .collect();
    Ok(web::Json(factories))
}
