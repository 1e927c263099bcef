//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::UserRepository;
use crate::domain::{Account, Role, Username};
use crate::inbound::http::accounts::{current_account, login, logout, register};
use crate::inbound::http::analytics::{get_dashboard_summary, get_factory_comparison, get_trends};
use crate::inbound::http::daily_logs::{
    create_daily_log, delete_daily_log, get_daily_log, list_daily_logs, renumber_report_ids,
    update_daily_log,
};
use crate::inbound::http::export::export_daily_logs;
use crate::inbound::http::factories::list_factories;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(8)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_account)
        .service(create_daily_log)
        .service(list_daily_logs)
        .service(get_daily_log)
        .service(update_daily_log)
        .service(delete_daily_log)
        .service(renumber_report_ids)
        .service(get_dashboard_summary)
        .service(get_trends)
        .service(get_factory_comparison)
        .service(export_daily_logs)
        .service(list_factories);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Default administrator credentials seeded into an empty user store.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Seed a headquarters administrator when no accounts exist yet.
///
/// Idempotent: a non-empty store is left untouched, so operator-created
/// accounts survive restarts.
pub async fn seed_default_admin(users: &Arc<dyn UserRepository>) -> std::io::Result<()> {
    let count = users
        .count()
        .await
        .map_err(|err| std::io::Error::other(format!("user store unavailable: {err}")))?;
    if count > 0 {
        return Ok(());
    }

    let username = Username::new(DEFAULT_ADMIN_USERNAME)
        .map_err(|err| std::io::Error::other(format!("invalid default username: {err}")))?;
    let password_hash = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)
        .map_err(|err| std::io::Error::other(format!("failed to hash default password: {err}")))?;
    let account = Account::try_new(
        username,
        "admin@example.com".into(),
        password_hash,
        Role::Headquarters,
        None,
    )
    .map_err(|err| std::io::Error::other(format!("invalid default account: {err}")))?;

    users
        .insert(&account)
        .await
        .map_err(|err| std::io::Error::other(format!("failed to seed default admin: {err}")))?;
    warn!("seeded default admin account; change its password before exposing the service");
    Ok(())
}

/// Construct an Actix HTTP server over the provided state.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    info!(addr = %bind_addr, "server listening");
    Ok(server)
}
