use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use shared::session::{SessionError, SessionSigner};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_session, trace_id};
use crate::routes::{accounts, auth, components, health, pages, queries, roles};
use crate::services::{CookieHelper, ProviderRegistry};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub providers: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionSigner>,
    pub cookies: CookieHelper,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        providers: ProviderRegistry,
    ) -> Result<Self, SessionError> {
        let sessions = SessionSigner::new(&config.auth.session_secret, config.auth.session_ttl_secs)?;
        let cookies = CookieHelper::new(&config.auth);
        Ok(Self {
            pool,
            config: Arc::new(config),
            providers: Arc::new(providers),
            sessions: Arc::new(sessions),
            cookies,
        })
    }
}

pub fn create_app(
    config: Config,
    pool: PgPool,
    providers: ProviderRegistry,
) -> Result<Router, SessionError> {
    let state = AppState::new(config, pool, providers)?;
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        // Development: any origin, no credentials
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    };

    // Record routes require a session; method filtering comes from the
    // method routers (unregistered methods get 405).
    let api_routes = Router::new()
        .route(
            "/api/v1/components",
            get(components::get_components)
                .post(components::create_component)
                .put(components::update_component),
        )
        .route(
            "/api/v1/components/:id",
            get(components::get_component).delete(components::delete_component),
        )
        .route("/api/v1/queries/execute", post(queries::execute_query))
        .route(
            "/api/v1/queries",
            get(queries::list_queries)
                .post(queries::create_query)
                .put(queries::update_query),
        )
        .route(
            "/api/v1/queries/:id",
            get(queries::get_query).delete(queries::delete_query),
        )
        .route(
            "/api/v1/pages",
            get(pages::list_pages)
                .post(pages::create_page)
                .put(pages::update_page),
        )
        .route(
            "/api/v1/pages/:id",
            get(pages::get_page).delete(pages::delete_page),
        )
        .route(
            "/api/v1/accounts",
            get(accounts::list_accounts)
                .post(accounts::create_account)
                .put(accounts::update_account),
        )
        .route(
            "/api/v1/accounts/:id",
            get(accounts::get_account).delete(accounts::delete_account),
        )
        .route("/api/v1/roles", get(roles::list_roles))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    // OAuth login flow (GET only, no session required)
    let auth_routes = Router::new()
        .route("/login", get(auth::login))
        .route("/auth/:provider", get(auth::initiate_auth))
        .route("/auth/:provider/callback", get(auth::auth_callback))
        .route("/logout", get(auth::logout))
        .route("/profile", get(auth::profile));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let router = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(router)
}
