use axum::{middleware, routing::get, Router};
use sqlx::PgPool;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use super::academics::academic_routes;
use super::accounts::account_routes;
use super::fitness::fitness_routes;
use super::health::health_check;
use super::human_resources::human_resources_routes;
use super::locations::location_routes;
use super::pages::page_routes;
use crate::auth::{cors_layer, jwt_auth_middleware, security_headers_layer, AuthService};
use crate::config::AppConfig;
use crate::services::{
    AcademicService, AccountService, DashboardService, DocumentStore, FitnessService,
    HumanResourcesService, LocationService,
};

/// The served application: routes plus trailing-slash normalization
pub type App = NormalizePath<Router>;

pub fn create_app(db: PgPool, fitness_db: PgPool, config: &AppConfig) -> App {
    NormalizePathLayer::trim_trailing_slash().layer(create_routes(db, fitness_db, config))
}

pub fn create_routes(db: PgPool, fitness_db: PgPool, config: &AppConfig) -> Router {
    let auth_service = AuthService::new(db.clone(), &config.jwt_secret, config.session_ttl_hours);
    let accounts = AccountService::new(db.clone());
    let fitness = FitnessService::new(DocumentStore::new(fitness_db));
    let dashboard = DashboardService::new(accounts.clone(), fitness.clone());

    let authenticated = |router: Router| {
        router.route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            jwt_auth_middleware,
        ))
    };

    let api = Router::new()
        .nest("/locations", authenticated(location_routes(LocationService::new(db.clone()))))
        .nest(
            "/human-resources",
            authenticated(human_resources_routes(HumanResourcesService::new(db.clone()))),
        )
        .nest("/accounts", account_routes(accounts.clone(), auth_service.clone()))
        .nest("/academics", authenticated(academic_routes(AcademicService::new(db))))
        .nest("/fitness", authenticated(fitness_routes(fitness.clone())))
        .layer(cors_layer());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .merge(page_routes(auth_service.clone(), accounts, fitness, dashboard))
        .layer(security_headers_layer())
        .layer(TraceLayer::new_for_http())
}
