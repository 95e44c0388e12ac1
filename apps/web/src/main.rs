//! Formloom web composition root.

#![forbid(unsafe_code)]

mod demo;
mod error;
mod flash;
mod handlers;
mod state;
mod web_config;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use formloom_application::{ActionRouteMap, CrudService, LinkSource, PolicyEvaluator, RoutePlan};
use formloom_core::AppError;
use formloom_infrastructure::{
    InMemoryGatewayRegistry, InMemoryResourceGateway, StaticPolicyEvaluator,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tracing::info;

use crate::state::AppState;
use crate::web_config::{WebConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WebConfig::load()?;

    let people_gateway = Arc::new(InMemoryResourceGateway::new(demo::people_definition()?));
    let projects_gateway = Arc::new(InMemoryResourceGateway::new(demo::projects_definition()?));
    demo::seed(&people_gateway, &projects_gateway).await?;

    let link_source: Arc<dyn LinkSource> = Arc::new(
        InMemoryGatewayRegistry::new()
            .register(people_gateway.clone())
            .register(projects_gateway.clone()),
    );
    let policy: Arc<dyn PolicyEvaluator> = Arc::new(StaticPolicyEvaluator::allow_all());

    let people_service = Arc::new(CrudService::new(
        people_gateway,
        ActionRouteMap::default(),
        RoutePlan::new("/people")?,
        policy.clone(),
        link_source.clone(),
    ));
    let projects_service = Arc::new(
        CrudService::new(
            projects_gateway,
            ActionRouteMap::default(),
            RoutePlan::new("/projects")?,
            policy,
            link_source,
        )
        .with_child("people", people_service.clone()),
    );

    let mut services = BTreeMap::new();
    services.insert("people".to_owned(), people_service);
    services.insert("projects".to_owned(), projects_service);

    let app_state = AppState {
        services: Arc::new(services),
        site_title: config.site_title.clone(),
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/projects") }))
        .route(
            "/{resource}",
            get(handlers::index_handler).post(handlers::store_handler),
        )
        .route("/{resource}/create", get(handlers::create_handler))
        .route(
            "/{resource}/{id}",
            get(handlers::show_handler)
                .put(handlers::update_handler)
                .post(handlers::update_handler)
                .delete(handlers::destroy_handler),
        )
        .route("/{resource}/{id}/edit", get(handlers::edit_handler))
        .route(
            "/{resource}/{id}/delete",
            get(handlers::confirm_delete_handler),
        )
        .route("/{resource}/{id}/destroy", axum::routing::post(handlers::destroy_handler))
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "formloom-web listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("web server error: {error}")))
}
