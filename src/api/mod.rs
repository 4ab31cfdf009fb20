use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    response::Html,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{AdminDirectory, SessionIssuer};
use crate::config::Config;
use crate::db::Store;
use crate::services::ImageHost;
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod events;
mod observability;
mod posts;
mod sitemap;
mod system;
mod types;
mod uploads;
mod validation;

pub use error::ApiError;
pub use types::*;

pub use events::NotificationEvent;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn directory(&self) -> &AdminDirectory {
        &self.shared.directory
    }

    #[must_use]
    pub fn session_issuer(&self) -> &SessionIssuer {
        &self.shared.session_issuer
    }

    #[must_use]
    pub fn image_host(&self) -> &Arc<dyn ImageHost> {
        &self.shared.image_host
    }

    #[must_use]
    pub fn event_bus(&self) -> &broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.shared.config.server.secure_cookies
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.shared.config.server.login_path
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.shared.config.server.public_url
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.shared.config.uploads.max_upload_mb as usize * 1024 * 1024
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/featured", get(posts::featured_posts))
        .route("/posts/{slug}", get(posts::get_post_by_slug))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .merge(events::router())
        .nest("/dashboard", protected_router(state.clone()));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/sitemap.xml", get(sitemap::sitemap))
        .nest("/dashboard", dashboard_pages(state.clone()))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state)
}

fn protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Multipart bodies carry the image plus form framing; give them a little
    // headroom over the configured image limit.
    let body_limit = state.max_upload_bytes() + 1024 * 1024;

    Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/uploads", post(uploads::upload_image))
        .route("/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}

/// The page shell the dashboard SPA mounts on. Everything under the prefix
/// sits behind the same gate as the dashboard API.
fn dashboard_pages(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .fallback(dashboard_shell)
        .layer(middleware::from_fn_with_state(state, auth::require_admin))
}

async fn dashboard_shell() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>inkroll dashboard</title></head>\
         <body><div id=\"root\"></div></body></html>",
    )
}
