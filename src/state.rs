use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::warn;

use crate::api::NotificationEvent;
use crate::auth::{AdminDirectory, LoginRateLimiter, SessionIssuer};
use crate::clients::cloudinary::CloudinaryClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::ImageHost;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across HTTP-backed services to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Inkroll/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything constructed once at process start and shared by every request
/// handler. The rate limiter lives here rather than in a module-level
/// static; restarting the process empties it by design.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub directory: Arc<AdminDirectory>,

    pub rate_limiter: Arc<LoginRateLimiter>,

    pub session_issuer: Arc<SessionIssuer>,

    pub image_host: Arc<dyn ImageHost>,

    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        if config.auth.admins.is_empty() {
            warn!("No admin accounts configured; dashboard login will refuse everyone");
        }

        let directory = Arc::new(AdminDirectory::new(config.auth.admins.clone()));
        let rate_limiter = Arc::new(LoginRateLimiter::new(
            config.auth.throttle.max_attempts,
            Duration::from_secs(config.auth.throttle.window_seconds),
        ));
        let session_issuer = Arc::new(SessionIssuer::new(
            Arc::clone(&directory),
            Arc::clone(&rate_limiter),
        ));

        let http_client =
            build_shared_http_client(config.uploads.request_timeout_seconds.into())?;
        let image_host: Arc<dyn ImageHost> = Arc::new(CloudinaryClient::with_shared_client(
            &config.uploads,
            http_client,
        ));

        Ok(Self {
            config,
            store,
            directory,
            rate_limiter,
            session_issuer,
            image_host,
            event_bus,
        })
    }

    /// Swap the image host behind the trait; integration tests use this to
    /// stub uploads without a network.
    #[must_use]
    pub fn with_image_host(mut self, image_host: Arc<dyn ImageHost>) -> Self {
        self.image_host = image_host;
        self
    }
}
