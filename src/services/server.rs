use anyhow::{Context, Result};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::notifications::NotificationCounter;
use super::refresh::RefreshScheduler;
use super::remote::{ChangeFeed, RemoteStore};
use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::cache::{FileStore, KeyValueStore};
use crate::config::settings::AppConfig;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let feed = ChangeFeed::new();
        let remote = RemoteStore::connect(&self.config.store, feed.clone())?;
        let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&self.config.store.local_dir)?);

        let state = Arc::new(AppState::new(self.config.clone(), remote.clone(), local)?);
        if !state.reports.has_credentials() {
            warn!("SCOUT_AI_API_KEY is not set, report requests will ask for credentials");
        }

        let counter = NotificationCounter::new(state.dashboard.clone(), state.watchlist.clone());
        counter.recount();
        counter.spawn(feed.subscribe());

        RefreshScheduler::new(
            state.dashboard.clone(),
            remote,
            state.watchlist.clone(),
            self.config.refresh.interval,
        )
        .spawn();

        let app = create_router(state).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
