use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::http::{build_router, AppState, RouterOptions};
use crate::usecase::services::collection_service::{CollectionService, SeedPolicy};
use crate::usecase::services::import_service::{ImportService, SeedOutcome};

/// Services wired to the store the config selects.
pub struct App {
    pub collection: Arc<CollectionService>,
    pub imports: ImportService,
}

impl App {
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store = config.build_store();
        store
            .init()
            .with_context(|| format!("failed to initialise {} store", store.backend_name()))?;
        info!(
            backend = store.backend_name(),
            db_path = %config.db_path.display(),
            key = %config.data_key,
            "store ready"
        );

        let seed = if config.seed_placeholder {
            SeedPolicy::Placeholder
        } else {
            SeedPolicy::Empty
        };
        let collection = Arc::new(CollectionService::new(store, seed));
        Ok(Self {
            imports: ImportService::new(collection.clone()),
            collection,
        })
    }

    /// Imports the configured seed file when the store holds no rows. Import problems
    /// are logged and the server starts anyway.
    pub fn seed_on_startup(&self, config: &ServerConfig) {
        let Some(path) = &config.seed_file else {
            return;
        };
        match self.imports.seed_from_file(path, false) {
            Ok(SeedOutcome::Imported { rows }) => info!(path = %path.display(), rows, "startup seed imported"),
            Ok(SeedOutcome::Skipped { existing_rows }) => {
                info!(path = %path.display(), existing_rows, "startup seed skipped")
            }
            Err(err) => warn!(path = %path.display(), error = %format!("{err:#}"), "startup seed failed"),
        }
    }

    pub fn router(&self, config: &ServerConfig) -> Router {
        build_router(
            AppState::new(self.collection.clone()),
            &RouterOptions {
                resource: config.resource.clone(),
                max_body_bytes: config.max_body_bytes,
            },
        )
    }
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let app = App::from_config(&config)?;
    app.seed_on_startup(&config);
    let router = app.router(&config);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        bind = %config.bind,
        resource = %config.resource,
        "transport-directory listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    info!("server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
