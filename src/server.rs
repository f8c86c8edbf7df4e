//! Server runtime: tracing setup, dataset loading, and the HTTP listener
//! with graceful shutdown.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::ResourceStore;
use crate::config::AppConfig;
use crate::domain::Dataset;
use crate::interfaces::http::{create_router, AppState};
use crate::shared::{ServerError, ShutdownSignal};

pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Paths answered before the resource routes; a resource with one of these
/// names cannot be reached over HTTP.
pub const RESERVED_PATHS: &[&str] = &["health", "echo", "db"];

/// Resources in `dataset` hidden behind one of [`RESERVED_PATHS`].
pub fn shadowed_resources(dataset: &Dataset) -> Vec<&str> {
    dataset
        .resource_names()
        .into_iter()
        .filter(|name| RESERVED_PATHS.contains(name))
        .collect()
}

/// Load the dataset named in `config` and build the request state.
pub fn build_state(config: &AppConfig) -> Result<AppState, ServerError> {
    let dataset = Dataset::from_path(&config.dataset.path)?;
    info!(
        "Dataset loaded from {} ({} resources, collections: {})",
        config.dataset.path.display(),
        dataset.len(),
        dataset.collection_names().join(", ")
    );
    for name in shadowed_resources(&dataset) {
        warn!("Resource '{}' is shadowed by the built-in /{} route", name, name);
    }
    Ok(AppState::new(Arc::new(ResourceStore::new(dataset))))
}

/// Bind, log the available endpoints, and serve until `shutdown` fires.
pub async fn run(config: AppConfig, shutdown: ShutdownSignal) -> Result<(), ServerError> {
    let state = build_state(&config)?;
    let resources = state.store.resource_names().await;

    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    let local = listener.local_addr()?;

    info!("JSON server is running on http://{}", local);
    for name in &resources {
        info!("  GET    /{}", name);
    }
    info!("  Filter:   /books?genre=Роман");
    info!("  Expand:   /books?_expand=author");
    info!("  Paginate: /books?_page=1&_limit=5");
    info!("  Echo:     /echo?foo=bar");
    info!("  Database: /db");

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_dataset(contents: &str) -> PathBuf {
        let name = format!("library-api-{}.json", uuid::Uuid::new_v4());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn build_state_loads_dataset_file() {
        let path = write_dataset(r#"{"books": [{"id": 1}], "authors": []}"#);
        let mut config = AppConfig::default();
        config.dataset.path = path.clone();

        let state = build_state(&config).unwrap();
        assert_eq!(state.store.resource_names().await, vec!["books", "authors"]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn build_state_reports_bad_dataset() {
        let path = write_dataset("[1, 2]");
        let mut config = AppConfig::default();
        config.dataset.path = path.clone();

        assert!(matches!(
            build_state(&config),
            Err(ServerError::Dataset(crate::shared::DatasetError::NotAnObject))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn reserved_names_are_reported_as_shadowed() {
        let dataset = Dataset::parse(r#"{"health": [{"id": 1}], "books": [], "db": {}}"#).unwrap();
        assert_eq!(shadowed_resources(&dataset), vec!["health", "db"]);

        let clean = Dataset::parse(r#"{"books": [], "authors": []}"#).unwrap();
        assert!(shadowed_resources(&clean).is_empty());
    }
}
