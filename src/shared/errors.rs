use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the backing JSON document.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Dataset top level must be a JSON object mapping resource names to values")]
    NotAnObject,
}

/// Failures while loading the TOML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by the resource router. Pagination input never ends up here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource '{0}' does not exist")]
    UnknownResource(String),

    #[error("{resource} with id={id} not found")]
    NotFound { resource: String, id: String },

    #[error("{resource} with id={id} already exists")]
    Conflict { resource: String, id: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Method {method} is not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },
}

impl ApiError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
