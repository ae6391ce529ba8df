// src/error.rs
//! Application error types with structured error handling.
//!
//! Remote failures, local store failures and validation failures are kept
//! apart so the reconciliation engine can tell a missing remote row (a
//! per-record note) from anything that must abort the run.

use crate::types::{EntityId, NotionId, ValidationError};
use std::fmt;
use thiserror::Error;

/// What a remote lookup was keyed by when it came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteKey {
    Ref(EntityId),
    Notion(NotionId),
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref(id) => write!(f, "ref id {}", id),
            Self::Notion(id) => write!(f, "notion id {}", id),
        }
    }
}

/// Failures of the remote (Notion) store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotionStoreError {
    #[error("Notion {entity} with {key} does not exist")]
    EntityNotFound { entity: &'static str, key: RemoteKey },

    #[error("Notion API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP transport error: {message}")]
    Transport { message: String },
}

impl NotionStoreError {
    pub fn not_found(entity: &'static str, key: RemoteKey) -> Self {
        Self::EntityNotFound { entity, key }
    }

    /// Missing rows are expected during reconciliation; everything else
    /// aborts the run.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::EntityNotFound { .. } => true,
            Self::Api { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Failures of the local store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} with id {id} does not exist")]
    EntityNotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::EntityNotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Top-level error of a sync or service run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Notion(#[from] NotionStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Whether the failure is a remote row that was not there.
    pub fn is_remote_not_found(&self) -> bool {
        matches!(self, AppError::Notion(e) if e.is_not_found())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: format!("{:#}", err),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError {
            message: "JSON serialization failed".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        let missing = NotionStoreError::not_found("inbox task", RemoteKey::Ref(EntityId::new(3)));
        assert!(missing.is_not_found());

        let api_missing = NotionStoreError::Api {
            status: 404,
            message: "gone".to_string(),
        };
        assert!(api_missing.is_not_found());

        let throttled = NotionStoreError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(!throttled.is_not_found());
        assert_eq!(throttled.to_string(), "Notion API returned HTTP 429: slow down");

        let app: AppError = missing.into();
        assert!(app.is_remote_not_found());
        let app: AppError = StoreError::not_found("big plan", 9).into();
        assert!(!app.is_remote_not_found());
    }

    #[test]
    fn error_messages_name_the_record() {
        let err = NotionStoreError::not_found("big plan", RemoteKey::Ref(EntityId::new(12)));
        assert_eq!(err.to_string(), "Notion big plan with ref id 12 does not exist");
        let err = StoreError::not_found("metric", "weight");
        assert_eq!(err.to_string(), "metric with id weight does not exist");
    }
}
