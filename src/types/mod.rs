use thiserror::Error;

mod domain_types;
mod ids;
mod time;

pub use domain_types::*;
pub use ids::*;
pub use time::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid id format: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid name '{value}': {reason}")]
    InvalidName { value: String, reason: String },

    #[error("Invalid key '{value}': {reason}")]
    InvalidKey { value: String, reason: String },

    #[error("Invalid {kind} value '{value}', expected one of: {expected}")]
    InvalidEnum {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid date or timestamp '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}
