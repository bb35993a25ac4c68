//! The module contains the errors the engine can throw.
//!
//! All four business failures are typed so callers can react to each one
//! specifically:
//!
//! - [`KeyNotFound`] when a referenced pet, user or entry does not exist.
//! - [`InvalidArgument`] for malformed identifiers or deltas.
//! - [`InsufficientCredits`] when an operation would drive a balance negative.
//! - [`InvalidTransition`] when an attendance precondition is violated.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`InsufficientCredits`]: EngineError::InsufficientCredits
//!  [`InvalidTransition`]: EngineError::InvalidTransition
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientCredits(a), Self::InsufficientCredits(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
