use thiserror::Error;

use crate::domain::Slot;

/// Failures surfaced to the person using the dashboard
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Remote store is not configured")]
    NotConfigured,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote store error: {0:#}")]
    Remote(#[from] anyhow::Error),

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },
}

impl AppError {
    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        AppError::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

/// Problems caught locally before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Slot {slot} already holds {capacity} candidates")]
    SlotFull { slot: Slot, capacity: usize },

    #[error("Attribute '{attribute}' must be between 1 and 5, got {value}")]
    InvalidRating { attribute: &'static str, value: u8 },

    #[error("A player needs one or two positions, got {0}")]
    InvalidPositions(usize),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account '{0}' is awaiting approval")]
    PendingApproval(String),

    #[error("Sign in first")]
    NotSignedIn,

    #[error("Only an admin may {0}")]
    AdminOnly(&'static str),
}
