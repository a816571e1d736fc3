//! Unified error type for the homelab bot.
//!
//! Core modules return [`Result`] and never log-and-swallow; the bot layer decides
//! whether a failure becomes a user-facing message or a log line.

use crate::core::encryption::EncryptionError;
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Any failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// User supplied input that failed validation
    #[error("{message}")]
    Validation {
        /// Human-readable explanation, shown to the user as-is
        message: String,
    },

    /// No project with this name exists in the guild
    #[error("Project not found: {name}")]
    ProjectNotFound {
        /// Name that was looked up
        name: String,
    },

    /// No task with this ID exists
    #[error("Task not found: #{id}")]
    TaskNotFound {
        /// Task ID that was looked up
        id: i64,
    },

    /// The dashboard has not been created for this guild
    #[error("Dashboard not found: {kind}")]
    DashboardNotFound {
        /// Dashboard kind that was looked up
        kind: String,
    },

    /// No alert with this ID exists
    #[error("Alert not found: #{id}")]
    AlertNotFound {
        /// Alert ID that was looked up
        id: i64,
    },

    /// The user has no active session
    #[error("No active session for user {user_id}")]
    SessionNotFound {
        /// Discord user ID
        user_id: String,
    },

    /// An OS tool could not be run or produced unparseable output
    #[error("Collector error: {message}")]
    Collector {
        /// What went wrong
        message: String,
    },

    /// Creating a Discord channel or category failed
    #[error("Provisioning error: {message}")]
    Provisioning {
        /// What went wrong
        message: String,
    },

    /// Token encryption or decryption failed
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// Filesystem or process I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a `String` buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Numeric conversion overflowed
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error was caused by the user rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::ProjectNotFound { .. }
                | Self::TaskNotFound { .. }
                | Self::DashboardNotFound { .. }
                | Self::AlertNotFound { .. }
                | Self::SessionNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = Error::validation("Project name cannot be empty");
        assert_eq!(err.to_string(), "Project name cannot be empty");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_database_error_is_not_user_error() {
        let err: Error = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(!err.is_user_error());
        assert!(err.to_string().starts_with("Database error"));
    }
}
