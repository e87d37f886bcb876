//! Error types for Macrum.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use crate::model::EntityKind;
use crate::validate::ValidationErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Macrum operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,
    StorageError,

    // Not Found (exit 3)
    BusinessNotFound,
    ClientNotFound,
    ProjectNotFound,
    TaskNotFound,

    // Validation (exit 4)
    ValidationFailed,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::StorageError => "STORAGE_ERROR",
            Self::BusinessNotFound => "BUSINESS_NOT_FOUND",
            Self::ClientNotFound => "CLIENT_NOT_FOUND",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::DatabaseError
            | Self::StorageError => 2,
            Self::BusinessNotFound
            | Self::ClientNotFound
            | Self::ProjectNotFound
            | Self::TaskNotFound => 3,
            Self::ValidationFailed | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller should retry with corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed | Self::InvalidArgument | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Macrum operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `macrum init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("{} not found: {id}{}", kind.label(), did_you_mean(similar))]
    NotFound {
        kind: EntityKind,
        id: String,
        similar: Vec<String>,
    },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn did_you_mean(similar: &[String]) -> String {
    if similar.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", similar.join(", "))
    }
}

impl Error {
    /// Shorthand for a not-found error without suggestions.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
            similar: Vec::new(),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::NotFound { kind, .. } => match kind {
                EntityKind::Business => ErrorCode::BusinessNotFound,
                EntityKind::Client => ErrorCode::ClientNotFound,
                EntityKind::Project => ErrorCode::ProjectNotFound,
                EntityKind::Task => ErrorCode::TaskNotFound,
            },
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `macrum init` to create the database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::NotFound { kind, id, similar } => {
                if similar.is_empty() {
                    Some(format!(
                        "No {} with ID '{id}'. Use `macrum {} list` to see available records.",
                        kind.noun(),
                        kind.noun()
                    ))
                } else {
                    Some(format!("Did you mean: {}?", similar.join(", ")))
                }
            }

            Self::Validation(errors) => {
                let mut hint = String::from("Fix the following fields:");
                for e in errors.iter() {
                    hint.push_str(&format!("\n    {}: {}", e.field, e.message));
                }
                Some(hint)
            }

            Self::InvalidArgument(msg) => {
                if msg.contains("sort field") || msg.contains("bucket") {
                    None
                } else if msg.contains("priority") {
                    Some("Valid priorities: low, medium, high".to_string())
                } else if msg.contains("project status") {
                    Some(
                        "Valid statuses: planning, in-progress, on-hold, completed. \
                         Synonyms: active→in-progress, paused→on-hold, done→completed"
                            .to_string(),
                    )
                } else if msg.contains("task status") {
                    Some(
                        "Valid statuses: todo, in-progress, completed. \
                         Synonyms: open→todo, wip→in-progress, done→completed"
                            .to_string(),
                    )
                } else if msg.contains("client status") {
                    Some("Valid statuses: active, inactive, prospect".to_string())
                } else {
                    None
                }
            }

            Self::Database(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Self::Validation(errors) = self {
            obj["error"]["fields"] = serde_json::to_value(errors).unwrap_or_default();
        }

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::FieldError;

    #[test]
    fn test_not_found_message_and_code() {
        let err = Error::not_found(EntityKind::Project, "prj_123");
        assert_eq!(err.to_string(), "Project not found: prj_123");
        assert_eq!(err.error_code(), ErrorCode::ProjectNotFound);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_not_found_with_suggestions() {
        let err = Error::NotFound {
            kind: EntityKind::Task,
            id: "tsk_abd".to_string(),
            similar: vec!["tsk_abc".to_string()],
        };
        assert_eq!(err.to_string(), "Task not found: tsk_abd (did you mean: tsk_abc?)");
        assert_eq!(err.hint().as_deref(), Some("Did you mean: tsk_abc?"));
    }

    #[test]
    fn test_validation_structured_json() {
        let err = Error::Validation(ValidationErrors::from(vec![FieldError::new(
            "email",
            "Email is invalid",
        )]));
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["exit_code"], 4);
        assert_eq!(json["error"]["retryable"], true);
        assert_eq!(json["error"]["fields"][0]["field"], "email");
    }

    #[test]
    fn test_invalid_argument_hint() {
        let err = Error::InvalidArgument("unknown priority 'urgentish'".to_string());
        assert!(err.hint().unwrap().contains("low, medium, high"));
    }
}
