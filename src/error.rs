//! Error types for the pool manager.
//!
//! All errors are defined with `thiserror`. Inside the crate they travel as
//! [`DbError`]; at the executor boundary they are flattened to the driver's
//! message text with [`DbError::message`].

use thiserror::Error;

/// Numeric error codes shared with the HTTP layer.
pub mod codes {
    /// A system-level failure (runtime, worker crash).
    pub const SYSTEM_EXCEPTIONS: u32 = 1000;
    /// A general server failure.
    pub const GENERAL_EXCEPTIONS: u32 = 1001;
    /// The operation cannot be handled with the given input.
    pub const INVALID_OPERATION: u32 = 1002;
    /// Any failure reported by the database or its driver.
    pub const DATABASE_EXCEPTION: u32 = 2000;
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timeout: {operation}: {message}")]
    Timeout { operation: String, message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The underlying message text, without the category prefix.
    ///
    /// This is the only part of an error that reaches `execute` and
    /// `execute_async` callers.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message }
            | Self::Connection { message, .. }
            | Self::Database { message, .. }
            | Self::Timeout { message, .. }
            | Self::Decode { message }
            | Self::Internal { message } => message,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Numeric error code, see [`codes`].
    pub fn code(&self) -> u32 {
        match self {
            Self::Configuration { .. } => codes::INVALID_OPERATION,
            Self::Connection { .. } | Self::Database { .. } | Self::Timeout { .. } => {
                codes::DATABASE_EXCEPTION
            }
            Self::Decode { .. } => codes::GENERAL_EXCEPTIONS,
            Self::Internal { .. } => codes::SYSTEM_EXCEPTIONS,
        }
    }
}

/// Convert sqlx errors to DbError, keeping the driver's message text.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::PoolTimedOut => {
                DbError::timeout("connection pool acquire", sqlx::Error::PoolTimedOut.to_string())
            }
            sqlx::Error::PoolClosed => DbError::connection(
                sqlx::Error::PoolClosed.to_string(),
                "The pool was deleted or destroyed; request it again",
            ),
            sqlx::Error::Io(io_err) => DbError::connection(
                io_err.to_string(),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                tls_err.to_string(),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => {
                DbError::connection(msg, "Check database server compatibility")
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::decode(format!("column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::decode(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::decode(source.to_string()),
            sqlx::Error::WorkerCrashed => DbError::internal("database worker crashed"),
            other => DbError::internal(other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
