//! Backend kinds.

use serde::{Deserialize, Serialize};

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSQL,
    /// Includes MariaDB
    MySQL,
    SQLite,
}

/// URL scheme prefixes accepted for each backend, matched case-insensitively.
const SCHEMES: &[(&str, DatabaseType)] = &[
    ("postgres://", DatabaseType::PostgreSQL),
    ("postgresql://", DatabaseType::PostgreSQL),
    ("mysql://", DatabaseType::MySQL),
    ("mariadb://", DatabaseType::MySQL),
    ("sqlite:", DatabaseType::SQLite),
];

impl DatabaseType {
    /// Detect the backend from a base URL's scheme.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        SCHEMES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))
            .map(|(_, db_type)| *db_type)
    }

    /// SQLite keeps one file (or memory database) per pool and defaults to a
    /// single connection.
    pub fn is_sqlite(&self) -> bool {
        matches!(self, Self::SQLite)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_connection_string() {
        assert_eq!(
            DatabaseType::from_connection_string("postgresql://localhost"),
            Some(DatabaseType::PostgreSQL)
        );
        assert_eq!(
            DatabaseType::from_connection_string("MariaDB://localhost"),
            Some(DatabaseType::MySQL)
        );
        assert_eq!(
            DatabaseType::from_connection_string("sqlite::memory:"),
            Some(DatabaseType::SQLite)
        );
        assert_eq!(DatabaseType::from_connection_string("redis://localhost"), None);
    }

    #[test]
    fn test_display_and_serde_names() {
        assert_eq!(DatabaseType::MySQL.to_string(), "MySQL");
        assert!(DatabaseType::SQLite.is_sqlite());
        assert!(!DatabaseType::MySQL.is_sqlite());
        assert_eq!(
            serde_json::to_string(&DatabaseType::PostgreSQL).unwrap(),
            "\"postgresql\""
        );
    }
}
