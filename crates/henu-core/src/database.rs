//! Database URL scheme detection.

/// Database type enum for query selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// PostgreSQL database.
    PostgreSQL,
    /// MySQL/MariaDB database.
    MySQL,
    /// SQLite database.
    SQLite,
}

impl DatabaseType {
    /// Detect database type from URL.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if url.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Pick the query text written for this database.
    ///
    /// PostgreSQL uses `$n` placeholders; MySQL and SQLite share `?`.
    #[inline]
    pub fn pick(self, pg: &'static str, other: &'static str) -> &'static str {
        match self {
            Self::PostgreSQL => pg,
            Self::MySQL | Self::SQLite => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_detection() {
        assert_eq!(
            DatabaseType::from_url("postgres://localhost/db"),
            Some(DatabaseType::PostgreSQL)
        );
        assert_eq!(
            DatabaseType::from_url("postgresql://localhost/db"),
            Some(DatabaseType::PostgreSQL)
        );
        assert_eq!(
            DatabaseType::from_url("mariadb://localhost/db"),
            Some(DatabaseType::MySQL)
        );
        assert_eq!(
            DatabaseType::from_url("sqlite::memory:"),
            Some(DatabaseType::SQLite)
        );
        assert_eq!(DatabaseType::from_url("redis://localhost"), None);
    }

    #[test]
    fn test_pick() {
        assert_eq!(DatabaseType::PostgreSQL.pick("pg", "other"), "pg");
        assert_eq!(DatabaseType::SQLite.pick("pg", "other"), "other");
        assert_eq!(DatabaseType::MySQL.pick("pg", "other"), "other");
    }
}
