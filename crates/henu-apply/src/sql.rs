//! SQL application store.
//!
//! Shares the entitlement database pool. Skills are stored comma-joined.

use async_trait::async_trait;
use henu_core::DatabaseType;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use crate::application::{StoredApplication, TeamApplication};
use crate::error::ApplyError;
use crate::store::ApplicationStore;

const SCHEMA_PG_MYSQL: &str = r#"
CREATE TABLE IF NOT EXISTS henu_applications (
    id VARCHAR(36) PRIMARY KEY,
    name TEXT NOT NULL,
    phone VARCHAR(64) NOT NULL,
    email VARCHAR(320) NOT NULL,
    address TEXT NOT NULL,
    skills TEXT NOT NULL,
    photo_url TEXT NOT NULL,
    resume_url TEXT NOT NULL,
    submitted_at BIGINT NOT NULL
)
"#;

const SCHEMA_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS henu_applications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    address TEXT NOT NULL,
    skills TEXT NOT NULL,
    photo_url TEXT NOT NULL,
    resume_url TEXT NOT NULL,
    submitted_at INTEGER NOT NULL
)
"#;

const INSERT_PG: &str = r#"
INSERT INTO henu_applications (id, name, phone, email, address, skills, photo_url, resume_url, submitted_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const INSERT_MYSQL: &str = r#"
INSERT INTO henu_applications (id, name, phone, email, address, skills, photo_url, resume_url, submitted_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const LIST: &str = r#"
SELECT id, name, phone, email, address, skills, photo_url, resume_url, submitted_at
FROM henu_applications
ORDER BY submitted_at, id
"#;

/// Application store on an existing SQLx `Any` pool.
#[derive(Debug, Clone)]
pub struct SqlApplications {
    pool: AnyPool,
    db_type: DatabaseType,
}

impl SqlApplications {
    pub fn new(pool: AnyPool, db_type: DatabaseType) -> Self {
        Self { pool, db_type }
    }

    /// Create the table if it does not exist.
    pub async fn init_schema(&self) -> Result<(), ApplyError> {
        let schema = match self.db_type {
            DatabaseType::SQLite => SCHEMA_SQLITE,
            DatabaseType::PostgreSQL | DatabaseType::MySQL => SCHEMA_PG_MYSQL,
        };
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn parse_row(row: &AnyRow) -> Result<StoredApplication, ApplyError> {
    let skills: String = row.try_get("skills")?;
    Ok(StoredApplication {
        id: row.try_get("id")?,
        submitted_at: row.try_get("submitted_at")?,
        application: TeamApplication {
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            skills: skills
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            photo_url: row.try_get("photo_url")?,
            resume_url: row.try_get("resume_url")?,
        },
    })
}

#[async_trait]
impl ApplicationStore for SqlApplications {
    async fn save(
        &self,
        application: &TeamApplication,
        submitted_at: i64,
    ) -> Result<String, ApplyError> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(self.db_type.pick(INSERT_PG, INSERT_MYSQL))
            .bind(&id)
            .bind(&application.name)
            .bind(&application.phone)
            .bind(&application.email)
            .bind(&application.address)
            .bind(application.skills_joined())
            .bind(&application.photo_url)
            .bind(&application.resume_url)
            .bind(submitted_at)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<StoredApplication>, ApplyError> {
        let rows = sqlx::query(LIST).fetch_all(&self.pool).await?;
        rows.iter().map(parse_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::any::AnyPoolOptions;

    use super::*;
    use crate::application::sample;

    async fn setup_test_db() -> SqlApplications {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open SQLite");
        let store = SqlApplications::new(pool, DatabaseType::SQLite);
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let store = setup_test_db().await;
        let id = store.save(&sample(), 1_792_108_800).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].submitted_at, 1_792_108_800);
        assert_eq!(items[0].application, sample());
    }
}
