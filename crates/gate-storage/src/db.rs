//! Database operations

use std::str::FromStr;
use std::time::Duration;

use gate_config::DatabaseConfig;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::{Result, StorageError};

/// Handle to the application database
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool and verify the server answers within the connect timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or(StorageError::NotConfigured)?;

        let options = SqliteConnectOptions::from_str(url).map_err(StorageError::Connection)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
            .connect_with(options)
            .await
            .map_err(StorageError::Connection)?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(StorageError::Connection)?;

        info!("Successfully connected to the database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch the first row of the `users` table as a JSON object.
    pub async fn find_one_user(&self) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT * FROM users LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_json).transpose()
    }

    pub async fn close(self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}

fn row_to_json(row: &SqliteRow) -> Result<Value> {
    let mut object = Map::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let (is_null, type_name) = {
            let raw = row.try_get_raw(idx)?;
            (raw.is_null(), raw.type_info().name().to_owned())
        };

        let value = if is_null {
            Value::Null
        } else {
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
                "REAL" => Value::from(row.try_get_unchecked::<f64, _>(idx)?),
                "BLOB" => {
                    let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
                    Value::from(format!("<{} bytes>", bytes.len()))
                }
                _ => Value::from(row.try_get_unchecked::<String, _>(idx)?),
            }
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> DatabaseConfig {
        let path = std::env::temp_dir().join(format!("gate-storage-{}.db", uuid::Uuid::new_v4()));
        DatabaseConfig {
            url: Some(format!("sqlite://{}?mode=rwc", path.display())),
            connect_timeout_ms: 1000,
            max_connections: 1,
        }
    }

    #[tokio::test]
    async fn test_missing_url() {
        let err = Database::connect(&DatabaseConfig::default()).await.err().unwrap();
        assert!(matches!(err, StorageError::NotConfigured));
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_unreachable_database() {
        let config = DatabaseConfig {
            url: Some("sqlite:///nonexistent-gate-dir/missing.db".to_string()),
            connect_timeout_ms: 500,
            max_connections: 1,
        };
        let err = Database::connect(&config).await.err().unwrap();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_find_one_user() {
        let db = Database::connect(&temp_config()).await.unwrap();
        sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL, avatar BLOB, bio TEXT)")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(db.find_one_user().await.unwrap().is_none());

        sqlx::query("INSERT INTO users (name, score, avatar) VALUES ('alice', 4.5, x'0102')")
            .execute(db.pool())
            .await
            .unwrap();

        let user = db.find_one_user().await.unwrap().unwrap();
        assert_eq!(user["id"], 1);
        assert_eq!(user["name"], "alice");
        assert_eq!(user["score"], 4.5);
        assert_eq!(user["avatar"], "<2 bytes>");
        assert!(user["bio"].is_null());

        db.close().await;
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let db = Database::connect(&temp_config()).await.unwrap();
        let err = db.find_one_user().await.unwrap_err();
        assert!(!err.is_connection());
        db.close().await;
    }
}
