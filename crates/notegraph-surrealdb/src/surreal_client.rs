//! SurrealDB client
//!
//! Thin wrapper around the embedded `surrealdb::Surreal<Db>` connection.
//!
//! ## Supported Backends
//!
//! - **Memory (Mem)**: In-memory storage for development and testing
//! - **File (RocksDB)**: Persistent file-based storage
//!
//! The connection is an explicitly owned resource: it is opened by
//! [`SurrealClient::new`] and released by [`SurrealClient::close`]. Clones
//! share one connection, and every call after `close` fails with
//! [`StoreError::Closed`].

use crate::types::SurrealDbConfig;
use notegraph_core::{StoreError, StoreResult};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use surrealdb::engine::local::Db;
use surrealdb::opt::auth::Root;
use surrealdb::opt::Config;
use surrealdb::Surreal;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Re-runs of a query that hit a transaction conflict
const CONFLICT_RETRIES: u32 = 8;
const CONFLICT_BACKOFF: Duration = Duration::from_millis(5);

/// Whether a query error is a concurrent-write conflict the datastore
/// expects the caller to retry
fn is_conflict(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("conflict") || message.contains("can be retried")
}

/// Embedded SurrealDB client
///
/// **Implementation**: Uses Arc internally so cloning is cheap and doesn't attempt
/// to open multiple database connections. This prevents "lock hold by current process"
/// errors with RocksDB file databases.
#[derive(Clone)]
pub struct SurrealClient {
    inner: Arc<SurrealClientInner>,
}

struct SurrealClientInner {
    /// `None` once closed
    db: RwLock<Option<Surreal<Db>>>,
    config: SurrealDbConfig,
}

impl std::fmt::Debug for SurrealClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealClient")
            .field("path", &self.inner.config.path)
            .field("namespace", &self.inner.config.namespace)
            .field("database", &self.inner.config.database)
            .field("open", &self.is_open())
            .finish()
    }
}

impl SurrealClient {
    /// Open an in-memory or RocksDB database depending on `config.path`
    pub async fn new(config: SurrealDbConfig) -> StoreResult<Self> {
        use surrealdb::engine::local::{Mem, RocksDb};

        let db = match (&config.credentials, config.is_memory()) {
            (None, true) => Surreal::new::<Mem>(()).await,
            (None, false) => Surreal::new::<RocksDb>(config.path.as_str()).await,
            (Some((username, password)), true) => {
                let root = Root {
                    username: username.as_str(),
                    password: password.as_str(),
                };
                Surreal::new::<Mem>(Config::default().user(root)).await
            }
            (Some((username, password)), false) => {
                let root = Root {
                    username: username.as_str(),
                    password: password.as_str(),
                };
                Surreal::new::<RocksDb>((config.path.as_str(), Config::default().user(root))).await
            }
        }
        .map_err(|e| {
            StoreError::Connection(format!(
                "Failed to open database at '{}': {}",
                config.path, e
            ))
        })?;

        if let Some((username, password)) = &config.credentials {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| StoreError::Connection(format!("Sign-in failed: {}", e)))?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StoreError::Connection(format!(
                    "Failed to use namespace '{}' and database '{}': {}",
                    config.namespace, config.database, e
                ))
            })?;

        info!(
            "Opened SurrealDB at '{}' ({}/{})",
            config.path, config.namespace, config.database
        );

        Ok(Self {
            inner: Arc::new(SurrealClientInner {
                db: RwLock::new(Some(db)),
                config,
            }),
        })
    }

    /// In-memory client with the default namespace
    pub async fn new_memory() -> StoreResult<Self> {
        Self::new(SurrealDbConfig {
            path: ":memory:".to_string(),
            namespace: "notegraph".to_string(),
            database: "notes".to_string(),
            credentials: None,
        })
        .await
    }

    /// In-memory client with a unique namespace/database pair, for tests
    /// running in parallel
    pub async fn new_isolated_memory() -> StoreResult<Self> {
        let stamp = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let thread = format!("{:?}", std::thread::current().id())
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>();

        Self::new(SurrealDbConfig {
            path: ":memory:".to_string(),
            namespace: format!("test_{thread}"),
            database: format!("db_{stamp}"),
            credentials: None,
        })
        .await
    }

    pub fn config(&self) -> &SurrealDbConfig {
        &self.inner.config
    }

    pub fn is_open(&self) -> bool {
        self.inner.db.read().is_some()
    }

    fn handle(&self) -> StoreResult<Surreal<Db>> {
        self.inner.db.read().clone().ok_or(StoreError::Closed)
    }

    /// Connectivity probe
    pub async fn health(&self) -> StoreResult<()> {
        self.handle()?
            .health()
            .await
            .map_err(|e| StoreError::Connection(format!("Health check failed: {}", e)))
    }

    /// Run `sql` and fail if any statement errored
    ///
    /// Parameters are passed as JSON objects: `{"key": value, "key2": value2}`.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> StoreResult<()> {
        self.run(sql, params).await.map(|_| ())
    }

    /// Run `sql` and deserialize the result of the statement at `index`
    pub async fn query_at<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
        index: usize,
    ) -> StoreResult<Vec<T>> {
        let mut response = self.run(sql, params).await?;
        response
            .take::<Vec<T>>(index)
            .map_err(|e| StoreError::Serialization(format!("Failed to decode results: {}", e)))
    }

    /// Run a single-statement query and deserialize its rows
    pub async fn query<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<T>> {
        self.query_at(sql, params, 0).await
    }

    /// Run `sql`, re-running it on a transaction conflict. Store statements
    /// are idempotent upserts, relate-after-delete or deletes.
    async fn run(&self, sql: &str, params: &[Value]) -> StoreResult<surrealdb::Response> {
        let mut attempt = 0;
        loop {
            match self.run_once(sql, params).await {
                Err(StoreError::Query(msg)) if is_conflict(&msg) && attempt < CONFLICT_RETRIES => {
                    attempt += 1;
                    debug!("Transaction conflict, retry {}/{}", attempt, CONFLICT_RETRIES);
                    tokio::time::sleep(CONFLICT_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn run_once(&self, sql: &str, params: &[Value]) -> StoreResult<surrealdb::Response> {
        let db = self.handle()?;
        let mut query = db.query(sql);

        for param in params {
            if let Value::Object(map) = param {
                for (key, value) in map {
                    query = query.bind((key.clone(), value.clone()));
                }
            }
        }

        let response = query
            .await
            .map_err(|e| StoreError::Query(format!("Query execution failed: {}", e)))?;
        response
            .check()
            .map_err(|e| StoreError::Query(format!("Query returned error: {}", e)))
    }

    /// Release the connection. Idempotent.
    pub async fn close(&self) -> StoreResult<()> {
        let db = self.inner.db.write().take();
        if let Some(db) = db {
            // invalidate drops the session's auth before the handle goes away
            if let Err(e) = db.invalidate().await {
                warn!("Failed to invalidate SurrealDB session: {}", e);
            }
            debug!("Closed SurrealDB connection at '{}'", self.inner.config.path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Person {
        name: String,
        age: i64,
    }

    #[test]
    fn test_conflict_detection() {
        assert!(is_conflict(
            "Query returned error: Failed to commit transaction due to a read or write conflict. This transaction can be retried"
        ));
        assert!(!is_conflict("Query returned error: Parse error"));
        assert!(!is_conflict("Database record `block:x` already exists"));
    }

    #[tokio::test]
    async fn test_create_memory_client() {
        let client = SurrealClient::new_memory().await.unwrap();
        assert_eq!(client.config().namespace, "notegraph");
        assert!(client.is_open());
        client.health().await.unwrap();
    }

    #[tokio::test]
    async fn test_parameterized_query() {
        let client = SurrealClient::new_isolated_memory().await.unwrap();

        client
            .execute(
                "CREATE person:alice SET name = $name, age = $age",
                &[json!({ "name": "Alice", "age": 30 })],
            )
            .await
            .unwrap();

        let people: Vec<Person> = client
            .query("SELECT name, age FROM person", &[])
            .await
            .unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Alice");
        assert_eq!(people[0].age, 30);
    }

    #[tokio::test]
    async fn test_statement_errors_surface() {
        let client = SurrealClient::new_isolated_memory().await.unwrap();
        let err = client.execute("THROW 'boom'", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_final() {
        let client = SurrealClient::new_isolated_memory().await.unwrap();
        let clone = client.clone();

        client.close().await.unwrap();
        client.close().await.unwrap();

        assert!(!clone.is_open());
        assert!(matches!(clone.health().await, Err(StoreError::Closed)));
        assert!(matches!(
            clone.execute("RETURN 1", &[]).await,
            Err(StoreError::Closed)
        ));
    }
}
