//! MongoDB connection management with pool configuration and health checking

use crate::book::Book;
use crate::config::{redact_uri, BookstoreConfig};
use bookstore_common::{BookstoreError, Result};
use bson::{doc, Document as BsonDocument};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use std::time::Duration;
use tracing::{debug, info};

/// Connection pool configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool (default: driver default)
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool (default: 10)
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed (default: none)
    pub max_idle_time: Option<Duration>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 10s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            // One-shot commands: nothing to keep warm
            min_pool_size: None,
            max_pool_size: Some(10),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(10)),
            app_name: Some("bookstore".to_string()),
        }
    }
}

impl PoolConfig {
    fn apply(self, client_options: &mut ClientOptions) {
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = self.app_name {
            client_options.app_name = Some(app);
        }
    }
}

/// Open a connection to `uri` and return the `bookstore.books` collection.
///
/// The server is pinged once so an unreachable host fails here rather than
/// on the first query.
pub async fn connect_db(uri: &str) -> Result<Collection<Book>> {
    let connection = Connection::with_config(BookstoreConfig::new(uri)).await?;
    connection.ping().await?;
    Ok(connection.books())
}

/// MongoDB connection bound to the configured database and collection
pub struct Connection {
    database: Database,
    collection_name: String,
}

impl Connection {
    /// Create a new MongoDB connection with default pool settings
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_config(BookstoreConfig::new(connection_string)).await
    }

    /// Create a new MongoDB connection from a full configuration
    pub async fn with_config(config: BookstoreConfig) -> Result<Self> {
        config.validate()?;

        let mut client_options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            BookstoreError::Config(format!(
                "Invalid connection string '{}': {}",
                redact_uri(&config.uri),
                e
            ))
        })?;

        config.pool.apply(&mut client_options);

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;
        let database = client.database(&config.database);

        info!(
            uri = %redact_uri(&config.uri),
            database = %config.database,
            collection = %config.collection,
            "MongoDB client ready"
        );

        Ok(Self {
            database,
            collection_name: config.collection,
        })
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Get the collection name
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Typed handle to the books collection
    pub fn books(&self) -> Collection<Book> {
        self.database.collection(&self.collection_name)
    }

    /// Untyped handle to the books collection
    pub fn raw_books(&self) -> Collection<BsonDocument> {
        self.database.collection(&self.collection_name)
    }

    /// Check if the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<()> {
        debug!("ping");
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| BookstoreError::Connection(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}
