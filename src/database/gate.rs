//! MongoDB connection gate.

use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Client;
use thiserror::Error;
use url::Url;

/// Errors raised while opening the storage connection.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The URI could not be turned into client options.
    #[error("invalid connection uri: {0}")]
    InvalidUri(String),

    /// The server did not answer the initial ping.
    #[error("connection failed: {0}")]
    Connect(String),
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(e: mongodb::error::Error) -> Self {
        match *e.kind {
            mongodb::error::ErrorKind::InvalidArgument { ref message, .. } => {
                DatabaseError::InvalidUri(message.clone())
            }
            _ => DatabaseError::Connect(e.to_string()),
        }
    }
}

/// Opens the storage connection that gates the rest of startup.
#[async_trait]
pub trait DatabaseGate: Send + Sync {
    /// Make a single connection attempt against `uri`.
    async fn connect(&self, uri: &str) -> Result<(), DatabaseError>;

    /// Release the connection on shutdown. Best effort.
    async fn disconnect(&self) {}
}

/// Gate backed by the official MongoDB driver.
#[derive(Default)]
pub struct MongoGate {
    client: Mutex<Option<Client>>,
}

impl MongoGate {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseGate for MongoGate {
    async fn connect(&self, uri: &str) -> Result<(), DatabaseError> {
        // Client construction is lazy; the ping forces server selection.
        let client = Client::with_uri_str(uri).await?;
        client.database("admin").run_command(doc! { "ping": 1 }).await?;

        tracing::info!(uri = %redact_uri(uri), "Database connection established");
        if let Ok(mut slot) = self.client.lock() {
            *slot = Some(client);
        }
        Ok(())
    }

    async fn disconnect(&self) {
        let client = self.client.lock().ok().and_then(|mut slot| slot.take());
        if let Some(client) = client {
            client.shutdown().await;
            tracing::info!("Database connection closed");
        }
    }
}

/// Mask the password component of a connection URI for logging.
pub fn redact_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("****")).is_ok() {
                parsed.to_string()
            } else {
                "<redacted>".to_string()
            }
        }
        Ok(_) => uri.to_string(),
        Err(_) => "<unparseable uri>".to_string(),
    }
}
