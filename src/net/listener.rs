//! TCP listener binding.

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(String, std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Bind a TCP listener on `address` (`host:port`, host names allowed).
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| ListenerError::Bind(address.to_string(), e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| ListenerError::Bind(address.to_string(), e))?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
