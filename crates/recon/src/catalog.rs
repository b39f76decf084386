//! The remote catalog as seen by the reconciler.

use std::fmt;

use crate::model::RemoteRecord;

/// Error type for catalog requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service answered with an application-level error payload.
    Application(String),
    /// Non-success HTTP status.
    Http(u16, String),
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// Response body could not be interpreted.
    Malformed(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application(msg) => write!(f, "remote error: {msg}"),
            Self::Http(status, msg) => write!(f, "HTTP {status}: {msg}"),
            Self::Transport(msg) => write!(f, "network error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Read-only view of a remote collection.
///
/// `list_records` must return every record of the collection, pages
/// concatenated in increasing offset order. `child_pointers` returns the
/// page pointers of a compound record in canonical page order.
pub trait Catalog {
    fn list_records(
        &self,
        collection: &str,
        identifier_field: &str,
    ) -> Result<Vec<RemoteRecord>, RemoteError>;

    fn child_pointers(&self, collection: &str, pointer: &str) -> Result<Vec<String>, RemoteError>;
}
