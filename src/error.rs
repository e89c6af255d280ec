//! Error types for the Qumulo lock manager core.

use thiserror::Error;

/// Errors returned by core operations.
///
/// Every failure crosses the core/presentation boundary as one of these
/// variants; nothing panics or propagates uncaught.
#[derive(Error, Debug)]
pub enum QumuloError {
    /// Authentication rejected (HTTP 401). Fatal at connect time.
    #[error("authentication failed ({status}): {message} (has your bearer token expired?)")]
    Auth {
        /// HTTP status code, normally 401.
        status: u16,
        /// Body text returned by the cluster.
        message: String,
    },

    /// The authenticated identity lacks required RBAC privileges.
    #[error("user {user} is missing required privileges: {}", missing.join(", "))]
    MissingPrivileges {
        /// Authenticated identity name.
        user: String,
        /// Privileges absent from the identity.
        missing: Vec<String>,
    },

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The cluster answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body text returned by the cluster.
        body: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response record was missing a field the core requires.
    #[error("malformed {what} record: {detail}")]
    Decode {
        /// Which kind of record failed to decode.
        what: &'static str,
        /// What was wrong with it.
        detail: String,
    },

    /// No open file handle with this id exists in the current index.
    #[error("no open file handle matches file id {file_id}")]
    HandleNotFound {
        /// The id that was looked up.
        file_id: String,
    },

    /// The cluster rejected the close mutation.
    #[error("close rejected for file id {file_id} ({status}): {body}")]
    CloseRejected {
        /// The handle the close targeted.
        file_id: String,
        /// HTTP status code.
        status: u16,
        /// Body text returned by the cluster.
        body: String,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, QumuloError>;
