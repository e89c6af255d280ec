//! Typed diagnostic events the core emits during operations.
//!
//! The presentation layer decides how to render these (status bar, log
//! pane, stderr); the core never writes to any output surface directly.

use std::fmt;

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A structured event from a refresh or close operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A refresh counted the currently held lock grants.
    LocksListed { count: usize },
    /// The authenticated identity is missing required RBAC privileges.
    MissingPrivileges { user: String, missing: Vec<String> },
    /// A lock grant's file handle closed between the two listing fetches.
    UnresolvedHandle { file_id: String },
    /// A file handle was closed on the cluster.
    HandleClosed { path: String },
    /// The cluster rejected a close mutation.
    CloseFailed { file_id: String, status: u16 },
}

impl Diagnostic {
    /// Severity the presentation layer should render this event at.
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::LocksListed { .. } | Diagnostic::HandleClosed { .. } => Level::Info,
            Diagnostic::MissingPrivileges { .. } | Diagnostic::UnresolvedHandle { .. } => {
                Level::Warning
            }
            Diagnostic::CloseFailed { .. } => Level::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LocksListed { count } => {
                write!(f, "{count} lock{} found", if *count == 1 { "" } else { "s" })
            }
            Diagnostic::MissingPrivileges { user, missing } => write!(
                f,
                "user {user} is missing required privileges: {}",
                missing.join(", ")
            ),
            Diagnostic::UnresolvedHandle { file_id } => {
                write!(f, "no open handle found for file id {file_id}")
            }
            Diagnostic::HandleClosed { path } => {
                write!(f, "file handle of {path} has been closed")
            }
            Diagnostic::CloseFailed { file_id, status } => {
                write!(f, "error closing file handle {file_id} (HTTP {status})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_count_message_pluralizes() {
        assert_eq!(
            Diagnostic::LocksListed { count: 1 }.to_string(),
            "1 lock found"
        );
        assert_eq!(
            Diagnostic::LocksListed { count: 3 }.to_string(),
            "3 locks found"
        );
    }

    #[test]
    fn levels_match_severity() {
        assert_eq!(Diagnostic::LocksListed { count: 0 }.level(), Level::Info);
        assert_eq!(
            Diagnostic::UnresolvedHandle {
                file_id: "9".to_string()
            }
            .level(),
            Level::Warning
        );
        assert_eq!(
            Diagnostic::CloseFailed {
                file_id: "9".to_string(),
                status: 404
            }
            .level(),
            Level::Error
        );
    }
}
