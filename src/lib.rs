//! Rust client for the Qumulo SMB lock management API.
//!
//! Discovers which SMB clients hold share-mode locks on which files and
//! lets an operator forcibly close a selected open-file handle. The lock
//! and handle listings are paginated independently and are not fetched
//! transactionally, so the core joins them by file id and degrades to a
//! `"<unresolved>"` path when a handle closed between the two fetches.
//!
//! ```no_run
//! use qumulo_locks::{ClusterConfig, HttpTransport, LockSession};
//!
//! # async fn run() -> qumulo_locks::Result<()> {
//! let config = ClusterConfig::new("cluster.example.com", "session-v1:token");
//! let transport = HttpTransport::new(&config)?;
//! let mut session = LockSession::connect(transport, None).await?;
//! for record in session.refresh("reports").await? {
//!     println!("{} {} {}", record.file_id, record.path, record.owner_address);
//! }
//! session.close_handle("42").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod correlate;
pub mod error;
pub mod events;
pub mod page;
pub mod session;
pub mod transport;
pub mod types;

pub use config::ClusterConfig;
pub use correlate::correlate;
pub use error::{QumuloError, Result};
pub use events::{Diagnostic, Level};
pub use page::{Page, Termination, collect_pages};
pub use session::{LockSession, REQUIRED_PRIVILEGES, SessionState};
pub use transport::{HttpTransport, Transport};
pub use types::{
    CorrelatedRecord, FileHandle, HandleIndex, LockGrant, UNRESOLVED_PATH, WhoAmI,
};
