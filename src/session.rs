//! Refresh/close session against one cluster.
//!
//! [`LockSession`] owns the current handle index and the last correlated
//! result set. Methods take `&mut self`, so at most one refresh or close
//! is ever in flight; a close always runs against the index built by the
//! most recent refresh.

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::correlate::correlate;
use crate::error::{QumuloError, Result};
use crate::events::{Diagnostic, Level};
use crate::page::{Page, Termination, collect_pages};
use crate::transport::Transport;
use crate::types::{
    CorrelatedRecord, FileHandle, FileHandlesPage, HandleIndex, LockGrant, LockGrantsPage, WhoAmI,
};

/// RBAC privileges a usable session needs.
pub const REQUIRED_PRIVILEGES: [&str; 3] = [
    "PRIVILEGE_FS_LOCK_READ",
    "PRIVILEGE_SMB_FILE_HANDLE_READ",
    "PRIVILEGE_SMB_FILE_HANDLE_WRITE",
];

const WHO_AM_I_PATH: &str = "v1/session/who-am-i";
const LOCKS_PATH: &str = "v1/files/locks/smb/share-mode/";
const HANDLES_PATH: &str = "v1/smb/files/?resolve_paths=true";
const CLOSE_PATH: &str = "v1/smb/files/close";

/// Where the session is in its refresh/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No successful refresh yet.
    Idle,
    FetchingLocks,
    FetchingHandles,
    Correlating,
    /// A complete result set is available.
    Ready,
    Closing,
}

/// A connected session: identity, current snapshots, correlated records.
#[derive(Debug)]
pub struct LockSession<T: Transport> {
    transport: T,
    user: String,
    missing_privileges: Vec<String>,
    state: SessionState,
    locks: Vec<LockGrant>,
    handles: HandleIndex,
    records: Vec<CorrelatedRecord>,
    filter: String,
    events: Option<UnboundedSender<Diagnostic>>,
}

impl<T: Transport> LockSession<T> {
    /// Authenticate against the cluster and verify RBAC privileges.
    ///
    /// An expired or invalid token fails here with [`QumuloError::Auth`]
    /// and no session is created. Missing privileges only produce a
    /// [`Diagnostic::MissingPrivileges`] warning; operations are still
    /// permitted and will fail as API errors if the cluster refuses them.
    pub async fn connect(
        transport: T,
        events: Option<UnboundedSender<Diagnostic>>,
    ) -> Result<Self> {
        let value = transport.get(WHO_AM_I_PATH).await?;
        let identity: WhoAmI = serde_json::from_value(value)?;
        let missing_privileges: Vec<String> = REQUIRED_PRIVILEGES
            .iter()
            .filter(|required| !identity.privileges.iter().any(|have| have == *required))
            .map(|required| required.to_string())
            .collect();

        let session = Self {
            transport,
            user: identity.name,
            missing_privileges,
            state: SessionState::Idle,
            locks: Vec::new(),
            handles: HandleIndex::default(),
            records: Vec::new(),
            filter: String::new(),
            events,
        };
        if !session.missing_privileges.is_empty() {
            session.emit(Diagnostic::MissingPrivileges {
                user: session.user.clone(),
                missing: session.missing_privileges.clone(),
            });
        }
        Ok(session)
    }

    /// Authenticated identity name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Required privileges the identity does not hold.
    pub fn missing_privileges(&self) -> &[String] {
        &self.missing_privileges
    }

    /// Current position in the refresh/close cycle.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The last complete correlated result set.
    pub fn records(&self) -> &[CorrelatedRecord] {
        &self.records
    }

    /// The handle index from the last successful refresh.
    pub fn handle_index(&self) -> &HandleIndex {
        &self.handles
    }

    /// Rebuild both snapshots and correlate them under `filter`.
    ///
    /// On any failure the previous `Ready` result set stays in place;
    /// partial results are never installed.
    pub async fn refresh(&mut self, filter: &str) -> Result<&[CorrelatedRecord]> {
        self.filter = filter.to_string();
        let prior = self.state;
        match self.run_refresh().await {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!(records = self.records.len(), "refresh complete");
                Ok(&self.records)
            }
            Err(err) => {
                self.state = if prior == SessionState::Idle {
                    SessionState::Idle
                } else {
                    SessionState::Ready
                };
                Err(err)
            }
        }
    }

    /// Re-run correlation over the stored snapshots with a new filter,
    /// without touching the network.
    pub fn refilter(&mut self, filter: &str) -> &[CorrelatedRecord] {
        self.filter = filter.to_string();
        self.records = correlate(&self.locks, &self.handles, &self.filter);
        &self.records
    }

    /// Close the open handle whose `file_number` equals `file_id`.
    ///
    /// The close POST carries the stored descriptor verbatim (the server
    /// requires the full record, not just the id). Success triggers a
    /// full refresh under the session's last filter; failure changes no
    /// local state and is never retried.
    pub async fn close_handle(&mut self, file_id: &str) -> Result<&[CorrelatedRecord]> {
        let Some(handle) = self.handles.get(file_id).cloned() else {
            warn!(file_id, "close requested for unknown file id");
            return Err(QumuloError::HandleNotFound {
                file_id: file_id.to_string(),
            });
        };

        self.state = SessionState::Closing;
        let body = Value::Array(vec![handle.descriptor.clone()]);
        match self.transport.post(CLOSE_PATH, body).await {
            Ok(_) => {
                self.emit(Diagnostic::HandleClosed {
                    path: handle.path.clone(),
                });
                let filter = self.filter.clone();
                self.refresh(&filter).await
            }
            Err(err) => {
                self.state = SessionState::Ready;
                let (status, body) = match err {
                    QumuloError::Api { status, body } => (status, body),
                    other => return Err(other),
                };
                self.emit(Diagnostic::CloseFailed {
                    file_id: file_id.to_string(),
                    status,
                });
                Err(QumuloError::CloseRejected {
                    file_id: file_id.to_string(),
                    status,
                    body,
                })
            }
        }
    }

    async fn run_refresh(&mut self) -> Result<()> {
        self.state = SessionState::FetchingLocks;
        let grants = self.fetch_lock_grants().await?;
        self.emit(Diagnostic::LocksListed {
            count: grants.len(),
        });

        self.state = SessionState::FetchingHandles;
        let handles = self.fetch_handle_index().await?;

        self.state = SessionState::Correlating;
        for grant in &grants {
            if handles.get(&grant.file_id).is_none() {
                self.emit(Diagnostic::UnresolvedHandle {
                    file_id: grant.file_id.clone(),
                });
            }
        }
        self.records = correlate(&grants, &handles, &self.filter);
        self.locks = grants;
        self.handles = handles;
        Ok(())
    }

    /// The lock listing keeps returning cursors and ends with an empty
    /// page, unlike the handle listing.
    async fn fetch_lock_grants(&self) -> Result<Vec<LockGrant>> {
        let transport = &self.transport;
        collect_pages(
            |cursor| async move {
                let path = cursor.unwrap_or_else(|| LOCKS_PATH.to_string());
                let value = transport.get(&path).await?;
                let page: LockGrantsPage = serde_json::from_value(value)?;
                Ok(Page {
                    records: page.grants,
                    next: page.paging.next,
                })
            },
            Termination::EmptyPage,
        )
        .await
    }

    async fn fetch_handle_index(&self) -> Result<HandleIndex> {
        let transport = &self.transport;
        let handles = collect_pages(
            |cursor| async move {
                let path = cursor.unwrap_or_else(|| HANDLES_PATH.to_string());
                let value = transport.get(&path).await?;
                let page: FileHandlesPage = serde_json::from_value(value)?;
                let records = page
                    .file_handles
                    .into_iter()
                    .map(FileHandle::from_raw)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Page {
                    records,
                    next: page.paging.next,
                })
            },
            Termination::CursorNull,
        )
        .await?;
        Ok(HandleIndex::from_handles(handles))
    }

    fn emit(&self, event: Diagnostic) {
        match event.level() {
            Level::Info => info!(%event),
            Level::Warning => warn!(%event),
            Level::Error => error!(%event),
        }
        if let Some(events) = &self.events {
            // A dropped receiver just means nobody is rendering events.
            let _ = events.send(event);
        }
    }
}
