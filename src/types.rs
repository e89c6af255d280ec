//! Wire and domain types for the lock management API.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::error::{QumuloError, Result};

/// Path shown for a lock grant whose file handle closed between the two
/// listing fetches. Correlation degrades to this sentinel instead of
/// dropping the record.
pub const UNRESOLVED_PATH: &str = "<unresolved>";

/// The cluster sends ids as JSON strings or numbers depending on endpoint
/// and version; normalize both to `String` so lookups compare equal.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// ---------- Session identity ----------

/// Response from GET v1/session/who-am-i.
#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub name: String,
    #[serde(default)]
    pub privileges: Vec<String>,
}

// ---------- Pagination envelope ----------

/// Paging block every listing endpoint returns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    /// Path of the next page, relative to the API root. Absent or empty
    /// on the last page of cursor-terminated listings.
    #[serde(default)]
    pub next: Option<String>,
}

// ---------- Lock grants ----------

/// One share-mode lock grant from GET v1/files/locks/smb/share-mode/.
///
/// `file_id` references an open handle's `file_number` but is not
/// guaranteed to resolve: the handle can close between the lock fetch
/// and the handle fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockGrant {
    #[serde(deserialize_with = "id_string")]
    pub file_id: String,
    #[serde(default)]
    pub mode: Vec<String>,
    #[serde(default)]
    pub owner_address: String,
    #[serde(default)]
    pub node_address: String,
}

/// One page of the lock grant listing.
#[derive(Debug, Clone, Deserialize)]
pub struct LockGrantsPage {
    #[serde(default)]
    pub grants: Vec<LockGrant>,
    #[serde(default)]
    pub paging: Paging,
}

// ---------- File handles ----------

/// One page of GET v1/smb/files/?resolve_paths=true. Handle records are
/// kept as raw JSON because the close endpoint requires the complete
/// record echoed back verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct FileHandlesPage {
    #[serde(default)]
    pub file_handles: Vec<serde_json::Value>,
    #[serde(default)]
    pub paging: Paging,
}

/// An open file handle with its resolved path and the untouched server
/// record it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHandle {
    /// Unique id within one snapshot; the join key against `LockGrant`.
    pub file_number: String,
    /// Resolved filesystem path.
    pub path: String,
    /// Every field the server returned, preserved for close requests.
    pub descriptor: serde_json::Value,
}

impl FileHandle {
    /// Extract the fields the core needs from a raw handle record,
    /// keeping the record itself intact.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self> {
        let file_number = match &raw["file_number"] {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => {
                return Err(QumuloError::Decode {
                    what: "file handle",
                    detail: "missing file_number".to_string(),
                });
            }
        };
        let path = raw["handle_info"]["path"]
            .as_str()
            .ok_or_else(|| QumuloError::Decode {
                what: "file handle",
                detail: format!("file_number {file_number} has no handle_info.path"),
            })?
            .to_string();
        Ok(Self {
            file_number,
            path,
            descriptor: raw,
        })
    }
}

/// Snapshot of all open file handles, keyed by `file_number`.
///
/// Rebuilt from scratch and swapped in wholesale on every refresh; a close
/// always runs against the most recently built index.
#[derive(Debug, Clone, Default)]
pub struct HandleIndex {
    by_number: HashMap<String, FileHandle>,
}

impl HandleIndex {
    /// Build an index from handle records. Duplicate `file_number`s keep
    /// the later record, matching the server's own listing order.
    pub fn from_handles(handles: Vec<FileHandle>) -> Self {
        let mut by_number = HashMap::with_capacity(handles.len());
        for handle in handles {
            by_number.insert(handle.file_number.clone(), handle);
        }
        Self { by_number }
    }

    /// Look up a handle by its file number.
    pub fn get(&self, file_number: &str) -> Option<&FileHandle> {
        self.by_number.get(file_number)
    }

    /// Resolved path for a file number, if the handle is still open.
    pub fn path_of(&self, file_number: &str) -> Option<&str> {
        self.by_number.get(file_number).map(|h| h.path.as_str())
    }

    /// Number of open handles in this snapshot.
    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    /// True when no handles were open at snapshot time.
    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

// ---------- Correlated output ----------

/// A lock grant joined with its resolved path, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedRecord {
    pub file_id: String,
    /// Resolved path, or [`UNRESOLVED_PATH`] when the handle is gone.
    pub path: String,
    /// Lock mode flags joined for display (e.g. "READ, DENY_WRITE").
    pub mode: String,
    pub owner_address: String,
    pub node_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lock_grant_accepts_numeric_file_id() {
        let grant: LockGrant = serde_json::from_value(json!({
            "file_id": 42,
            "mode": ["READ"],
            "owner_address": "10.0.0.1",
            "node_address": "n1",
        }))
        .expect("numeric file_id");
        assert_eq!(grant.file_id, "42");
    }

    #[test]
    fn lock_grant_accepts_string_file_id_and_defaults() {
        let grant: LockGrant =
            serde_json::from_value(json!({ "file_id": "7" })).expect("string file_id");
        assert_eq!(grant.file_id, "7");
        assert!(grant.mode.is_empty());
        assert_eq!(grant.owner_address, "");
    }

    #[test]
    fn file_handle_keeps_descriptor_verbatim() {
        let raw = json!({
            "file_number": "101",
            "handle_info": { "path": "/share/a.txt", "mode": ["READ"] },
            "session_id": 9,
            "opaque": { "anything": [1, 2, 3] },
        });
        let handle = FileHandle::from_raw(raw.clone()).expect("valid handle");
        assert_eq!(handle.file_number, "101");
        assert_eq!(handle.path, "/share/a.txt");
        assert_eq!(handle.descriptor, raw);
    }

    #[test]
    fn file_handle_normalizes_numeric_file_number() {
        let raw = json!({
            "file_number": 8,
            "handle_info": { "path": "/x" },
        });
        let handle = FileHandle::from_raw(raw).expect("numeric file_number");
        assert_eq!(handle.file_number, "8");
    }

    #[test]
    fn file_handle_without_path_is_a_decode_error() {
        let raw = json!({ "file_number": "3", "handle_info": {} });
        let err = FileHandle::from_raw(raw).expect_err("missing path");
        assert!(matches!(err, QumuloError::Decode { .. }));
    }

    #[test]
    fn handle_index_last_duplicate_wins() {
        let first = FileHandle::from_raw(json!({
            "file_number": "1",
            "handle_info": { "path": "/old" },
        }))
        .expect("first");
        let second = FileHandle::from_raw(json!({
            "file_number": "1",
            "handle_info": { "path": "/new" },
        }))
        .expect("second");
        let index = HandleIndex::from_handles(vec![first, second]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.path_of("1"), Some("/new"));
    }

    #[test]
    fn paging_next_defaults_to_none() {
        let page: LockGrantsPage = serde_json::from_value(json!({ "grants": [] })).expect("page");
        assert!(page.paging.next.is_none());
    }
}
