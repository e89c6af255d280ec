//! Join lock grants against the handle index for display.

use crate::types::{CorrelatedRecord, HandleIndex, LockGrant, UNRESOLVED_PATH};

/// Join each grant with its resolved path and apply the text filter.
///
/// Output preserves snapshot order and is a pure function of its inputs.
/// A grant whose `file_id` no longer resolves (the handle closed between
/// the two fetches) is emitted with the [`UNRESOLVED_PATH`] sentinel
/// rather than dropped; the filter then runs against the sentinel.
///
/// Filter semantics: case-insensitive substring match against the path or
/// the owner address; an empty filter matches every record.
pub fn correlate(
    snapshot: &[LockGrant],
    index: &HandleIndex,
    filter: &str,
) -> Vec<CorrelatedRecord> {
    let filter = filter.to_lowercase();
    snapshot
        .iter()
        .filter_map(|grant| {
            let path = index.path_of(&grant.file_id).unwrap_or(UNRESOLVED_PATH);
            let matches = filter.is_empty()
                || path.to_lowercase().contains(&filter)
                || grant.owner_address.to_lowercase().contains(&filter);
            matches.then(|| CorrelatedRecord {
                file_id: grant.file_id.clone(),
                path: path.to_string(),
                mode: grant.mode.join(", "),
                owner_address: grant.owner_address.clone(),
                node_address: grant.node_address.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileHandle;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn handle(file_number: &str, path: &str) -> FileHandle {
        FileHandle::from_raw(json!({
            "file_number": file_number,
            "handle_info": { "path": path },
        }))
        .expect("test handle")
    }

    fn grant(file_id: &str, mode: &[&str], owner: &str, node: &str) -> LockGrant {
        LockGrant {
            file_id: file_id.to_string(),
            mode: mode.iter().map(|m| m.to_string()).collect(),
            owner_address: owner.to_string(),
            node_address: node.to_string(),
        }
    }

    #[test]
    fn resolved_grant_produces_full_record() {
        let index = HandleIndex::from_handles(vec![handle("1", "/a/b.txt")]);
        let snapshot = vec![grant("1", &["R"], "10.0.0.1", "n1")];
        let records = correlate(&snapshot, &index, "");
        assert_eq!(
            records,
            vec![CorrelatedRecord {
                file_id: "1".to_string(),
                path: "/a/b.txt".to_string(),
                mode: "R".to_string(),
                owner_address: "10.0.0.1".to_string(),
                node_address: "n1".to_string(),
            }]
        );
    }

    #[test]
    fn dangling_grant_degrades_to_sentinel() {
        let index = HandleIndex::default();
        let snapshot = vec![grant("2", &["W"], "10.0.0.9", "n2")];
        let records = correlate(&snapshot, &index, "");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, UNRESOLVED_PATH);
        // Owner still matches even though the path is the sentinel.
        let filtered = correlate(&snapshot, &index, "10.0.0.9");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn sentinel_path_participates_in_filtering() {
        let index = HandleIndex::default();
        let snapshot = vec![grant("2", &["W"], "10.0.0.9", "n2")];
        assert_eq!(correlate(&snapshot, &index, "unresolved").len(), 1);
        assert_eq!(correlate(&snapshot, &index, "/share").len(), 0);
    }

    #[test]
    fn filter_is_case_insensitive_on_path_and_owner() {
        let index = HandleIndex::from_handles(vec![handle("1", "/Share/Reports/Q3.xlsx")]);
        let snapshot = vec![grant("1", &["READ"], "10.20.30.40", "n1")];
        assert_eq!(correlate(&snapshot, &index, "reports").len(), 1);
        assert_eq!(correlate(&snapshot, &index, "REPORTS").len(), 1);
        assert_eq!(correlate(&snapshot, &index, "10.20").len(), 1);
        assert_eq!(correlate(&snapshot, &index, "nomatch").len(), 0);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let index = HandleIndex::from_handles(vec![handle("1", "/a")]);
        let snapshot = vec![
            grant("1", &["READ"], "10.0.0.1", "n1"),
            grant("9", &["WRITE"], "10.0.0.2", "n2"),
        ];
        assert_eq!(correlate(&snapshot, &index, "").len(), 2);
    }

    #[test]
    fn output_is_pure_and_order_stable() {
        let index = HandleIndex::from_handles(vec![handle("1", "/a"), handle("2", "/b")]);
        let snapshot = vec![
            grant("2", &["WRITE"], "10.0.0.2", "n2"),
            grant("1", &["READ"], "10.0.0.1", "n1"),
            grant("2", &["DENY_READ"], "10.0.0.3", "n1"),
        ];
        let first = correlate(&snapshot, &index, "");
        let second = correlate(&snapshot, &index, "");
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "2"]);
    }

    #[test]
    fn mode_flags_are_joined_for_display() {
        let index = HandleIndex::from_handles(vec![handle("1", "/a")]);
        let snapshot = vec![grant("1", &["READ", "DENY_WRITE"], "10.0.0.1", "n1")];
        let records = correlate(&snapshot, &index, "");
        assert_eq!(records[0].mode, "READ, DENY_WRITE");
    }
}
