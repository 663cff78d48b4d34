use serde::{Deserialize, Serialize};

/// One stored file, identified by `(node_id, filename)`.
///
/// There is no attachment registry: the storage directory listing is the
/// source of truth, and the full path is always derived as
/// `storage_root / node_id / filename`, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub node_id: String,
    pub filename: String,
    pub size_bytes: u64,
}
