use serde::{Deserialize, Serialize};

/// Identity valid only within the current runtime session. Reused across
/// sessions, never stable, never written to disk.
pub type SessionId = i64;

/// Stable repository identity: the owning document's guid plus the local
/// id of the object within that document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct PersistentId {
    pub guid: String,
    #[serde(rename = "fileId")]
    pub file_id: i64,
}

impl PersistentId {
    pub fn new(guid: impl Into<String>, file_id: i64) -> Self {
        Self {
            guid: guid.into(),
            file_id,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Behavior,
    Asset,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotLoaded,
    Loaded,
    LoadedAdditive,
}

/// The entity a search was started for. Carried through the session and
/// attached to the result as its context.
#[derive(Debug, Serialize, Clone)]
pub struct SearchTarget {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<PersistentId>,
}

impl SearchTarget {
    pub fn live(name: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            name: name.into(),
            session_id: Some(session_id),
            persistent: None,
        }
    }

    pub fn repository(name: impl Into<String>, persistent: PersistentId) -> Self {
        Self {
            name: name.into(),
            session_id: None,
            persistent: Some(persistent),
        }
    }
}

/// One found reference: an entity whose serialized form contains the
/// target's identity token, attributed to its origin container.
#[derive(Debug, Serialize, Clone)]
pub struct EntityHit {
    pub name: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<PersistentId>,
    /// Name of the container the entity lives in; empty for repository
    /// assets with no live container.
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Hits bucketed by origin container for presentation. Entities keep their
/// arrival order within a bucket.
#[derive(Debug, Serialize, Clone)]
pub struct ResultGroup {
    pub origin: String,
    pub hits: Vec<EntityHit>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct ScanStats {
    pub containers_scanned: usize,
    pub candidates_matched: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub containers_opened: usize,
    pub containers_closed: usize,
}

/// Aggregate result of one search session. Lives only as long as the
/// interactive session that produced it.
#[derive(Debug, Serialize, Clone)]
pub struct SearchResult {
    pub context: SearchTarget,
    /// Deduplicated hits in first-seen order.
    pub hits: Vec<EntityHit>,
    /// Grouped view: buckets ordered by case-folded container name.
    pub groups: Vec<ResultGroup>,
    pub stats: ScanStats,
    pub cancelled: bool,
}
