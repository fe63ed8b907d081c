use crate::identity;
use crate::model::{EntityHit, ResultGroup, ScanStats, SearchResult, SearchTarget};
use std::collections::HashSet;

/// Accumulates the scan hit stream into a deduplicated, stably ordered
/// result set.
///
/// Uniqueness is keyed on resolved identity: the persistent token when the
/// hit carries one, else its session token. First arrival wins; later
/// duplicates are dropped without disturbing order.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<String>,
    hits: Vec<EntityHit>,
    pub stats: ScanStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an aggregator from an existing result so a search session
    /// can extend it without re-admitting identities it already holds.
    pub fn resume(result: &SearchResult) -> Self {
        let mut agg = Self {
            seen: HashSet::new(),
            hits: result.hits.clone(),
            stats: result.stats.clone(),
        };
        for hit in &agg.hits {
            if let Some(key) = identity::hit_key(hit) {
                agg.seen.insert(key);
            }
        }
        agg
    }

    /// Admit a hit. Returns false for duplicates and for hits carrying no
    /// identity at all.
    pub fn push(&mut self, hit: EntityHit) -> bool {
        let Some(key) = identity::hit_key(&hit) else {
            eprintln!("refscan: dropping hit without identity: {}", hit.name);
            return false;
        };
        if !self.seen.insert(key) {
            return false;
        }
        self.hits.push(hit);
        true
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn finish(self, context: SearchTarget, cancelled: bool) -> SearchResult {
        let groups = group_hits(&self.hits);
        SearchResult {
            context,
            hits: self.hits,
            groups,
            stats: self.stats,
            cancelled,
        }
    }
}

/// Bucket hits by origin container. Buckets are ordered by case-folded
/// container name (raw name as tie-break) so the grouped view is identical
/// on every run; hits keep their arrival order within a bucket.
fn group_hits(hits: &[EntityHit]) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    for hit in hits {
        match groups.iter_mut().find(|g| g.origin == hit.origin) {
            Some(group) => group.hits.push(hit.clone()),
            None => groups.push(ResultGroup {
                origin: hit.origin.clone(),
                hits: vec![hit.clone()],
            }),
        }
    }
    groups.sort_by(|a, b| {
        let ka = a.origin.to_lowercase();
        let kb = b.origin.to_lowercase();
        ka.cmp(&kb).then_with(|| a.origin.cmp(&b.origin))
    });
    groups
}
