use crate::aggregate::Aggregator;
use crate::document::{Behavior, BehaviorType, Container, Node, each_behavior};
use crate::error::SearchError;
use crate::identity::{self, IdentityToken};
use crate::matcher::Pattern;
use crate::model::{EntityHit, EntityKind, PersistentId, SearchTarget};
use crate::progress::{CancelFlag, SearchObserver};
use crate::registry::ContainerRegistry;
use crate::serialize::{self, Form};

#[derive(Debug, Clone, Copy, Default)]
pub struct LiveScanOptions<'a> {
    /// Only behaviors of this declared type are candidates. `None` means
    /// every behavior type.
    pub filter: Option<&'a BehaviorType>,
    /// Restrict the scan to a single container path.
    pub restrict_to: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct LiveScanOutcome {
    pub candidates: usize,
    /// Hits newly admitted by the aggregator during this scan.
    pub matched: usize,
    pub containers_scanned: usize,
    pub cancelled: bool,
}

struct Candidate<'a> {
    container: &'a Container,
    node: &'a Node,
    behavior: &'a Behavior,
}

/// Walk the loaded containers and stream matching behaviors into the
/// aggregator.
///
/// The target is serialized-against in runtime form when it is
/// session-local and persistent form when it is repository-backed; the
/// candidates are rendered the same way so the token literal lines up.
pub fn scan_containers(
    registry: &dyn ContainerRegistry,
    target: &SearchTarget,
    options: &LiveScanOptions<'_>,
    aggregator: &mut Aggregator,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<LiveScanOutcome, SearchError> {
    let token = identity::resolve(target)?;
    let form = match token {
        IdentityToken::Session(_) => Form::Runtime,
        IdentityToken::Persistent(_) => Form::Persistent,
    };
    let pattern = Pattern::token(&token);

    let mut candidates = Vec::new();
    let mut outcome = LiveScanOutcome::default();
    for container in registry.list() {
        if let Some(only) = options.restrict_to {
            if container.path != only {
                continue;
            }
        }
        outcome.containers_scanned += 1;
        each_behavior(&container.roots, &mut |node, behavior| {
            if filter_matches(options.filter, behavior) {
                candidates.push(Candidate {
                    container,
                    node,
                    behavior,
                });
            }
        });
    }

    let total = candidates.len();
    for (idx, candidate) in candidates.into_iter().enumerate() {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            return Ok(outcome);
        }
        observer.on_progress(&candidate.node.name, idx as f32 / total.max(1) as f32);
        outcome.candidates += 1;

        let serialized = serialize::behavior_form(candidate.behavior, form);
        if pattern.matches(&serialized) && aggregator.push(behavior_hit(&candidate)) {
            outcome.matched += 1;
        }
    }
    Ok(outcome)
}

fn filter_matches(filter: Option<&BehaviorType>, behavior: &Behavior) -> bool {
    match filter {
        None => true,
        Some(t) => behavior.type_name == t.name && behavior.module == t.module,
    }
}

fn behavior_hit(candidate: &Candidate<'_>) -> EntityHit {
    let behavior = candidate.behavior;
    EntityHit {
        name: candidate.node.name.clone(),
        kind: EntityKind::Behavior,
        type_name: Some(behavior.type_name.clone()),
        session_id: Some(behavior.session_id),
        persistent: (behavior.file_id != 0)
            .then(|| PersistentId::new(candidate.container.guid.clone(), behavior.file_id)),
        origin: candidate.container.name.clone(),
        path: Some(candidate.container.path.clone()),
    }
}
