use crate::aggregate::Aggregator;
use crate::document::BehaviorType;
use crate::error::SearchError;
use crate::identity;
use crate::matcher::Pattern;
use crate::model::{EntityHit, EntityKind, PersistentId, SearchResult, SearchTarget};
use crate::progress::{CancelFlag, SearchObserver};
use crate::registry::ContainerRegistry;
use crate::scan::files::{self, FileScanOptions};
use crate::scan::live::{self, LiveScanOptions};
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Match against the currently loaded containers only.
    LiveScan,
    /// Match against file contents under the search root.
    FileScan,
    /// File scan, then open each matched container and scan it live,
    /// closing scan-opened containers that held nothing.
    FileScanThenLiveLoad,
}

/// Parameters for one search invocation. The engine keeps no memory of
/// prior invocations; the host passes the same shape every time.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Entity to find references to. Required for every mode except a
    /// free-text file scan.
    pub target: Option<SearchTarget>,
    /// Free-text needle for file scans; takes precedence over the target.
    pub query: Option<String>,
    /// Repository-relative subtree to file-scan; empty scans everything.
    pub root: String,
    /// File extension filter including the dot; empty matches every file.
    pub extension: String,
    pub mode: SearchMode,
    /// Behavior-type filter for live scanning, short or `module::Name`.
    pub type_filter: Option<String>,
}

/// Run one search to completion (or cancellation) against the host's
/// container registry.
///
/// Recoverable conditions (`NotInRepository`, filter-resolution failures,
/// malformed requests) come back as errors before any scanning starts.
/// On completion the full result set is republished as the host's active
/// selection and `on_complete` fires; a cancelled scan fires `on_cancelled`
/// instead and returns the partial result with `cancelled` set.
pub fn start_search(
    registry: &mut dyn ContainerRegistry,
    request: &SearchRequest,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<SearchResult, SearchError> {
    let filter = match &request.type_filter {
        Some(raw) => Some(registry.types().resolve(raw)?.clone()),
        None => None,
    };

    let result = match request.mode {
        SearchMode::LiveScan => run_live(registry, request, filter.as_ref(), observer, cancel)?,
        SearchMode::FileScan => run_files(registry, request, observer, cancel)?,
        SearchMode::FileScanThenLiveLoad => {
            run_files_then_load(registry, request, filter.as_ref(), observer, cancel)?
        }
    };

    if result.cancelled {
        observer.on_cancelled();
    } else {
        republish(registry, &result);
        observer.on_complete(&result);
    }
    Ok(result)
}

/// Extend an existing session result into one more container: open it,
/// scan it live for the same target, and append deduplicated hits.
pub fn extend_search(
    registry: &mut dyn ContainerRegistry,
    result: &SearchResult,
    rel_path: &str,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<SearchResult, SearchError> {
    let target = result.context.clone();
    let was_loaded = registry.is_loaded(rel_path);
    registry.open(rel_path)?;

    let mut aggregator = Aggregator::resume(result);
    if !was_loaded {
        aggregator.stats.containers_opened += 1;
    }
    let options = LiveScanOptions {
        filter: None,
        restrict_to: Some(rel_path),
    };
    let outcome = live::scan_containers(
        &*registry,
        &target,
        &options,
        &mut aggregator,
        observer,
        cancel,
    )?;
    aggregator.stats.containers_scanned += outcome.containers_scanned;
    aggregator.stats.candidates_matched += outcome.matched;

    let merged = aggregator.finish(target, outcome.cancelled);
    if merged.cancelled {
        observer.on_cancelled();
    } else {
        republish(registry, &merged);
        observer.on_complete(&merged);
    }
    Ok(merged)
}

fn republish(registry: &mut dyn ContainerRegistry, result: &SearchResult) {
    let ids = result
        .hits
        .iter()
        .filter_map(|hit| hit.session_id)
        .collect();
    registry.set_active_selection(ids);
}

fn run_live(
    registry: &mut dyn ContainerRegistry,
    request: &SearchRequest,
    filter: Option<&BehaviorType>,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<SearchResult, SearchError> {
    let target = request.target.clone().ok_or_else(|| {
        SearchError::InvalidRequest("live scan requires a target entity".to_string())
    })?;
    let mut aggregator = Aggregator::new();
    let options = LiveScanOptions {
        filter,
        restrict_to: None,
    };
    let outcome = live::scan_containers(
        &*registry,
        &target,
        &options,
        &mut aggregator,
        observer,
        cancel,
    )?;
    aggregator.stats.containers_scanned += outcome.containers_scanned;
    aggregator.stats.candidates_matched += outcome.matched;
    Ok(aggregator.finish(target, outcome.cancelled))
}

fn run_files(
    registry: &mut dyn ContainerRegistry,
    request: &SearchRequest,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<SearchResult, SearchError> {
    let (target, pattern) = file_pattern(request)?;
    let scan_root = registry.root().join(&request.root);
    let options = FileScanOptions {
        extension: request.extension.clone(),
        ..Default::default()
    };
    let outcome = files::scan_files(&scan_root, &options, &pattern, observer, cancel);

    let mut aggregator = Aggregator::new();
    aggregator.stats.files_scanned = outcome.scanned;
    aggregator.stats.files_skipped = outcome.skipped;
    for rel in &outcome.matches {
        let repo_rel = util::join_rel(&request.root, rel);
        aggregator.push(asset_hit(&repo_rel));
    }
    Ok(aggregator.finish(target, outcome.cancelled))
}

fn run_files_then_load(
    registry: &mut dyn ContainerRegistry,
    request: &SearchRequest,
    filter: Option<&BehaviorType>,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> Result<SearchResult, SearchError> {
    let target = request.target.clone().ok_or_else(|| {
        SearchError::InvalidRequest("file-scan-then-live-load requires a target entity".to_string())
    })?;
    let token = identity::persistent_token(&target)?;
    let pattern = Pattern::token(&token);
    // Captured before any open so the originating container survives even
    // when this scan is what loaded the first container.
    let origin_path = registry.active_path().map(str::to_string);

    let scan_root = registry.root().join(&request.root);
    let options = FileScanOptions {
        extension: request.extension.clone(),
        ..Default::default()
    };
    let file_outcome = files::scan_files(&scan_root, &options, &pattern, observer, cancel);

    let mut aggregator = Aggregator::new();
    aggregator.stats.files_scanned = file_outcome.scanned;
    aggregator.stats.files_skipped = file_outcome.skipped;
    let mut cancelled = file_outcome.cancelled;

    let matched: Vec<String> = file_outcome
        .matches
        .iter()
        .map(|rel| util::join_rel(&request.root, rel))
        .collect();
    let total = matched.len();

    if !cancelled {
        for (idx, rel) in matched.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            observer.on_progress(rel, idx as f32 / total.max(1) as f32);

            // The matched document itself holds a serialized reference.
            aggregator.push(asset_hit(rel));

            let was_loaded = registry.is_loaded(rel);
            if let Err(err) = registry.open(rel) {
                eprintln!("refscan: {err}");
                aggregator.stats.files_skipped += 1;
                continue;
            }
            if !was_loaded {
                aggregator.stats.containers_opened += 1;
            }

            let options = LiveScanOptions {
                filter,
                restrict_to: Some(rel),
            };
            let outcome = live::scan_containers(
                &*registry,
                &target,
                &options,
                &mut aggregator,
                observer,
                cancel,
            )?;
            aggregator.stats.containers_scanned += outcome.containers_scanned;
            aggregator.stats.candidates_matched += outcome.matched;
            let hit_something = outcome.matched > 0;
            if outcome.cancelled {
                cancelled = true;
                break;
            }

            // Close only what this scan opened, and never the container
            // the search originated from.
            if !was_loaded
                && !hit_something
                && origin_path.as_deref() != Some(rel.as_str())
                && registry.close(rel)
            {
                aggregator.stats.containers_closed += 1;
            }
        }
    }
    Ok(aggregator.finish(target, cancelled))
}

fn file_pattern(request: &SearchRequest) -> Result<(SearchTarget, Pattern), SearchError> {
    if let Some(query) = &request.query {
        let target = SearchTarget {
            name: query.clone(),
            session_id: None,
            persistent: None,
        };
        return Ok((target, Pattern::text(query.clone())));
    }
    let target = request.target.clone().ok_or_else(|| {
        SearchError::InvalidRequest("file scan requires a target entity or a query".to_string())
    })?;
    let token = identity::persistent_token(&target)?;
    Ok((target, Pattern::token(&token)))
}

fn asset_hit(repo_rel: &str) -> EntityHit {
    EntityHit {
        name: util::display_name(repo_rel),
        kind: EntityKind::Asset,
        type_name: None,
        session_id: None,
        persistent: Some(PersistentId::new(identity::guid_for_path(repo_rel), 0)),
        origin: String::new(),
        path: Some(repo_rel.to_string()),
    }
}
