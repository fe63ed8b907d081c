use refscan::document::{EntityRef, FieldValue, Workspace};
use refscan::error::SearchError;
use refscan::identity;
use refscan::model::{EntityKind, SearchTarget};
use refscan::progress::{CancelFlag, NullObserver};
use refscan::session::{self, SearchMode, SearchRequest};
use tempfile::TempDir;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn hero_guid() -> String {
    identity::guid_for_path("assets/hero.asset")
}

/// Corpus: an arena scene whose Turret spawner references the hero asset,
/// and the hero asset document itself.
fn build_corpus(root: &std::path::Path) {
    write(
        root,
        "scenes/arena.scene",
        &format!(
            r#"{{"name":"Arena","roots":[
                {{"name":"Player","fileId":100,"behaviors":[
                    {{"type":"Health","module":"combat","fileId":101,"fields":{{"max":100}}}}]}},
                {{"name":"Turret","fileId":110,"behaviors":[
                    {{"type":"Spawner","module":"combat","fileId":111,
                      "fields":{{"prefab":{{"fileId":42,"guid":"{guid}"}}}}}}]}}
            ]}}"#,
            guid = hero_guid()
        ),
    );
    write(
        root,
        "assets/hero.asset",
        r#"{"name":"HeroDoc","roots":[{"name":"Hero","fileId":42,"behaviors":[]}]}"#,
    );
}

fn live_request(target: SearchTarget, type_filter: Option<&str>) -> SearchRequest {
    SearchRequest {
        target: Some(target),
        query: None,
        root: String::new(),
        extension: String::new(),
        mode: SearchMode::LiveScan,
        type_filter: type_filter.map(str::to_string),
    }
}

#[test]
fn repository_target_matches_referencing_behavior() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());
    let mut workspace = Workspace::new(dir.path());
    workspace.open("scenes/arena.scene").unwrap();
    workspace.open("assets/hero.asset").unwrap();

    let target = workspace.find_target(&hero_guid(), 42).expect("hero loaded");
    assert_eq!(target.name, "Hero");

    let result = session::start_search(
        &mut workspace,
        &live_request(target, None),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();

    assert_eq!(result.hits.len(), 1);
    let hit = &result.hits[0];
    assert_eq!(hit.name, "Turret");
    assert_eq!(hit.kind, EntityKind::Behavior);
    assert_eq!(hit.type_name.as_deref(), Some("Spawner"));
    assert_eq!(hit.origin, "Arena");

    // The full result set became the host's active selection.
    assert_eq!(workspace.active_selection(), &[hit.session_id.unwrap()]);
}

#[test]
fn session_target_matches_through_runtime_form() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());
    let mut workspace = Workspace::new(dir.path());
    workspace.open("scenes/arena.scene").unwrap();

    // Host wires a runtime-only reference into the Player's Health.
    let ghost_session = 9999;
    let arena = workspace.container_mut("scenes/arena.scene").unwrap();
    arena.roots[0].behaviors[0].fields.insert(
        "buddy".to_string(),
        FieldValue::Ref(EntityRef::to_session(ghost_session)),
    );

    let target = SearchTarget::live("ghost", ghost_session);
    let result = session::start_search(
        &mut workspace,
        &live_request(target, None),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();

    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.hits[0].name, "Player");
    assert_eq!(result.hits[0].type_name.as_deref(), Some("Health"));
}

#[test]
fn type_filter_narrows_candidates() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());
    let mut workspace = Workspace::new(dir.path());
    workspace.open("scenes/arena.scene").unwrap();
    workspace.open("assets/hero.asset").unwrap();
    let target = workspace.find_target(&hero_guid(), 42).unwrap();

    // The reference lives on a Spawner; filtering to Health finds nothing.
    let result = session::start_search(
        &mut workspace,
        &live_request(target.clone(), Some("combat::Health")),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();
    assert!(result.hits.is_empty());

    let result = session::start_search(
        &mut workspace,
        &live_request(target, Some("combat::Spawner")),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();
    assert_eq!(result.hits.len(), 1);
}

#[test]
fn filter_resolution_errors_abort_before_scanning() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());
    let mut workspace = Workspace::new(dir.path());
    workspace.open("scenes/arena.scene").unwrap();
    workspace.types_mut().register("ui", "Health", true);
    workspace.types_mut().register("assets", "Palette", false);

    let target = SearchTarget::repository("hero", refscan::model::PersistentId::new(hero_guid(), 42));

    let err = session::start_search(
        &mut workspace,
        &live_request(target.clone(), Some("Health")),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SearchError::AmbiguousTypeResolution { .. }));

    let err = session::start_search(
        &mut workspace,
        &live_request(target.clone(), Some("Palette")),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SearchError::UnsupportedFilterType { .. }));

    let err = session::start_search(
        &mut workspace,
        &live_request(target, Some("Nonesuch")),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SearchError::UnknownFilterType { .. }));
}

#[test]
fn repeated_live_scans_are_idempotent() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());
    let mut workspace = Workspace::new(dir.path());
    workspace.open("scenes/arena.scene").unwrap();
    workspace.open("assets/hero.asset").unwrap();
    let target = workspace.find_target(&hero_guid(), 42).unwrap();

    let first = session::start_search(
        &mut workspace,
        &live_request(target.clone(), None),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();
    let second = session::start_search(
        &mut workspace,
        &live_request(target, None),
        &mut NullObserver,
        &CancelFlag::new(),
    )
    .unwrap();

    let names = |r: &refscan::model::SearchResult| -> Vec<String> {
        r.hits.iter().map(|h| h.name.clone()).collect()
    };
    assert_eq!(names(&first), names(&second));
    let groups = |r: &refscan::model::SearchResult| -> Vec<String> {
        r.groups.iter().map(|g| g.origin.clone()).collect()
    };
    assert_eq!(groups(&first), groups(&second));
}
