use crate::error::SearchError;
use crate::identity;
use crate::model::{LoadState, PersistentId, SearchTarget, SessionId};
use crate::selection::Revert;
use crate::util;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A serialized reference field. On disk only the persistent identity is
/// written; the session id is filled in after load when the referent is
/// resolvable among the loaded containers.
///
/// A referent that was never saved serializes as fileId 0 with an empty
/// guid, so persistent-token matching can never hit a never-saved entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "fileId")]
    pub file_id: i64,
    pub guid: String,
    #[serde(skip)]
    pub session: Option<SessionId>,
}

impl EntityRef {
    pub fn to_persistent(persistent: PersistentId) -> Self {
        Self {
            file_id: persistent.file_id,
            guid: persistent.guid,
            session: None,
        }
    }

    /// Reference to a live entity that has never been saved.
    pub fn to_session(session_id: SessionId) -> Self {
        Self {
            file_id: 0,
            guid: String::new(),
            session: Some(session_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Ref(EntityRef),
    List(Vec<FieldValue>),
}

/// A behavior instance attached to a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Behavior {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub module: String,
    /// Local id within the owning container document; 0 if never saved.
    #[serde(rename = "fileId", default)]
    pub file_id: i64,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(skip)]
    pub session_id: SessionId,
    /// Field values the instance was loaded with; restored by revert.
    #[serde(skip)]
    pub template: Option<BTreeMap<String, FieldValue>>,
}

impl Revert for Behavior {
    fn revert(&mut self) {
        if let Some(template) = &self.template {
            self.fields = template.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(rename = "fileId", default)]
    pub file_id: i64,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(skip)]
    pub session_id: SessionId,
}

/// On-disk form of a container document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDoc {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<Node>,
}

/// A loaded document: a tree of nodes plus its repository identity.
#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    /// Repository-relative path, forward slashes.
    pub path: String,
    pub guid: String,
    pub load_state: LoadState,
    pub roots: Vec<Node>,
}

/// Visit every (node, behavior) pair under the given roots, depth-first.
pub fn each_behavior<'a>(roots: &'a [Node], f: &mut impl FnMut(&'a Node, &'a Behavior)) {
    for node in roots {
        for behavior in &node.behaviors {
            f(node, behavior);
        }
        each_behavior(&node.children, f);
    }
}

fn each_node_mut(roots: &mut [Node], f: &mut impl FnMut(&mut Node)) {
    for node in roots {
        f(node);
        each_node_mut(&mut node.children, f);
    }
}

fn each_ref_mut(fields: &mut BTreeMap<String, FieldValue>, f: &mut impl FnMut(&mut EntityRef)) {
    fn visit(value: &mut FieldValue, f: &mut impl FnMut(&mut EntityRef)) {
        match value {
            FieldValue::Ref(r) => f(r),
            FieldValue::List(items) => {
                for item in items {
                    visit(item, f);
                }
            }
            _ => {}
        }
    }
    for value in fields.values_mut() {
        visit(value, f);
    }
}

/// A behavior type declared by some loaded module.
#[derive(Debug, Clone)]
pub struct BehaviorType {
    pub module: String,
    pub name: String,
    pub attachable: bool,
}

/// Registry of behavior types known to the host. Filter names resolve here
/// before a scan starts; a short name declared in more than one module is
/// an ambiguity the caller must qualify away.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<BehaviorType>,
}

impl TypeRegistry {
    pub fn register(&mut self, module: &str, name: &str, attachable: bool) {
        if self
            .types
            .iter()
            .any(|t| t.module == module && t.name == name)
        {
            return;
        }
        self.types.push(BehaviorType {
            module: module.to_string(),
            name: name.to_string(),
            attachable,
        });
    }

    /// Resolve a filter name, either qualified (`module::Name`) or short.
    pub fn resolve(&self, raw: &str) -> Result<&BehaviorType, SearchError> {
        let found: Vec<&BehaviorType> = match raw.split_once("::") {
            Some((module, name)) => self
                .types
                .iter()
                .filter(|t| t.module == module && t.name == name)
                .collect(),
            None => self.types.iter().filter(|t| t.name == raw).collect(),
        };
        match found.as_slice() {
            [] => Err(SearchError::UnknownFilterType {
                type_name: raw.to_string(),
            }),
            [only] => {
                if only.attachable {
                    Ok(only)
                } else {
                    Err(SearchError::UnsupportedFilterType {
                        type_name: raw.to_string(),
                    })
                }
            }
            many => Err(SearchError::AmbiguousTypeResolution {
                type_name: raw.to_string(),
                modules: many.iter().map(|t| t.module.clone()).collect(),
            }),
        }
    }
}

/// The host environment's document system: owns the set of loaded
/// containers, allocates session ids, assigns repository identity, and
/// tracks the active container and active selection. The engine only ever
/// sees it through the `ContainerRegistry` trait.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    containers: Vec<Container>,
    types: TypeRegistry,
    next_session: SessionId,
    active: Option<String>,
    active_selection: Vec<SessionId>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            containers: Vec::new(),
            types: TypeRegistry::default(),
            next_session: 1,
            active: None,
            active_selection: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, rel_path: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.path == rel_path)
    }

    /// Mutable access for the host; the engine itself never mutates nodes.
    pub fn container_mut(&mut self, rel_path: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.path == rel_path)
    }

    pub fn is_loaded(&self, rel_path: &str) -> bool {
        self.container(rel_path).is_some()
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active(&mut self, rel_path: &str) {
        if self.is_loaded(rel_path) {
            self.active = Some(rel_path.to_string());
        }
    }

    pub fn active_selection(&self) -> &[SessionId] {
        &self.active_selection
    }

    pub fn set_active_selection(&mut self, ids: Vec<SessionId>) {
        self.active_selection = ids;
    }

    /// Load a container document from disk, or return it if already loaded.
    /// The first container opens as `Loaded`; later ones open additively.
    pub fn open(&mut self, rel_path: &str) -> Result<&Container, SearchError> {
        if let Some(idx) = self.containers.iter().position(|c| c.path == rel_path) {
            return Ok(&self.containers[idx]);
        }

        let abs = self.root.join(rel_path);
        let text =
            util::read_to_string(&abs).map_err(|err| SearchError::ContainerUnavailable {
                path: rel_path.to_string(),
                reason: err.to_string(),
            })?;
        let doc: ContainerDoc =
            serde_json::from_str(&text).map_err(|err| SearchError::ContainerUnavailable {
                path: rel_path.to_string(),
                reason: err.to_string(),
            })?;

        let load_state = if self.containers.is_empty() {
            LoadState::Loaded
        } else {
            LoadState::LoadedAdditive
        };

        let mut roots = doc.roots;
        self.adopt(&mut roots);

        let idx = self.containers.len();
        self.containers.push(Container {
            name: doc.name,
            path: rel_path.to_string(),
            guid: identity::guid_for_path(rel_path),
            load_state,
            roots,
        });
        if self.active.is_none() {
            self.active = Some(rel_path.to_string());
        }
        self.resolve_refs();
        Ok(&self.containers[idx])
    }

    /// Unload a container. Returns false when it was not loaded.
    pub fn close(&mut self, rel_path: &str) -> bool {
        let before = self.containers.len();
        self.containers.retain(|c| c.path != rel_path);
        if self.active.as_deref() == Some(rel_path) {
            self.active = None;
        }
        self.containers.len() != before
    }

    /// Assign fresh session ids, snapshot revert templates, and register
    /// encountered behavior types.
    fn adopt(&mut self, roots: &mut [Node]) {
        let mut next = self.next_session;
        let types = &mut self.types;
        each_node_mut(roots, &mut |node| {
            node.session_id = next;
            next += 1;
            for behavior in &mut node.behaviors {
                behavior.session_id = next;
                next += 1;
                behavior.template = Some(behavior.fields.clone());
                types.register(&behavior.module, &behavior.type_name, true);
            }
        });
        self.next_session = next;
    }

    /// Fill in session ids on references whose persistent identity resolves
    /// among the loaded containers. Re-run after every open so earlier
    /// containers pick up referents from later ones.
    fn resolve_refs(&mut self) {
        let mut by_persistent: HashMap<(String, i64), SessionId> = HashMap::new();
        for container in &self.containers {
            each_behavior(&container.roots, &mut |node, behavior| {
                if node.file_id != 0 {
                    by_persistent
                        .entry((container.guid.clone(), node.file_id))
                        .or_insert(node.session_id);
                }
                if behavior.file_id != 0 {
                    by_persistent
                        .entry((container.guid.clone(), behavior.file_id))
                        .or_insert(behavior.session_id);
                }
            });
        }
        for container in &mut self.containers {
            each_node_mut(&mut container.roots, &mut |node| {
                for behavior in &mut node.behaviors {
                    each_ref_mut(&mut behavior.fields, &mut |r| {
                        if r.session.is_none() && r.file_id != 0 {
                            if let Some(id) = by_persistent.get(&(r.guid.clone(), r.file_id)) {
                                r.session = Some(*id);
                            }
                        }
                    });
                }
            });
        }
    }

    /// Build a search target from a loaded entity addressed by persistent
    /// identity. Returns None when nothing loaded carries that identity.
    pub fn find_target(&self, guid: &str, file_id: i64) -> Option<SearchTarget> {
        fn visit(
            nodes: &[Node],
            guid: &str,
            file_id: i64,
        ) -> Option<SearchTarget> {
            for node in nodes {
                if node.file_id == file_id {
                    return Some(SearchTarget {
                        name: node.name.clone(),
                        session_id: Some(node.session_id),
                        persistent: Some(PersistentId::new(guid, file_id)),
                    });
                }
                for behavior in &node.behaviors {
                    if behavior.file_id == file_id {
                        return Some(SearchTarget {
                            name: format!("{} ({})", node.name, behavior.type_name),
                            session_id: Some(behavior.session_id),
                            persistent: Some(PersistentId::new(guid, file_id)),
                        });
                    }
                }
                if let Some(found) = visit(&node.children, guid, file_id) {
                    return Some(found);
                }
            }
            None
        }
        self.containers
            .iter()
            .filter(|c| c.guid == guid)
            .find_map(|c| visit(&c.roots, guid, file_id))
    }
}
