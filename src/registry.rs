use crate::document::{Container, TypeRegistry, Workspace};
use crate::error::SearchError;
use crate::model::SessionId;
use std::path::Path;

/// The engine's view of the host environment's open-container state.
///
/// Passed explicitly into every scan instead of living as ambient global
/// state. Opening a container here makes it visible to the rest of the host
/// environment; the engine never closes a container it did not open.
pub trait ContainerRegistry {
    /// Repository root; container paths are relative to it.
    fn root(&self) -> &Path;

    /// Currently loaded containers.
    fn list(&self) -> &[Container];

    fn open(&mut self, rel_path: &str) -> Result<&Container, SearchError>;

    fn close(&mut self, rel_path: &str) -> bool;

    fn is_loaded(&self, rel_path: &str) -> bool;

    /// Path of the container the host considers active (the one a search
    /// originates from). Never closed by the engine.
    fn active_path(&self) -> Option<&str>;

    /// Behavior types declared by the host's loaded modules.
    fn types(&self) -> &TypeRegistry;

    /// Host's active-selection concept; a completed search republishes its
    /// result set here.
    fn set_active_selection(&mut self, ids: Vec<SessionId>);
}

impl ContainerRegistry for Workspace {
    fn root(&self) -> &Path {
        Workspace::root(self)
    }

    fn list(&self) -> &[Container] {
        self.containers()
    }

    fn open(&mut self, rel_path: &str) -> Result<&Container, SearchError> {
        Workspace::open(self, rel_path)
    }

    fn close(&mut self, rel_path: &str) -> bool {
        Workspace::close(self, rel_path)
    }

    fn is_loaded(&self, rel_path: &str) -> bool {
        Workspace::is_loaded(self, rel_path)
    }

    fn active_path(&self) -> Option<&str> {
        Workspace::active_path(self)
    }

    fn types(&self) -> &TypeRegistry {
        Workspace::types(self)
    }

    fn set_active_selection(&mut self, ids: Vec<SessionId>) {
        Workspace::set_active_selection(self, ids)
    }
}
