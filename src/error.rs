use thiserror::Error;

/// Recoverable engine errors surfaced to the calling host layer.
///
/// Everything here is a user-facing condition, not a fault: the caller is
/// expected to message the user and either retry with different parameters
/// or fall back (e.g. session-local matching after `NotInRepository`).
#[derive(Debug, Error)]
pub enum SearchError {
    /// The target was never saved to a repository-tracked document, so it
    /// has no persistent identity to match against disk contents.
    #[error("target has no repository identity; only session-local matching is possible")]
    NotInRepository,

    /// The requested behavior-type filter resolved to a type that cannot be
    /// attached to a node.
    #[error("type '{type_name}' is not an attachable behavior type")]
    UnsupportedFilterType { type_name: String },

    /// A short type name matched declarations in more than one module.
    #[error("type '{type_name}' is declared in more than one module: {}", modules.join(", "))]
    AmbiguousTypeResolution {
        type_name: String,
        modules: Vec<String>,
    },

    /// The behavior-type filter did not match any registered type.
    #[error("unknown behavior type: '{type_name}'")]
    UnknownFilterType { type_name: String },

    /// Revert-to-template requested across more than one owning document.
    #[error("revert requires a single owning document, selection spans {owners}")]
    MultiOwnerRevert { owners: usize },

    /// The registry could not open a requested container.
    #[error("container unavailable: {path}: {reason}")]
    ContainerUnavailable { path: String, reason: String },

    /// The request itself was malformed (missing target/query for the mode).
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}
