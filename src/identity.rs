use crate::error::SearchError;
use crate::model::{EntityHit, PersistentId, SearchTarget, SessionId};
use blake3::Hasher;

/// The literal text pattern a serialized reference to an entity must
/// contain. Tagged variant, never a type hierarchy: the matcher and the
/// serializer adapter branch on the tag only.
///
/// `Session` is valid only while matching other in-memory entities of the
/// same runtime session. `Persistent` is required whenever the candidate
/// text was serialized to disk or comes from a different session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityToken {
    Session(SessionId),
    Persistent(PersistentId),
}

impl IdentityToken {
    /// Canonical literal rendering, matching the serializer adapter's
    /// output byte for byte.
    ///
    /// A session reference serializes as `{"sessionId":<n>}` and a
    /// persistent reference as `{"fileId":<n>,"guid":"<hex>"}`, so the
    /// renderings below appear verbatim inside any serialized reference to
    /// the entity.
    pub fn render(&self) -> String {
        match self {
            IdentityToken::Session(id) => format!("\"sessionId\":{id}"),
            IdentityToken::Persistent(p) => {
                format!("\"fileId\":{},\"guid\":\"{}\"", p.file_id, p.guid)
            }
        }
    }
}

/// Session-local token for a live target. `None` when the target carries no
/// session identity (a repository asset addressed without a live instance).
pub fn session_token(target: &SearchTarget) -> Option<IdentityToken> {
    target.session_id.map(IdentityToken::Session)
}

/// Persistent token for a repository-backed target.
///
/// Fails with `NotInRepository` when the target was never saved to a
/// repository-tracked document. Recoverable: the caller falls back to
/// session-local matching or aborts with a user message.
pub fn persistent_token(target: &SearchTarget) -> Result<IdentityToken, SearchError> {
    match &target.persistent {
        Some(p) if p.file_id != 0 && !p.guid.is_empty() => {
            Ok(IdentityToken::Persistent(p.clone()))
        }
        _ => Err(SearchError::NotInRepository),
    }
}

/// Preferred token for live matching: persistent when the target is
/// repository-backed, else its session token.
pub fn resolve(target: &SearchTarget) -> Result<IdentityToken, SearchError> {
    if let Ok(token) = persistent_token(target) {
        return Ok(token);
    }
    session_token(target).ok_or(SearchError::NotInRepository)
}

/// Dedup key for a hit: the rendered persistent token when present, else
/// the rendered session token. `None` for a hit with no identity at all,
/// which the aggregator refuses.
pub fn hit_key(hit: &EntityHit) -> Option<String> {
    if let Some(p) = &hit.persistent {
        if p.file_id != 0 || !p.guid.is_empty() {
            return Some(IdentityToken::Persistent(p.clone()).render());
        }
    }
    hit.session_id
        .map(|id| IdentityToken::Session(id).render())
}

/// Repository guid for a container path: first 32 hex chars of the blake3
/// hash of the repository-relative path. Stable across sessions as long as
/// the document does not move.
pub fn guid_for_path(rel_path: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(rel_path.as_bytes());
    hasher.finalize().to_hex()[..32].to_string()
}
