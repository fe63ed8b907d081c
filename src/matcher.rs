use crate::identity::IdentityToken;

/// A prepared search pattern: either the canonical rendering of an identity
/// token or a raw free-text needle.
///
/// Matching is exact substring containment over serialized text, not
/// parsing. This is a heuristic with known limits: a serializer change to
/// field ordering or quoting produces false negatives, and token collisions
/// are theoretically possible (rendered tokens are high-entropy composites,
/// which makes them unlikely, not impossible).
#[derive(Debug, Clone)]
pub struct Pattern {
    literal: String,
}

impl Pattern {
    pub fn token(token: &IdentityToken) -> Self {
        Self {
            literal: token.render(),
        }
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Self {
            literal: needle.into(),
        }
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn matches(&self, serialized: &str) -> bool {
        !self.literal.is_empty() && serialized.contains(&self.literal)
    }
}
