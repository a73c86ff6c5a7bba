//! Persisted-query credential

/// Opaque token accepted by the content API as `persistedQuery.sha256Hash`.
///
/// Its validity window is unknown; expiry is only discovered when the API
/// answers with a stale-credential error.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "Credential({}…)", prefix)
    }
}
