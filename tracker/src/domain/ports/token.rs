//! Token source port trait

use async_trait::async_trait;

use crate::domain::entities::Credential;
use crate::error::TokenError;

/// Produces a fresh persisted-query credential.
///
/// Each call is a full, independent acquisition; sharing and caching are
/// handled by `app::CredentialProvider`.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<Credential, TokenError>;
}
