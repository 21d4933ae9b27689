//! Application Default Credentials shared by the GCS and Vision clients
use gcp_auth::TokenProvider;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lazily initialized ADC token provider
#[derive(Clone, Default)]
pub struct GcpCredentials {
    provider: Arc<RwLock<Option<Arc<dyn TokenProvider>>>>,
}

impl GcpCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an access token for the given scopes
    pub async fn access_token(&self, scopes: &[&str]) -> Result<String, gcp_auth::Error> {
        let provider = self.provider().await?;
        let token = provider.token(scopes).await?;
        Ok(token.as_str().to_string())
    }

    async fn provider(&self) -> Result<Arc<dyn TokenProvider>, gcp_auth::Error> {
        if let Some(provider) = self.provider.read().await.as_ref() {
            return Ok(provider.clone());
        }

        let mut guard = self.provider.write().await;
        if let Some(provider) = guard.as_ref() {
            return Ok(provider.clone());
        }

        let provider = gcp_auth::provider().await?;
        *guard = Some(provider.clone());
        Ok(provider)
    }
}

impl std::fmt::Debug for GcpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpCredentials").finish_non_exhaustive()
    }
}
