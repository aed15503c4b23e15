use crate::providers::traits::MusicProvider;
use crate::providers::types::ProviderId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default per-provider fan-out timeouts. The video index gets the longest
/// window because its quota-priced calls are slow and expensive to waste;
/// the rich catalogs answer fast or not at all.
fn default_timeout(id: ProviderId) -> Duration {
    match id {
        ProviderId::Spotify => Duration::from_millis(4_000),
        ProviderId::Deezer => Duration::from_millis(4_000),
        ProviderId::Lastfm => Duration::from_millis(5_000),
        ProviderId::Youtube => Duration::from_millis(8_000),
        ProviderId::Fallback => Duration::from_millis(0),
    }
}

/// Registry of the configured provider adapters.
///
/// Owns one `Arc<dyn MusicProvider>` per upstream plus its enabled flag and
/// fan-out timeout. Built once at startup and shared by reference with the
/// aggregation engine.
pub struct ProviderManager {
    providers: RwLock<HashMap<ProviderId, RegisteredProvider>>,
}

struct RegisteredProvider {
    provider: Arc<dyn MusicProvider>,
    enabled: bool,
    timeout: Duration,
}

impl ProviderManager {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, provider: Arc<dyn MusicProvider>) {
        let id = provider.id();
        log::info!("Registering music provider: {} ({})", provider.name(), id);
        let mut providers = self.providers.write().await;
        providers.insert(
            id,
            RegisteredProvider {
                provider,
                enabled: true,
                timeout: default_timeout(id),
            },
        );
    }

    /// Override the fan-out timeout for one provider.
    pub async fn set_timeout(&self, id: ProviderId, timeout: Duration) {
        let mut providers = self.providers.write().await;
        if let Some(entry) = providers.get_mut(&id) {
            entry.timeout = timeout;
        }
    }

    pub async fn set_enabled(&self, id: ProviderId, enabled: bool) {
        let mut providers = self.providers.write().await;
        if let Some(entry) = providers.get_mut(&id) {
            entry.enabled = enabled;
            log::info!(
                "Provider {} {}",
                id,
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    pub async fn get(&self, id: ProviderId) -> Option<Arc<dyn MusicProvider>> {
        let providers = self.providers.read().await;
        providers
            .get(&id)
            .filter(|e| e.enabled)
            .map(|e| e.provider.clone())
    }

    /// Enabled providers in `order`, each with its fan-out timeout.
    pub async fn enabled_in_order(
        &self,
        order: &[ProviderId],
    ) -> Vec<(Arc<dyn MusicProvider>, Duration)> {
        let providers = self.providers.read().await;
        order
            .iter()
            .filter_map(|id| providers.get(id))
            .filter(|e| e.enabled)
            .map(|e| (e.provider.clone(), e.timeout))
            .collect()
    }

    pub async fn list(&self) -> Vec<ProviderId> {
        let providers = self.providers.read().await;
        providers.keys().copied().collect()
    }
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}
