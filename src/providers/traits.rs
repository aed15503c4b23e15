use crate::errors::ProviderError;
use crate::models::Track;
use crate::providers::ProviderId;
use async_trait::async_trait;

#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Stable identifier ("spotify", "youtube", ...)
    fn id(&self) -> ProviderId;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Free-text search. Returns at most `limit` well-formed tracks.
    ///
    /// Adapters report failures as typed errors; the aggregator boundary is
    /// the only place those collapse into empty lists.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError>;

    /// Genre-oriented browse. `genre` is always a canonical vocabulary
    /// entry by the time it reaches an adapter.
    ///
    /// Default implementation reuses search with a genre query, which is
    /// adequate for providers without a dedicated genre surface.
    async fn recommend_by_genre(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        self.search(&format!("{} music", genre), limit).await
    }
}
