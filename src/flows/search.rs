use crate::api::{ApiError, DirectoryApi};
use crate::consts::SEARCH_FAILED;
use crate::model::{Profile, VerificationBadge};

/// Where the last query left the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing searched yet.
    Idle,
    /// The query matched this many profiles.
    Results(usize),
    /// The query succeeded and matched nobody.
    NoMatches,
    /// The query itself failed; the user should try again.
    Failed(String),
}

/// The current result set of a directory search. Each query replaces it
/// wholesale.
#[derive(Debug, Clone)]
pub struct SearchView {
    results: Vec<Profile>,
    status: SearchStatus,
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            status: SearchStatus::Idle,
        }
    }

    pub fn results(&self) -> &[Profile] {
        &self.results
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn count(&self) -> usize {
        self.results.len()
    }

    /// Run a free-text query. An empty keyword lists everyone visible.
    pub async fn search(&mut self, api: &dyn DirectoryApi, keyword: &str) -> &SearchStatus {
        let keyword = keyword.trim();
        tracing::debug!(keyword, "directory search");
        let outcome = api.search(keyword).await;
        self.apply(outcome)
    }

    /// List every visible profile holding exactly `badge`.
    pub async fn filter_by_badge(
        &mut self,
        api: &dyn DirectoryApi,
        badge: VerificationBadge,
    ) -> &SearchStatus {
        tracing::debug!(%badge, "badge filter");
        let outcome = api.filter_by_badge(badge).await;
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: Result<Vec<Profile>, ApiError>) -> &SearchStatus {
        match outcome {
            Ok(results) => {
                self.status = if results.is_empty() {
                    SearchStatus::NoMatches
                } else {
                    SearchStatus::Results(results.len())
                };
                self.results = results;
            }
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                self.results.clear();
                self.status = SearchStatus::Failed(SEARCH_FAILED.to_string());
            }
        }
        &self.status
    }
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}
