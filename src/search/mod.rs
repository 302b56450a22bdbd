use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::models::{CatalogRecord, MediaKind, SearchResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Catalog search enriched with the user's local entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: String, limit: u32) -> ApiResult<SearchResponse>;
}

#[derive(Clone)]
pub struct SearchClient {
    http: HttpClient,
}

impl SearchClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /{kind}/search?q=&limit=`
    #[instrument(skip(self))]
    pub async fn search_kind(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
    ) -> ApiResult<SearchResponse> {
        let path = format!(
            "{}/search?q={}&limit={}",
            kind.route(),
            urlencoding::encode(query),
            limit
        );
        self.http.get_json(&path).await
    }
}

#[async_trait]
impl SearchBackend for SearchClient {
    /// `GET /search?q=&limit=`
    #[instrument(skip(self))]
    async fn search(&self, query: String, limit: u32) -> ApiResult<SearchResponse> {
        let path = format!("/search?q={}&limit={}", urlencoding::encode(&query), limit);
        let response: SearchResponse = self.http.get_json(&path).await?;
        info!(
            "Search '{}' returned {} of {} results",
            query,
            response.results.len(),
            response.total
        );
        Ok(response)
    }
}

pub fn route_for(result: &CatalogRecord) -> String {
    format!("{}/{}", result.kind.route(), result.tmdb_id)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Results(SearchResponse),
}

/// Delays keystroke-driven searches until the input has been quiet for a
/// while. Each new input cancels the pending timer; requests already sent are
/// not cancelled, so a slow response can still land after a newer one.
pub struct SearchDebouncer {
    backend: Arc<dyn SearchBackend>,
    quiet: Duration,
    limit: u32,
    pending: Option<JoinHandle<()>>,
    state: watch::Sender<SearchState>,
}

impl SearchDebouncer {
    pub fn new(backend: Arc<dyn SearchBackend>, quiet: Duration, limit: u32) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            backend,
            quiet,
            limit,
            pending: None,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Must be called from within a tokio runtime.
    pub fn input(&mut self, query: impl Into<String>) {
        self.cancel_pending();

        let query = query.into();
        let backend = Arc::clone(&self.backend);
        let state = self.state.clone();
        let quiet = self.quiet;
        let limit = self.limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;

            let trimmed = query.trim();
            if trimmed.is_empty() {
                state.send_replace(SearchState::Idle);
                return;
            }

            debug!("Searching for '{}'", trimmed);
            state.send_replace(SearchState::Loading);
            match backend.search(trimmed.to_string(), limit).await {
                Ok(response) => {
                    state.send_replace(SearchState::Results(response));
                }
                Err(e) => {
                    error!("Search failed: {}", e);
                    state.send_replace(SearchState::Idle);
                }
            }
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_pending();
        self.state.send_replace(SearchState::Idle);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::server_error;

    fn response(query: &str) -> SearchResponse {
        SearchResponse {
            query: query.to_string(),
            limit: 10,
            total: 1,
            results: vec![CatalogRecord {
                kind: MediaKind::Movie,
                tmdb_id: 438631,
                title: "Dune".to_string(),
                ..Default::default()
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_the_last_input_is_searched() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_search()
            .withf(|q, limit| q == "dune" && *limit == 10)
            .times(1)
            .returning(|q, _| Ok(response(&q)));

        let mut debouncer = SearchDebouncer::new(Arc::new(backend), Duration::from_millis(300), 10);
        let mut rx = debouncer.subscribe();

        debouncer.input("d");
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.input("du");
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.input("dune ");

        tokio::time::advance(Duration::from_millis(299)).await;
        tokio::task::yield_now().await;
        assert!(!rx.has_changed().unwrap());

        let state = rx
            .wait_for(|s| matches!(s, SearchState::Results(_)))
            .await
            .unwrap()
            .clone();
        match state {
            SearchState::Results(r) => assert_eq!(r.query, "dune"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_without_request() {
        let mut backend = MockSearchBackend::new();
        backend.expect_search().never();

        let mut debouncer = SearchDebouncer::new(Arc::new(backend), Duration::from_millis(300), 10);
        let mut rx = debouncer.subscribe();

        debouncer.input("   ");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_clears_results() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_search()
            .times(1)
            .returning(|_, _| Err(server_error()));

        let mut debouncer = SearchDebouncer::new(Arc::new(backend), Duration::from_millis(300), 10);
        let mut rx = debouncer.subscribe();

        debouncer.input("matrix");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SearchState::Idle);
        drop(debouncer);
    }

    #[test]
    fn test_route_for_result() {
        let mut record = response("x").results.remove(0);
        assert_eq!(route_for(&record), "/movie/438631");
        record.kind = MediaKind::Series;
        assert_eq!(route_for(&record), "/serie/438631");
    }
}
