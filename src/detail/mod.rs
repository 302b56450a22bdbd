use crate::api::MediaStore;
use crate::controller::{
    next_watch_state, LoadState, MutationOutcome, PointerButton, PointerEvent, WatchState,
};
use crate::error::ApiResult;
use crate::models::{CatalogRecord, CreateFromCatalog, LocalEntry, MediaKind, Rating, UpdateEntry};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct DetailView {
    kind: MediaKind,
    tmdb_id: i64,
    state: LoadState<CatalogRecord>,
    saving: bool,
    user_rating: Option<Rating>,
    user_review: String,
    last_error: Option<String>,
}

impl DetailView {
    pub fn new(kind: MediaKind, tmdb_id: i64) -> Self {
        Self {
            kind,
            tmdb_id,
            state: LoadState::Loading,
            saving: false,
            user_rating: None,
            user_review: String::new(),
            last_error: None,
        }
    }

    pub async fn open(store: &dyn MediaStore, tmdb_id: i64) -> Self {
        let mut view = Self::new(store.kind(), tmdb_id);
        view.load(store).await;
        view
    }

    /// Fetches the catalog record. Failure is terminal for this view; there
    /// is no automatic retry.
    pub async fn load(&mut self, store: &dyn MediaStore) {
        self.state = LoadState::Loading;
        match store.get_by_catalog_id(self.tmdb_id).await {
            Ok(record) => self.reconcile(record),
            Err(e) => {
                error!("Error loading {} {}: {}", self.kind, self.tmdb_id, e);
                self.state = LoadState::Error(self.load_error_message().to_string());
            }
        }
    }

    /// Installs a fetched record and seeds the rating and review scratch
    /// state from its local entry, or from defaults when there is none.
    pub fn reconcile(&mut self, record: CatalogRecord) {
        let record = record.normalized(self.kind);
        self.user_rating = record.local.as_ref().and_then(|l| l.rating);
        self.user_review = record
            .local
            .as_ref()
            .and_then(|l| l.review.clone())
            .unwrap_or_default();
        self.state = LoadState::Ready(record);
    }

    pub fn load_error_message(&self) -> &'static str {
        match self.kind {
            MediaKind::Movie => "Impossible de charger les détails du film",
            MediaKind::Series => "Impossible de charger les détails de la série",
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn state(&self) -> &LoadState<CatalogRecord> {
        &self.state
    }

    pub fn record(&self) -> Option<&CatalogRecord> {
        self.state.ready()
    }

    pub fn local(&self) -> Option<&LocalEntry> {
        self.record().and_then(|r| r.local.as_ref())
    }

    pub fn has_local_entry(&self) -> bool {
        self.local().is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn user_rating(&self) -> Option<Rating> {
        self.user_rating
    }

    pub fn user_rating_value(&self) -> f64 {
        self.user_rating.map(Rating::value).unwrap_or(0.0)
    }

    pub fn user_review(&self) -> &str {
        &self.user_review
    }

    pub fn set_user_review(&mut self, review: impl Into<String>) {
        self.user_review = review.into();
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn can_mutate(&self) -> bool {
        if self.saving {
            debug!("Save already in flight for {} {}", self.kind, self.tmdb_id);
            return false;
        }
        self.record().is_some()
    }

    fn adopt_local(&mut self, entry: LocalEntry) {
        let next = match &self.state {
            LoadState::Ready(record) => CatalogRecord {
                local: Some(entry),
                ..record.clone()
            },
            _ => return,
        };
        self.state = LoadState::Ready(next);
    }

    fn settle(
        &mut self,
        result: ApiResult<LocalEntry>,
        action: &str,
        message: &str,
    ) -> MutationOutcome {
        self.saving = false;
        match result {
            Ok(entry) => {
                info!("{} saved for {} {}", action, self.kind, self.tmdb_id);
                self.last_error = None;
                self.adopt_local(entry);
                MutationOutcome::Saved
            }
            Err(e) => {
                error!("Error saving {} for {} {}: {}", action, self.kind, self.tmdb_id, e);
                self.last_error = Some(message.to_string());
                MutationOutcome::Failed(e.to_string())
            }
        }
    }

    fn review_payload(&self) -> Option<String> {
        Some(self.user_review.clone()).filter(|r| !r.is_empty())
    }

    /// Rates the title, creating the local entry first when there is none.
    /// The stars show the new rating at once and revert if the save fails.
    pub async fn rate(&mut self, store: &dyn MediaStore, rating: Rating) -> MutationOutcome {
        if !self.can_mutate() {
            return MutationOutcome::Ignored;
        }
        let previous = self.user_rating.replace(rating);
        self.saving = true;

        let result = match self.local().map(|l| l.id) {
            Some(id) => {
                store
                    .update(
                        id,
                        UpdateEntry {
                            rating: Some(rating),
                            review: self.review_payload(),
                            ..Default::default()
                        },
                    )
                    .await
            }
            None => {
                store
                    .create_from_catalog(CreateFromCatalog {
                        tmdb_id: self.tmdb_id,
                        rating: Some(rating),
                        review: self.review_payload(),
                        wishlist: Some(false),
                        watched: Some(false),
                        ..Default::default()
                    })
                    .await
            }
        };

        let outcome = self.settle(result, "rating", "Impossible de sauvegarder la note");
        if !outcome.is_saved() {
            self.user_rating = previous;
        }
        outcome
    }

    /// Flips the wishlist flag; with no local entry, creates one on the
    /// wishlist.
    pub async fn toggle_wishlist(&mut self, store: &dyn MediaStore) -> MutationOutcome {
        if !self.can_mutate() {
            return MutationOutcome::Ignored;
        }
        self.saving = true;

        let result = match self.local().map(|l| (l.id, l.wishlist)) {
            Some((id, wishlist)) => store.update_wishlist(id, !wishlist).await,
            None => {
                store
                    .create_from_catalog(CreateFromCatalog {
                        tmdb_id: self.tmdb_id,
                        wishlist: Some(true),
                        watched: Some(false),
                        ..Default::default()
                    })
                    .await
            }
        };

        self.settle(result, "wishlist", "Impossible de modifier la wishlist")
    }

    /// Primary activation adds a viewing; secondary activation (context menu)
    /// removes one and suppresses the browser menu.
    pub async fn toggle_watched(
        &mut self,
        store: &dyn MediaStore,
        event: &mut PointerEvent,
    ) -> MutationOutcome {
        if event.button == PointerButton::Secondary {
            event.prevent_default();
        }
        if !self.can_mutate() {
            return MutationOutcome::Ignored;
        }

        let request = match self.local() {
            Some(local) => {
                let current = WatchState {
                    view_count: local.view_count,
                    watched: local.watched,
                };
                next_watch_state(current, event.button).map(|next| (Some(local.id), next))
            }
            None if event.button == PointerButton::Primary => Some((
                None,
                WatchState {
                    view_count: 1,
                    watched: true,
                },
            )),
            None => None,
        };

        let Some((id, next)) = request else {
            debug!("Nothing to decrement for {} {}", self.kind, self.tmdb_id);
            return MutationOutcome::Ignored;
        };
        self.saving = true;

        let result = match id {
            Some(id) => {
                store
                    .update(
                        id,
                        UpdateEntry {
                            view_count: Some(next.view_count),
                            watched: Some(next.watched),
                            ..Default::default()
                        },
                    )
                    .await
            }
            None => {
                store
                    .create_from_catalog(CreateFromCatalog {
                        tmdb_id: self.tmdb_id,
                        wishlist: Some(false),
                        watched: Some(next.watched),
                        view_count: Some(next.view_count),
                        ..Default::default()
                    })
                    .await
            }
        };

        self.settle(result, "watch status", "Impossible de modifier le statut")
    }

    /// Saves `review` on the existing local entry. Without one this does
    /// nothing; callers should check [`DetailView::has_local_entry`].
    pub async fn save_review(&mut self, store: &dyn MediaStore, review: &str) -> MutationOutcome {
        if !self.can_mutate() {
            return MutationOutcome::Ignored;
        }
        let Some(id) = self.local().map(|l| l.id) else {
            debug!("No local entry for {} {}, review not saved", self.kind, self.tmdb_id);
            return MutationOutcome::Ignored;
        };
        self.saving = true;

        let result = store
            .update(
                id,
                UpdateEntry {
                    review: Some(review.to_string()),
                    ..Default::default()
                },
            )
            .await;

        let outcome = self.settle(result, "review", "Impossible de sauvegarder la critique");
        if outcome.is_saved() {
            self.user_review = review.to_string();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMediaStore;
    use crate::controller::tests::{entry, server_error};

    fn rating(value: f64) -> Rating {
        Rating::new(value).unwrap()
    }

    fn record(tmdb_id: i64, local: Option<LocalEntry>) -> CatalogRecord {
        CatalogRecord {
            kind: MediaKind::Movie,
            tmdb_id,
            title: "Heat".to_string(),
            local,
            ..Default::default()
        }
    }

    fn store_with(record: CatalogRecord) -> MockMediaStore {
        let mut store = MockMediaStore::new();
        store.expect_kind().return_const(MediaKind::Movie);
        store
            .expect_get_by_catalog_id()
            .times(1)
            .returning(move |_| Ok(record.clone()));
        store
    }

    #[tokio::test]
    async fn test_no_local_entry_yields_defaults() {
        let store = store_with(record(949, None));
        let view = DetailView::open(&store, 949).await;

        assert!(view.record().is_some());
        assert!(view.local().is_none());
        assert!(!view.has_local_entry());
        assert_eq!(view.user_rating_value(), 0.0);
        assert_eq!(view.user_review(), "");
    }

    #[tokio::test]
    async fn test_existing_local_entry_seeds_scratch_state() {
        let mut local = entry(4, "Heat", Some(4.5), false);
        local.review = Some("Great heist".to_string());
        let store = store_with(record(949, Some(local)));
        let view = DetailView::open(&store, 949).await;

        assert_eq!(view.user_rating_value(), 4.5);
        assert_eq!(view.user_review(), "Great heist");
        assert!(view.has_local_entry());
    }

    #[tokio::test]
    async fn test_load_failure_is_terminal_error() {
        let mut store = MockMediaStore::new();
        store.expect_kind().return_const(MediaKind::Series);
        store
            .expect_get_by_catalog_id()
            .times(1)
            .returning(|_| Err(server_error()));

        let mut view = DetailView::open(&store, 1396).await;
        assert_eq!(
            view.state(),
            &LoadState::Error("Impossible de charger les détails de la série".to_string())
        );
        assert_eq!(view.toggle_wishlist(&store).await, MutationOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_first_rating_creates_local_entry() {
        let mut store = store_with(record(949, None));
        store
            .expect_create_from_catalog()
            .withf(|p| {
                p.tmdb_id == 949
                    && p.rating == Some(Rating::new(4.0).unwrap())
                    && p.wishlist == Some(false)
            })
            .times(1)
            .returning(|p| Ok(entry(10, "Heat", p.rating.map(|r| r.value()), false)));

        let mut view = DetailView::open(&store, 949).await;
        let outcome = view.rate(&store, rating(4.0)).await;

        assert!(outcome.is_saved());
        assert_eq!(view.local().map(|l| l.id), Some(10));
        assert_eq!(view.user_rating(), Some(rating(4.0)));
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn test_rating_failure_reverts_and_keeps_page_ready() {
        let mut store = store_with(record(949, Some(entry(4, "Heat", Some(3.5), false))));
        store
            .expect_update()
            .times(1)
            .returning(|_, _| Err(server_error()));

        let mut view = DetailView::open(&store, 949).await;
        let outcome = view.rate(&store, rating(5.0)).await;

        assert!(matches!(outcome, MutationOutcome::Failed(_)));
        assert_eq!(view.user_rating(), Some(rating(3.5)));
        assert_eq!(view.last_error(), Some("Impossible de sauvegarder la note"));
        assert!(view.record().is_some());
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn test_wishlist_toggle_patches_existing_entry() {
        let mut store = store_with(record(949, Some(entry(4, "Heat", None, true))));
        store
            .expect_update_wishlist()
            .withf(|id, wishlist| *id == 4 && !*wishlist)
            .times(1)
            .returning(|id, wishlist| Ok(entry(id, "Heat", None, wishlist)));

        let mut view = DetailView::open(&store, 949).await;
        assert!(view.toggle_wishlist(&store).await.is_saved());
        assert_eq!(view.local().map(|l| l.wishlist), Some(false));
    }

    #[tokio::test]
    async fn test_wishlist_without_entry_creates_it_on_the_wishlist() {
        let mut store = store_with(record(949, None));
        store
            .expect_create_from_catalog()
            .withf(|p| p.wishlist == Some(true) && p.watched == Some(false))
            .times(1)
            .returning(|_| Ok(entry(11, "Heat", None, true)));

        let mut view = DetailView::open(&store, 949).await;
        assert!(view.toggle_wishlist(&store).await.is_saved());
        assert_eq!(view.local().map(|l| l.wishlist), Some(true));
    }

    #[tokio::test]
    async fn test_watched_clicks() {
        let mut local = entry(4, "Heat", None, false);
        local.view_count = 1;
        local.watched = true;
        let mut store = store_with(record(949, Some(local)));
        store
            .expect_update()
            .withf(|id, c| *id == 4 && c.view_count == Some(0) && c.watched == Some(false))
            .times(1)
            .returning(|id, c| {
                let mut saved = entry(id, "Heat", None, false);
                saved.view_count = c.view_count.unwrap_or_default();
                saved.watched = c.watched.unwrap_or_default();
                Ok(saved)
            });

        let mut view = DetailView::open(&store, 949).await;

        let mut event = PointerEvent::context_menu();
        assert!(view.toggle_watched(&store, &mut event).await.is_saved());
        assert!(event.default_prevented());
        assert_eq!(view.local().map(|l| (l.view_count, l.watched)), Some((0, false)));

        // Already at zero: no request.
        let mut event = PointerEvent::context_menu();
        assert_eq!(view.toggle_watched(&store, &mut event).await, MutationOutcome::Ignored);
        assert!(event.default_prevented());
    }

    #[tokio::test]
    async fn test_first_watch_creates_entry_with_one_view() {
        let mut store = store_with(record(949, None));
        store
            .expect_create_from_catalog()
            .withf(|p| p.view_count == Some(1) && p.watched == Some(true))
            .times(1)
            .returning(|_| {
                let mut saved = entry(12, "Heat", None, false);
                saved.view_count = 1;
                saved.watched = true;
                Ok(saved)
            });

        let mut view = DetailView::open(&store, 949).await;
        let mut event = PointerEvent::primary();
        assert!(view.toggle_watched(&store, &mut event).await.is_saved());
        assert!(!event.default_prevented());
        assert_eq!(view.local().map(|l| l.view_count), Some(1));
    }

    #[tokio::test]
    async fn test_review_requires_local_entry() {
        let store = store_with(record(949, None));
        let mut view = DetailView::open(&store, 949).await;
        assert_eq!(view.save_review(&store, "Tense").await, MutationOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_review_saved_on_existing_entry() {
        let mut store = store_with(record(949, Some(entry(4, "Heat", Some(4.0), false))));
        store
            .expect_update()
            .withf(|id, c| *id == 4 && c.review.as_deref() == Some("Tense") && c.rating.is_none())
            .times(1)
            .returning(|id, c| {
                let mut saved = entry(id, "Heat", Some(4.0), false);
                saved.review = c.review;
                Ok(saved)
            });

        let mut view = DetailView::open(&store, 949).await;
        assert!(view.save_review(&store, "Tense").await.is_saved());
        assert_eq!(view.user_review(), "Tense");
        assert_eq!(view.local().and_then(|l| l.review.as_deref()), Some("Tense"));
    }
}
