use super::{apply_filters, sort_collection, CollectionFilters, Pagination};
use crate::api::MediaStore;
use crate::config::Configuration;
use crate::controller::{self, LoadState, MutationOutcome, PendingRating};
use crate::error::ApiResult;
use crate::models::{LocalEntry, MediaKind, Rating, SortKey};
use std::collections::HashSet;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    All,
    /// Wishlist members only; sort applies, the rating filter does not.
    Wishlist,
    Rated,
}

/// State of one list page: the fetched entries, the selected sort/filter and
/// the "show more" cursor.
#[derive(Debug, Clone)]
pub struct CollectionView {
    kind: MediaKind,
    mode: ListMode,
    state: LoadState<Vec<LocalEntry>>,
    filters: CollectionFilters,
    pagination: Pagination,
    saving: HashSet<i64>,
}

impl CollectionView {
    pub fn new(kind: MediaKind, mode: ListMode, pagination: Pagination) -> Self {
        Self {
            kind,
            mode,
            state: LoadState::Loading,
            filters: CollectionFilters::default(),
            pagination,
            saving: HashSet::new(),
        }
    }

    pub fn from_config(kind: MediaKind, mode: ListMode, config: &Configuration) -> Self {
        let pagination = match mode {
            ListMode::All | ListMode::Rated => {
                Pagination::new(config.page_initial(), config.page_step())
            }
            ListMode::Wishlist => {
                Pagination::new(config.wishlist_page_initial(), config.wishlist_page_step())
            }
        };
        Self::new(kind, mode, pagination)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn state(&self) -> &LoadState<Vec<LocalEntry>> {
        &self.state
    }

    pub fn filters(&self) -> CollectionFilters {
        self.filters
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_saving(&self, entry_id: i64) -> bool {
        self.saving.contains(&entry_id)
    }

    pub fn load_error_message(&self) -> &'static str {
        match (self.mode, self.kind) {
            (ListMode::All, MediaKind::Movie) => "Erreur lors du chargement des films",
            (ListMode::All, MediaKind::Series) => "Erreur lors du chargement des séries",
            (ListMode::Wishlist, MediaKind::Movie) => "Erreur lors du chargement des films à voir",
            (ListMode::Wishlist, MediaKind::Series) => {
                "Erreur lors du chargement des séries à voir"
            }
            (ListMode::Rated, MediaKind::Movie) => "Erreur lors du chargement des films notés",
            (ListMode::Rated, MediaKind::Series) => "Erreur lors du chargement des séries notées",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match (self.mode, self.kind) {
            (ListMode::All, MediaKind::Movie) => "Aucun film trouvé",
            (ListMode::All, MediaKind::Series) => "Aucune série trouvée",
            (ListMode::Wishlist, MediaKind::Movie) => "Aucun film à voir pour le moment",
            (ListMode::Wishlist, MediaKind::Series) => "Aucune série à voir pour le moment",
            (ListMode::Rated, MediaKind::Movie) => "Aucun film noté",
            (ListMode::Rated, MediaKind::Series) => "Aucune série notée",
        }
    }

    /// Fetches the list. A failure leaves the view in the error state until
    /// the next explicit reload.
    pub async fn load(&mut self, store: &dyn MediaStore) {
        self.state = LoadState::Loading;
        let result = match self.mode {
            ListMode::All => store.list().await,
            ListMode::Wishlist => store.list_wishlist().await,
            ListMode::Rated => store.list_rated().await,
        };
        self.state = match result {
            Ok(entries) => {
                info!("Loaded {} {} entries", entries.len(), self.kind);
                LoadState::Ready(entries)
            }
            Err(e) => {
                error!("Error loading {} list: {}", self.kind, e);
                LoadState::Error(self.load_error_message().to_string())
            }
        };
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if self.filters.sort != sort {
            self.filters.sort = sort;
            self.pagination.reset();
        }
    }

    pub fn set_rating_filter(&mut self, rating_filter: u8) {
        if self.filters.rating_filter != rating_filter {
            self.filters.rating_filter = rating_filter;
            self.pagination.reset();
        }
    }

    pub fn show_more(&mut self) {
        self.pagination.show_more();
    }

    pub fn arranged(&self) -> Vec<LocalEntry> {
        let Some(entries) = self.state.ready() else {
            return Vec::new();
        };
        match self.mode {
            ListMode::All | ListMode::Rated => apply_filters(entries, &self.filters),
            ListMode::Wishlist => sort_collection(entries, self.filters.sort),
        }
    }

    pub fn visible(&self) -> Vec<LocalEntry> {
        self.pagination.page(&self.arranged()).to_vec()
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more(self.arranged().len())
    }

    pub fn remaining(&self) -> usize {
        self.pagination.remaining(self.arranged().len())
    }

    /// Shows `rating` on the entry right away. `None` when the entry is not
    /// in the list or already saving.
    pub fn begin_rating(&mut self, entry_id: i64, rating: Rating) -> Option<PendingRating> {
        if self.saving.contains(&entry_id) {
            return None;
        }
        let entries = self.state.ready_mut()?;
        let slot = entries.iter_mut().find(|e| e.id == entry_id)?;
        let (optimistic, pending) = controller::apply_optimistic_rating(slot, rating);
        *slot = optimistic;
        self.saving.insert(entry_id);
        Some(pending)
    }

    pub fn finish_rating(
        &mut self,
        pending: PendingRating,
        result: ApiResult<LocalEntry>,
    ) -> MutationOutcome {
        self.saving.remove(&pending.entry_id);
        let Some(entries) = self.state.ready_mut() else {
            return MutationOutcome::Ignored;
        };
        let Some(slot) = entries.iter_mut().find(|e| e.id == pending.entry_id) else {
            return MutationOutcome::Ignored;
        };
        let (entry, outcome) = controller::settle_rating(slot, &pending, result);
        *slot = entry;
        outcome
    }

    pub async fn update_rating(
        &mut self,
        store: &dyn MediaStore,
        entry_id: i64,
        rating: Rating,
    ) -> MutationOutcome {
        let Some(pending) = self.begin_rating(entry_id, rating) else {
            return MutationOutcome::Ignored;
        };
        let result = store.update_rating(entry_id, rating).await;
        self.finish_rating(pending, result)
    }

    /// Flips the wishlist flag of an entry. Wishlist pages drop removed
    /// entries; other pages update the entry in place.
    pub async fn toggle_wishlist(
        &mut self,
        store: &dyn MediaStore,
        entry_id: i64,
    ) -> MutationOutcome {
        if self.saving.contains(&entry_id) {
            return MutationOutcome::Ignored;
        }
        let Some(current) = self
            .state
            .ready()
            .and_then(|entries| entries.iter().find(|e| e.id == entry_id))
            .map(|e| e.wishlist)
        else {
            return MutationOutcome::Ignored;
        };

        self.saving.insert(entry_id);
        let outcome = match self.mode {
            ListMode::Wishlist => {
                let entries = self.state.ready().cloned().unwrap_or_default();
                let mut replacement = None;
                let outcome =
                    controller::toggle_wishlist(store, entry_id, current, &entries, |next| {
                        replacement = Some(next)
                    })
                    .await;
                if let Some(next) = replacement {
                    self.state = LoadState::Ready(next);
                }
                outcome
            }
            ListMode::All | ListMode::Rated => {
                match store.update_wishlist(entry_id, !current).await {
                    Ok(updated) => {
                        if let Some(slot) = self
                            .state
                            .ready_mut()
                            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry_id))
                        {
                            *slot = updated;
                        }
                        MutationOutcome::Saved
                    }
                    Err(e) => {
                        error!("Error toggling wishlist for entry {}: {}", entry_id, e);
                        MutationOutcome::Failed(e.to_string())
                    }
                }
            }
        };
        self.saving.remove(&entry_id);
        outcome
    }
}
