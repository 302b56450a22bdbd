use crate::api::MediaStore;
use crate::error::ApiResult;
use crate::models::{LocalEntry, Rating};
use tracing::{debug, error, info};

mod watch;

pub use watch::{next_watch_state, PointerButton, PointerEvent, WatchState};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Saved,
    /// Nothing was sent: another save is in flight, or the action does not
    /// apply to the current state.
    Ignored,
    /// The backend rejected the change; local state is back to what it was.
    Failed(String),
}

impl MutationOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, MutationOutcome::Saved)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MutationOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRating {
    pub entry_id: i64,
    pub previous: Option<Rating>,
    pub requested: Rating,
}

/// Returns a new entry carrying `rating` plus the record needed to undo it.
pub fn apply_optimistic_rating(entry: &LocalEntry, rating: Rating) -> (LocalEntry, PendingRating) {
    let pending = PendingRating {
        entry_id: entry.id,
        previous: entry.rating,
        requested: rating,
    };
    (entry.with_rating(Some(rating)), pending)
}

/// Resolves a pending rating against the backend result. Success adopts the
/// server's record; failure restores the previous rating on `current`.
pub fn settle_rating(
    current: &LocalEntry,
    pending: &PendingRating,
    result: ApiResult<LocalEntry>,
) -> (LocalEntry, MutationOutcome) {
    match result {
        Ok(saved) => {
            debug!("Rating {} saved for entry {}", pending.requested, pending.entry_id);
            (saved, MutationOutcome::Saved)
        }
        Err(e) => {
            error!("Failed to update rating for entry {}: {}", pending.entry_id, e);
            (
                current.with_rating(pending.previous),
                MutationOutcome::Failed(e.to_string()),
            )
        }
    }
}

/// Star-rating control for one entry, saving at most one rating at a time.
#[derive(Debug, Clone)]
pub struct RatingControl {
    entry: LocalEntry,
    saving: bool,
}

impl RatingControl {
    pub fn new(entry: LocalEntry) -> Self {
        Self {
            entry,
            saving: false,
        }
    }

    pub fn entry(&self) -> &LocalEntry {
        &self.entry
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Shows `rating` immediately. Returns `None` while a save is in flight.
    pub fn begin(&mut self, rating: Rating) -> Option<PendingRating> {
        if self.saving {
            debug!("Rating save already in flight for entry {}", self.entry.id);
            return None;
        }
        let (optimistic, pending) = apply_optimistic_rating(&self.entry, rating);
        self.entry = optimistic;
        self.saving = true;
        Some(pending)
    }

    pub fn finish(
        &mut self,
        pending: PendingRating,
        result: ApiResult<LocalEntry>,
    ) -> MutationOutcome {
        let (entry, outcome) = settle_rating(&self.entry, &pending, result);
        self.entry = entry;
        self.saving = false;
        outcome
    }

    pub async fn update_rating(
        &mut self,
        store: &dyn MediaStore,
        rating: Rating,
    ) -> MutationOutcome {
        let Some(pending) = self.begin(rating) else {
            return MutationOutcome::Ignored;
        };
        let result = store.update_rating(pending.entry_id, rating).await;
        self.finish(pending, result)
    }
}

/// Adds the entry to, or removes it from, the wishlist.
///
/// Removal drops the entry from `collection`; addition prepends the record the
/// backend returns. `apply_new_collection` receives the new list only after
/// the backend call succeeds, so a failure leaves the caller's list as is.
pub async fn toggle_wishlist<F>(
    store: &dyn MediaStore,
    entry_id: i64,
    currently_in_wishlist: bool,
    collection: &[LocalEntry],
    apply_new_collection: F,
) -> MutationOutcome
where
    F: FnOnce(Vec<LocalEntry>),
{
    if currently_in_wishlist {
        match store.update_wishlist(entry_id, false).await {
            Ok(_) => {
                info!("Removed entry {} from wishlist", entry_id);
                apply_new_collection(
                    collection
                        .iter()
                        .filter(|e| e.id != entry_id)
                        .cloned()
                        .collect(),
                );
                MutationOutcome::Saved
            }
            Err(e) => {
                error!("Error toggling wishlist for entry {}: {}", entry_id, e);
                MutationOutcome::Failed(e.to_string())
            }
        }
    } else {
        match store.update_wishlist(entry_id, true).await {
            Ok(updated) => {
                info!("Added entry {} to wishlist", entry_id);
                let mut next = Vec::with_capacity(collection.len() + 1);
                next.push(updated);
                next.extend(collection.iter().filter(|e| e.id != entry_id).cloned());
                apply_new_collection(next);
                MutationOutcome::Saved
            }
            Err(e) => {
                error!("Error toggling wishlist for entry {}: {}", entry_id, e);
                MutationOutcome::Failed(e.to_string())
            }
        }
    }
}
