//! Personal movie and series tracker: list views with sorting and rating
//! filters, optimistic rating/wishlist/watch updates, and catalog detail pages
//! merged with the user's local entries, all against a REST backend.

pub mod api;
pub mod collection;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod format;
pub mod http;
pub mod models;
pub mod search;

pub use api::{MediaApi, MediaStore};
pub use collection::{CollectionFilters, CollectionView, ListMode, Pagination};
pub use controller::{LoadState, MutationOutcome, PointerEvent, RatingControl};
pub use detail::DetailView;
pub use error::{ApiError, ApiResult};
pub use models::{CatalogRecord, LocalEntry, MediaKind, Rating, SortKey};
