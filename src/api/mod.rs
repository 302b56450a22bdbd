use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::models::{
    CatalogRecord, CreateEntry, CreateFromCatalog, LocalEntry, MediaKind, Rating, UpdateEntry,
};
use async_trait::async_trait;
use tracing::{info, instrument};

mod response;

pub use response::{parse_catalog_record, parse_collection};

/// CRUD access to the user's local entries for one media kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    fn kind(&self) -> MediaKind;

    async fn list(&self) -> ApiResult<Vec<LocalEntry>>;

    async fn list_wishlist(&self) -> ApiResult<Vec<LocalEntry>>;

    async fn list_rated(&self) -> ApiResult<Vec<LocalEntry>>;

    async fn get(&self, id: i64) -> ApiResult<LocalEntry>;

    /// `GET /{kind}/tmdb/{tmdb_id}`: catalog metadata with the embedded local entry.
    async fn get_by_catalog_id(&self, tmdb_id: i64) -> ApiResult<CatalogRecord>;

    async fn create(&self, entry: CreateEntry) -> ApiResult<LocalEntry>;

    /// `POST /{kind}/tmdb`: upsert by catalog id.
    async fn create_from_catalog(&self, payload: CreateFromCatalog) -> ApiResult<LocalEntry>;

    async fn update(&self, id: i64, changes: UpdateEntry) -> ApiResult<LocalEntry>;

    async fn delete(&self, id: i64) -> ApiResult<()>;

    async fn update_rating(&self, id: i64, rating: Rating) -> ApiResult<LocalEntry> {
        self.update(id, UpdateEntry::rating(rating)).await
    }

    async fn update_wishlist(&self, id: i64, wishlist: bool) -> ApiResult<LocalEntry> {
        self.update(id, UpdateEntry::wishlist(wishlist)).await
    }
}

#[derive(Clone)]
pub struct MediaApi {
    http: HttpClient,
    kind: MediaKind,
}

impl MediaApi {
    pub fn new(http: HttpClient, kind: MediaKind) -> Self {
        Self { http, kind }
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.kind.route(), suffix)
    }
}

#[async_trait]
impl MediaStore for MediaApi {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn list(&self) -> ApiResult<Vec<LocalEntry>> {
        let value = self.http.get_value(&self.path("")).await?;
        let entries = parse_collection(value);
        info!("Retrieved {} local entries", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn list_wishlist(&self) -> ApiResult<Vec<LocalEntry>> {
        let value = self.http.get_value(&self.path("/wishlist")).await?;
        let entries = parse_collection(value);
        info!("Retrieved {} wishlist entries", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn list_rated(&self) -> ApiResult<Vec<LocalEntry>> {
        let value = self.http.get_value(&self.path("/rated")).await?;
        Ok(parse_collection(value))
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn get(&self, id: i64) -> ApiResult<LocalEntry> {
        self.http.get_json(&self.path(&format!("/{}", id))).await
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn get_by_catalog_id(&self, tmdb_id: i64) -> ApiResult<CatalogRecord> {
        let value = self
            .http
            .get_value(&self.path(&format!("/tmdb/{}", tmdb_id)))
            .await?;
        parse_catalog_record(self.kind, value)
    }

    #[instrument(skip(self, entry), fields(kind = %self.kind, title = %entry.title))]
    async fn create(&self, entry: CreateEntry) -> ApiResult<LocalEntry> {
        let created: LocalEntry = self.http.post_json(&self.path(""), &entry).await?;
        info!("Created local entry {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self, payload), fields(kind = %self.kind, tmdb_id = payload.tmdb_id))]
    async fn create_from_catalog(&self, payload: CreateFromCatalog) -> ApiResult<LocalEntry> {
        let created: LocalEntry = self.http.post_json(&self.path("/tmdb"), &payload).await?;
        info!("Created local entry {} from catalog", created.id);
        Ok(created)
    }

    #[instrument(skip(self, changes), fields(kind = %self.kind))]
    async fn update(&self, id: i64, changes: UpdateEntry) -> ApiResult<LocalEntry> {
        self.http
            .put_json(&self.path(&format!("/{}", id)), &changes)
            .await
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.http.delete(&self.path(&format!("/{}", id))).await?;
        info!("Deleted local entry {}", id);
        Ok(())
    }
}
