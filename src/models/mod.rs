use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod catalog;
mod rating;

pub use catalog::{
    CastMember, CatalogRecord, Collection, Company, Country, Creator, Credits, CrewMember, Genre,
    Language, SearchResponse,
};
pub use rating::Rating;
pub(crate) use rating::deserialize_optional_rating;

/// Movies and series share one record shape and differ only by route.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKind {
    #[default]
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "serie")]
    Series,
}

impl MediaKind {
    pub fn route(self) -> &'static str {
        match self {
            MediaKind::Movie => "/movie",
            MediaKind::Series => "/serie",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Movie => "film",
            MediaKind::Series => "série",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" | "films" => Ok(MediaKind::Movie),
            "serie" | "series" | "show" | "shows" | "tv" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// The user's own record for a title, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEntry {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub wishlist: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub watched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<EntryArtwork>,
}

/// Catalog artwork the backend embeds in list rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryArtwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

impl LocalEntry {
    pub fn poster_path(&self) -> Option<&str> {
        self.tmdb.as_ref().and_then(|t| t.poster_path.as_deref())
    }

    pub fn with_rating(&self, rating: Option<Rating>) -> Self {
        Self {
            rating,
            ..self.clone()
        }
    }
}

/// Body of `POST /{kind}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntry {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
}

/// Body of `POST /{kind}/tmdb`: create (or upsert) the local entry for a
/// catalog id, letting the backend fill in the title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromCatalog {
    pub tmdb_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_override: Option<String>,
}

/// Body of `PUT /{kind}/{id}`; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
}

impl UpdateEntry {
    pub fn rating(rating: Rating) -> Self {
        Self {
            rating: Some(rating),
            ..Default::default()
        }
    }

    pub fn wishlist(wishlist: bool) -> Self {
        Self {
            wishlist: Some(wishlist),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    #[serde(rename = "lastModified")]
    LastModified,
    #[serde(rename = "titleAsc")]
    Title,
    #[serde(rename = "ratingDesc")]
    RatingDesc,
    #[serde(rename = "ratingAsc")]
    RatingAsc,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::LastModified => "Dernières modifications",
            SortKey::Title => "Ordre alphabétique",
            SortKey::RatingDesc => "Note décroissante",
            SortKey::RatingAsc => "Note croissante",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lastModified" | "last-modified" | "recent" => Ok(SortKey::LastModified),
            "titleAsc" | "title" => Ok(SortKey::Title),
            "ratingDesc" | "rating-desc" => Ok(SortKey::RatingDesc),
            "ratingAsc" | "rating-asc" => Ok(SortKey::RatingAsc),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}
