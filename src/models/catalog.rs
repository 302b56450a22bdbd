use super::{LocalEntry, MediaKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub english_name: String,
    pub iso_639_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub character: Option<String>,
    pub popularity: Option<f64>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
    pub job: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// Catalog metadata for one title, optionally carrying the user's local entry.
///
/// Search results and flat detail responses use `tmdbId`; the raw catalog
/// object inside a detail envelope uses `id`, accepted here as an alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRecord {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(rename = "tmdbId", alias = "id")]
    pub tmdb_id: i64,
    pub title: String,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub popularity: Option<f64>,
    pub adult: Option<bool>,
    pub runtime: Option<u32>,
    pub episode_run_time: Vec<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub in_production: Option<bool>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub status: Option<String>,
    pub imdb_id: Option<String>,
    pub homepage: Option<String>,
    pub original_language: Option<String>,
    pub origin_country: Vec<String>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<Company>,
    pub production_countries: Vec<Country>,
    pub spoken_languages: Vec<Language>,
    pub networks: Vec<Company>,
    pub created_by: Vec<Creator>,
    pub belongs_to_collection: Option<Collection>,
    pub credits: Option<Credits>,
    pub director: Option<String>,
    pub local: Option<LocalEntry>,
}

impl CatalogRecord {
    /// Fills the derived fields a raw catalog object lacks: series titles come
    /// from `name`, and the director is the crew member credited as
    /// `Director` for movies or the first creator for series.
    pub fn normalized(mut self, kind: MediaKind) -> Self {
        self.kind = kind;

        if kind == MediaKind::Series {
            if let Some(name) = self.name.as_ref().filter(|n| !n.is_empty()) {
                self.title = name.clone();
            }
        }

        if self.director.is_none() {
            self.director = match kind {
                MediaKind::Movie => self.credits.as_ref().and_then(|c| {
                    c.crew
                        .iter()
                        .find(|p| p.job.as_deref() == Some("Director"))
                        .map(|p| p.name.clone())
                }),
                MediaKind::Series => self.created_by.first().map(|c| c.name.clone()),
            };
        }

        self
    }

    /// Release date for movies, first air date for series.
    pub fn release(&self) -> Option<&str> {
        match self.kind {
            MediaKind::Movie => self.release_date.as_deref(),
            MediaKind::Series => self.first_air_date.as_deref(),
        }
    }
}

/// Body of the unified and per-kind search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub query: String,
    pub limit: u32,
    pub total: u32,
    pub results: Vec<CatalogRecord>,
}
