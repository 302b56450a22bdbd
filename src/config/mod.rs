use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::format::PosterSize;

pub const API_BASE_ENV: &str = "CINETHEQUE_API_BASE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    pub api: Option<ApiConfig>,
    pub pagination: Option<PaginationConfig>,
    pub search: Option<SearchConfig>,
    pub images: Option<ImagesConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    pub initial: Option<usize>,
    pub step: Option<usize>,
    #[serde(rename = "wishlistInitial")]
    pub wishlist_initial: Option<usize>,
    #[serde(rename = "wishlistStep")]
    pub wishlist_step: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(rename = "debounceMillis")]
    pub debounce_millis: Option<u64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    #[serde(rename = "posterSize")]
    pub poster_size: Option<PosterSize>,
}

impl Configuration {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Configuration = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Loads the file when present, falls back to defaults otherwise, then
    /// applies the environment override for the API base.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        Self::load_with_base_override(path, std::env::var(API_BASE_ENV).ok())
    }

    fn load_with_base_override(path: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            info!("No configuration file at {}, using defaults", path);
            Self::default()
        };

        if let Some(base_url) = base_url {
            info!("API base overridden by {}", API_BASE_ENV);
            config.set_base_url(base_url);
        }

        Ok(config)
    }

    pub fn set_base_url(&mut self, base_url: String) {
        match self.api {
            Some(ref mut api) => api.base_url = base_url,
            None => {
                self.api = Some(ApiConfig {
                    base_url,
                    timeout_seconds: None,
                })
            }
        }
    }

    pub fn base_url(&self) -> &str {
        self.api
            .as_ref()
            .map(|a| a.base_url.as_str())
            .unwrap_or("http://localhost:3000/api")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .as_ref()
                .and_then(|a| a.timeout_seconds)
                .unwrap_or(10),
        )
    }

    pub fn page_initial(&self) -> usize {
        self.pagination
            .as_ref()
            .and_then(|p| p.initial)
            .unwrap_or(20)
    }

    pub fn page_step(&self) -> usize {
        self.pagination.as_ref().and_then(|p| p.step).unwrap_or(20)
    }

    pub fn wishlist_page_initial(&self) -> usize {
        self.pagination
            .as_ref()
            .and_then(|p| p.wishlist_initial)
            .unwrap_or(12)
    }

    pub fn wishlist_page_step(&self) -> usize {
        self.pagination
            .as_ref()
            .and_then(|p| p.wishlist_step)
            .unwrap_or(12)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(
            self.search
                .as_ref()
                .and_then(|s| s.debounce_millis)
                .unwrap_or(300),
        )
    }

    pub fn search_limit(&self) -> u32 {
        self.search.as_ref().and_then(|s| s.limit).unwrap_or(10)
    }

    pub fn poster_size(&self) -> PosterSize {
        self.images
            .as_ref()
            .and_then(|i| i.poster_size)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file_content() {
        let config = Configuration::default();
        assert_eq!(config.base_url(), "http://localhost:3000/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.page_initial(), 20);
        assert_eq!(config.page_step(), 20);
        assert_eq!(config.wishlist_page_initial(), 12);
        assert_eq!(config.wishlist_page_step(), 12);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.search_limit(), 10);
        assert_eq!(config.poster_size(), PosterSize::W342);
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
api:
  baseUrl: "http://media.local:8080/api"
  timeoutSeconds: 3
pagination:
  initial: 40
  wishlistStep: 6
search:
  debounceMillis: 150
images:
  posterSize: w500
"#;
        let config = Configuration::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url(), "http://media.local:8080/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.page_initial(), 40);
        assert_eq!(config.page_step(), 20);
        assert_eq!(config.wishlist_page_step(), 6);
        assert_eq!(config.search_debounce(), Duration::from_millis(150));
        assert_eq!(config.poster_size(), PosterSize::W500);
    }

    #[test]
    fn test_set_base_url_without_api_section() {
        let mut config = Configuration::default();
        config.set_base_url("http://other/api".to_string());
        assert_eq!(config.base_url(), "http://other/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = Configuration::load_with_base_override(path.to_str().unwrap(), None).unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000/api");
        assert_eq!(config.page_initial(), 20);
    }

    #[test]
    fn test_load_reads_file_then_applies_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "api:\n  baseUrl: \"http://file/api\"\n  timeoutSeconds: 4\n\
             pagination:\n  initial: 8\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let from_file = Configuration::load_with_base_override(path, None).unwrap();
        assert_eq!(from_file.base_url(), "http://file/api");
        assert_eq!(from_file.page_initial(), 8);

        let overridden =
            Configuration::load_with_base_override(path, Some("http://env/api".to_string()))
                .unwrap();
        assert_eq!(overridden.base_url(), "http://env/api");
        assert_eq!(overridden.request_timeout(), Duration::from_secs(4));
        assert_eq!(overridden.page_initial(), 8);
    }

    #[test]
    fn test_load_honours_environment_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        std::env::set_var(API_BASE_ENV, "http://from-env:9000/api");
        let config = Configuration::load(path.to_str().unwrap());
        std::env::remove_var(API_BASE_ENV);

        assert_eq!(config.unwrap().base_url(), "http://from-env:9000/api");
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api: [not, a, map").unwrap();
        assert!(Configuration::load_with_base_override(path.to_str().unwrap(), None).is_err());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(Configuration::from_yaml("api: [not, a, map").is_err());
    }
}
