use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("cinetheque/0.1.0")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url.trim_end_matches('/'))?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` (which may carry a query string) to the base URL,
    /// keeping any path prefix the base already has.
    pub fn url(&self, path: &str) -> ApiResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    async fn check(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if !status.is_success() {
            error!("HTTP request failed with status: {}", status);
            return Err(ApiError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }

    fn log_transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            error!(
                "Network error, check that the media backend is running at {}",
                self.base_url
            );
        } else {
            error!("HTTP request error: {}", e);
        }
        ApiError::Http(e)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> ApiResult<Response> {
        let url = self.url(path)?;
        debug!("Making GET request to {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.log_transport(e))?;
        self.check(response).await
    }

    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.get(path).await?;
        let json = response.json::<T>().await?;
        Ok(json)
    }

    /// Fetches a body as untyped JSON, for responses whose shape varies.
    #[instrument(skip(self))]
    pub async fn get_value(&self, path: &str) -> ApiResult<serde_json::Value> {
        let response = self.get(path).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[instrument(skip(self, body))]
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path)?;
        debug!("Making POST request to {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.log_transport(e))?;
        let response = self.check(response).await?;
        Ok(response.json::<T>().await?)
    }

    #[instrument(skip(self, body))]
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path)?;
        debug!("Making PUT request to {}", url);
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.log_transport(e))?;
        let response = self.check(response).await?;
        Ok(response.json::<T>().await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path)?;
        debug!("Making DELETE request to {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| self.log_transport(e))?;
        self.check(response).await?;
        Ok(())
    }
}
