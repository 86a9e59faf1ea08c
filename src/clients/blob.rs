//! Client for the object store that holds the pre-rendered HTML downloads.
//! Objects are fetched by key relative to the bucket's base URL.

use reqwest::{Client, StatusCode};

#[derive(Debug)]
pub struct BlobClient {
    http_client: Client,
    url: reqwest::Url,
}

impl BlobClient {
    pub fn new<S: AsRef<str>>(url: S, timeout: std::time::Duration) -> Result<Self> {
        let url = super::parse_base_url(url).map_err(Error::UrlParsing)?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(BlobClient { http_client, url })
    }

    /// The full URL an object key resolves to, for diagnostics.
    pub fn object_url(&self, key: &str) -> Result<reqwest::Url> {
        self.url
            .join(key)
            .map_err(|e| Error::UrlParsing(e.to_string()))
    }

    /// Fetches an object's text content. A missing object is `Ok(None)`.
    pub async fn fetch(&self, key: &str) -> Result<Option<String>> {
        let url = self.object_url(key)?;

        let resp = self.http_client.get(url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let content = resp.error_for_status()?.text().await?;

        Ok(Some(content))
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
