//! A thin client for the HTTP key-value store that holds the install counter.
//! Values are plain strings addressed by `values/{key}`.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct KvClient {
    http_client: Client,
    url: reqwest::Url,
    api_token: SecretString,
}

impl KvClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        api_token: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url = super::parse_base_url(url).map_err(Error::UrlParsing)?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(KvClient {
            http_client,
            url,
            api_token,
        })
    }

    /// Reads a value. A missing key is `Ok(None)`, not an error.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = self
            .url
            .join(&format!("values/{key}"))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let resp = self
            .http_client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value = resp.error_for_status()?.text().await?;

        Ok(Some(value))
    }

    /// Writes a value, creating the key if it does not exist yet.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let url = self
            .url
            .join(&format!("values/{key}"))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let _resp = self
            .http_client
            .put(url)
            .bearer_auth(self.api_token.expose_secret())
            .body(value.to_owned())
            .send()
            .await?
            .error_for_status()?;

        Ok(())
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
