//! Clients for the external services this app glues together: the key-value
//! store backing the install counter, the marketing-email provider, the
//! transactional mail provider and the object store serving gated downloads.

pub mod blob;
pub mod kv;
pub mod mail;
pub mod marketing;

// re-export
pub use blob::BlobClient;
pub use kv::KvClient;
pub use mail::MailClient;
pub use marketing::MarketingClient;

/// Parses a base URL and guarantees a trailing slash on its path so that
/// `Url::join` appends segments instead of replacing the last one.
pub(crate) fn parse_base_url(url: impl AsRef<str>) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(url.as_ref()).map_err(|e| e.to_string())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
