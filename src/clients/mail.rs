//! Client for the transactional mail provider behind the support form.
//! The provider takes a form-encoded message at `v3/{domain}/messages`,
//! authenticated with HTTP basic auth (`api` : key).

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::web::data::ValidEmail;

#[derive(Debug)]
pub struct MailClient {
    http_client: Client,
    url: reqwest::Url,
    api_key: SecretString,
    domain: String,
    support_addr: ValidEmail,
}

impl MailClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        api_key: SecretString,
        domain: String,
        support_addr: ValidEmail,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url = super::parse_base_url(url).map_err(Error::UrlParsing)?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(MailClient {
            http_client,
            url,
            api_key,
            domain,
            support_addr,
        })
    }

    /// Dispatches a support email to the configured support address, with the
    /// requester's address set as Reply-To.
    pub async fn send_support_email(
        &self,
        reply_to: &ValidEmail,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<()> {
        let url = self
            .url
            .join(&format!("v3/{}/messages", self.domain))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let from = format!("Support <noreply@{}>", self.domain);
        let form = [
            ("from", from.as_str()),
            ("to", self.support_addr.as_ref()),
            ("h:Reply-To", reply_to.as_ref()),
            ("subject", subject),
            ("text", text_body),
            ("html", html_body),
        ];

        let resp = self
            .http_client
            .post(url)
            .basic_auth("api", Some(self.api_key.expose_secret()))
            .form(&form)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::FailedRequest { status, body })
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
    #[error("mail api returned {status}: {body}")]
    FailedRequest {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
