//! Client for the marketing-email provider: contact records, transactional
//! sends and behavioral events. All endpoints are bearer-authenticated JSON
//! POSTs under one base URL.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::lead_magnets::LeadMagnet;
use crate::web::data::ValidEmail;

/// Source tag stamped on every contact this app creates.
const CONTACT_SOURCE: &str = "lead-magnet";
/// Group the provider files new leads under.
const CONTACT_USER_GROUP: &str = "leads";
/// Behavioral event fired after a lead-magnet download.
const DOWNLOAD_EVENT: &str = "leadMagnetDownload";

#[derive(Debug)]
pub struct MarketingClient {
    http_client: Client,
    url: reqwest::Url,
    api_key: SecretString,
    transactional_id: String,
}

impl MarketingClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        api_key: SecretString,
        transactional_id: String,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url = super::parse_base_url(url).map_err(Error::UrlParsing)?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(MarketingClient {
            http_client,
            url,
            api_key,
            transactional_id,
        })
    }

    /// Creates a contact record for `email`.
    /// `lead_magnet_id` is the id the client asked for and is forwarded
    /// verbatim; `magnet` is whatever it resolved to.
    /// A provider response whose body mentions the contact already exists is
    /// reported as the distinct `Error::ContactExists` so callers can fall
    /// back to an update instead of failing.
    pub async fn create_contact(
        &self,
        email: &ValidEmail,
        first_name: &str,
        lead_magnet_id: &str,
        magnet: &LeadMagnet,
    ) -> Result<()> {
        self.upsert_contact("contacts/create", email, first_name, lead_magnet_id, magnet)
            .await
    }

    /// Updates an existing contact record with the latest lead-magnet fields.
    pub async fn update_contact(
        &self,
        email: &ValidEmail,
        first_name: &str,
        lead_magnet_id: &str,
        magnet: &LeadMagnet,
    ) -> Result<()> {
        self.upsert_contact("contacts/update", email, first_name, lead_magnet_id, magnet)
            .await
    }

    async fn upsert_contact(
        &self,
        endpoint: &str,
        email: &ValidEmail,
        first_name: &str,
        lead_magnet_id: &str,
        magnet: &LeadMagnet,
    ) -> Result<()> {
        let url = self
            .url
            .join(endpoint)
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let contact = ContactUpsert {
            email: email.as_ref(),
            first_name,
            source: CONTACT_SOURCE,
            lead_magnet: lead_magnet_id,
            lead_magnet_name: magnet.name,
            lead_magnet_category: magnet.category.as_ref(),
            download_url: magnet.download_path,
            user_group: CONTACT_USER_GROUP,
        };

        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&contact)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if body.contains("already exists") {
            return Err(Error::ContactExists);
        }

        Err(Error::FailedRequest { status, body })
    }

    /// Requests an immediate templated email carrying the download link.
    pub async fn send_transactional(&self, email: &ValidEmail, magnet: &LeadMagnet) -> Result<()> {
        let url = self
            .url
            .join("transactional")
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let send = TransactionalSend {
            email: email.as_ref(),
            transactional_id: &self.transactional_id,
            data_variables: DataVariables {
                download_url: magnet.download_path,
                lead_magnet_name: magnet.name,
            },
        };

        self.post_checked(url, &send).await
    }

    /// Notifies the provider of the download event for downstream automation.
    /// As with contacts, the event records the id the client asked for.
    pub async fn send_event(
        &self,
        email: &ValidEmail,
        lead_magnet_id: &str,
        magnet: &LeadMagnet,
    ) -> Result<()> {
        let url = self
            .url
            .join("events/send")
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let event = EventSend {
            email: email.as_ref(),
            event_name: DOWNLOAD_EVENT,
            event_properties: EventProperties {
                lead_magnet: lead_magnet_id,
                download_url: magnet.download_path,
            },
        };

        self.post_checked(url, &event).await
    }

    async fn post_checked<T: Serialize>(&self, url: reqwest::Url, body: &T) -> Result<()> {
        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
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
// ->   WIRE FORMATS
// ###################################
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactUpsert<'a> {
    email: &'a str,
    first_name: &'a str,
    source: &'a str,
    lead_magnet: &'a str,
    lead_magnet_name: &'a str,
    lead_magnet_category: &'a str,
    download_url: &'a str,
    user_group: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionalSend<'a> {
    email: &'a str,
    transactional_id: &'a str,
    data_variables: DataVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataVariables<'a> {
    download_url: &'a str,
    lead_magnet_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventSend<'a> {
    email: &'a str,
    event_name: &'a str,
    event_properties: EventProperties<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventProperties<'a> {
    lead_magnet: &'a str,
    download_url: &'a str,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("contact already exists")]
    ContactExists,
    #[error("marketing api returned {status}: {body}")]
    FailedRequest {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
