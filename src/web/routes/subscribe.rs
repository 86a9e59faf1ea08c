//! The lead-magnet subscription flow: validate, upsert the contact at the
//! marketing provider, then fire the delivery email and the behavioral
//! event. Once the contact exists the request is a success; later steps only
//! log their failures.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    clients::{marketing, MarketingClient},
    lead_magnets::{self, LeadMagnet},
    web::{
        data::{DeserSubscribeReq, ValidSubscribeReq},
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("marketing api key is not configured")]
    NotConfigured,
    #[error("marketing client error: {0}")]
    Marketing(#[from] marketing::Error),
}

// ###################################
// ->   DATA
// ###################################
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    message: &'static str,
    download_url: &'static str,
}

// ###################################
// ->   HANDLER
// ###################################
#[tracing::instrument(
    name = "Subscribing for a lead magnet",
    skip(app_state, subscriber),
    fields(lead_magnet = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    Json(subscriber): Json<DeserSubscribeReq>,
) -> WebResult<Json<SubscribeResponse>> {
    let subscriber: ValidSubscribeReq = subscriber.try_into()?;

    let client = app_state
        .marketing_client
        .as_ref()
        .ok_or(SubscribeError::NotConfigured)?;

    // Unknown ids resolve to the default magnet instead of failing; the
    // provider still records the id the client asked for.
    let magnet = lead_magnets::resolve(&subscriber.lead_magnet);
    tracing::Span::current().record("lead_magnet", magnet.slug);

    upsert_contact(client, &subscriber, magnet).await?;

    // The contact is persisted: from here on failures must not surface.
    if let Err(er) = client.send_transactional(&subscriber.email, magnet).await {
        tracing::error!(error = %er, "transactional send failed after contact upsert");
    }
    if let Err(er) = client
        .send_event(&subscriber.email, &subscriber.lead_magnet, magnet)
        .await
    {
        tracing::error!(error = %er, "download event failed after contact upsert");
    }

    Ok(Json(SubscribeResponse {
        message: "Subscribed successfully",
        download_url: magnet.download_path,
    }))
}

// ###################################
// ->   HELPERS
// ###################################

/// Creates the contact, falling back to an update when the provider reports
/// it already exists. The update's outcome is logged but never fatal: an
/// existing contact is just as subscribed as a new one.
async fn upsert_contact(
    client: &MarketingClient,
    subscriber: &ValidSubscribeReq,
    magnet: &LeadMagnet,
) -> Result<(), SubscribeError> {
    match client
        .create_contact(
            &subscriber.email,
            &subscriber.first_name,
            &subscriber.lead_magnet,
            magnet,
        )
        .await
    {
        Ok(()) => Ok(()),
        Err(marketing::Error::ContactExists) => {
            tracing::info!("contact already exists, updating instead");
            if let Err(er) = client
                .update_contact(
                    &subscriber.email,
                    &subscriber.first_name,
                    &subscriber.lead_magnet,
                    magnet,
                )
                .await
            {
                tracing::warn!(error = %er, "contact update failed, continuing anyway");
            }
            Ok(())
        }
        Err(er) => Err(SubscribeError::Marketing(er)),
    }
}
