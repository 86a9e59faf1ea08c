//! The marketplace install counter. A single integer in the external KV
//! store, read by the public site and written by a webhook.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    clients::{kv, KvClient},
    web::WebResult,
    AppState,
};

pub const MAX_SPOTS: i64 = 100;
const INSTALLS_KEY: &str = "marketplace_installs";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum InstallsError {
    #[error("webhook token mismatch")]
    Unauthorized,
    #[error("count store is not configured")]
    StoreNotConfigured,
    #[error("count store error: {0}")]
    Store(#[from] kv::Error),
}

// ###################################
// ->   DATA
// ###################################
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallsResponse {
    installs: i64,
    remaining: i64,
    max_spots: i64,
}

impl InstallsResponse {
    fn new(installs: i64) -> Self {
        InstallsResponse {
            installs,
            remaining: (MAX_SPOTS - installs).max(0),
            max_spots: MAX_SPOTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInstallsReq {
    pub count: Option<i64>,
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub decrement: bool,
}

// ###################################
// ->   HANDLERS
// ###################################

/// Public read of the counter. This endpoint never fails the caller: an
/// unconfigured or erroring store degrades to a zero-count payload so the
/// site keeps rendering.
#[tracing::instrument(name = "Reading install count", skip(app_state))]
pub async fn get_installs(State(app_state): State<AppState>) -> Response {
    let Some(store) = app_state.count_store.as_ref() else {
        tracing::warn!("count store not configured, serving fallback payload");
        return Json(InstallsResponse::new(0)).into_response();
    };

    match read_installs(store).await {
        Ok(installs) => (
            [(header::CACHE_CONTROL, "public, max-age=60")],
            Json(InstallsResponse::new(installs)),
        )
            .into_response(),
        Err(er) => {
            tracing::error!(error = %er, "failed to read install count, serving fallback payload");
            Json(InstallsResponse::new(0)).into_response()
        }
    }
}

/// Webhook-guarded write. Accepts an absolute count, an increment or a
/// decrement; with none of the three the value is left untouched but still
/// re-read and returned.
#[tracing::instrument(name = "Updating install count", skip(headers, app_state, update))]
pub async fn update_installs(
    headers: HeaderMap,
    State(app_state): State<AppState>,
    Json(update): Json<UpdateInstallsReq>,
) -> WebResult<Json<InstallsResponse>> {
    if let Some(secret) = app_state.webhook_secret.as_ref() {
        let expected = format!("Bearer {}", secret.expose_secret());
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if provided != expected {
            return Err(InstallsError::Unauthorized.into());
        }
    }

    let store = app_state
        .count_store
        .as_ref()
        .ok_or(InstallsError::StoreNotConfigured)?;

    // The read-then-write below is racy across concurrent requests; a lost
    // update is acceptable for a marketing counter and the backing store
    // offers no conditional writes.
    if let Some(count) = update.count {
        store
            .put(INSTALLS_KEY, &count.to_string())
            .await
            .map_err(InstallsError::Store)?;
    } else if update.increment {
        let current = read_installs(store).await.map_err(InstallsError::Store)?;
        store
            .put(INSTALLS_KEY, &(current + 1).to_string())
            .await
            .map_err(InstallsError::Store)?;
    } else if update.decrement {
        let current = read_installs(store).await.map_err(InstallsError::Store)?;
        store
            .put(INSTALLS_KEY, &(current - 1).max(0).to_string())
            .await
            .map_err(InstallsError::Store)?;
    }

    let installs = read_installs(store).await.map_err(InstallsError::Store)?;

    Ok(Json(InstallsResponse::new(installs)))
}

// ###################################
// ->   HELPERS
// ###################################

/// A missing key or an unparseable stored value both read as 0.
async fn read_installs(store: &KvClient) -> kv::Result<i64> {
    let installs = store
        .get(INSTALLS_KEY)
        .await?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    Ok(installs)
}
