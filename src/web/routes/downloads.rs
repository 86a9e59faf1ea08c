//! Gated download proxy: maps a slug to an object key and streams the
//! pre-rendered HTML out of the bucket.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};

use crate::{clients::blob, web::WebResult, AppState};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("downloads bucket is not configured")]
    NotConfigured,
    #[error("no download for slug: {0}")]
    NotFound(String),
    #[error("download store error: {0}")]
    Store(#[from] blob::Error),
}

// ###################################
// ->   HANDLER
// ###################################
#[tracing::instrument(name = "Serving gated download", skip(app_state))]
pub async fn download(
    Path(slug): Path<String>,
    State(app_state): State<AppState>,
) -> WebResult<Response> {
    let store = app_state
        .download_store
        .as_ref()
        .ok_or(DownloadError::NotConfigured)?;

    let key = format!("downloads/{slug}.html");

    match store.fetch(&key).await {
        Ok(Some(html)) => Ok((
            [(header::CACHE_CONTROL, "public, max-age=3600")],
            Html(html),
        )
            .into_response()),
        Ok(None) => Err(DownloadError::NotFound(slug).into()),
        Err(er) => {
            let source_url = store
                .object_url(&key)
                .map(|u| u.to_string())
                .unwrap_or_default();
            tracing::error!(
                slug = %slug,
                key = %key,
                source_url = %source_url,
                error = %er,
                "failed to fetch download from the bucket"
            );
            Err(DownloadError::Store(er).into())
        }
    }
}
