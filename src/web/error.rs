use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum_macros::AsRefStr;

use super::routes::{DownloadError, InstallsError, SubscribeError, SupportError};
use crate::utils::error_chain_fmt;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] super::data::DataParsingError),

    #[error("installs error: {0}")]
    Installs(#[from] InstallsError),
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
    #[error("support error: {0}")]
    Support(#[from] SupportError),
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    #[error("error awaiting a tokio task: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Logged errors carry the whole `source()` chain, not just the top message.
impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl Error {
    /// The client-visible face of each failure. Everything not listed here is
    /// a generic 500: clients get a terse message, the log gets the detail.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::DataParsing(data_er) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }

            Error::Installs(InstallsError::Unauthorized) => (StatusCode::UNAUTHORIZED, Unauthorized),
            Error::Installs(InstallsError::StoreNotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ServiceUnavailable("KV not available"),
            ),
            Error::Installs(InstallsError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UpstreamFailed("Failed to update count"),
            ),

            Error::Subscribe(SubscribeError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ServiceUnavailable("Email service not configured"),
            ),
            Error::Subscribe(SubscribeError::Marketing(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UpstreamFailed("Failed to subscribe"),
            ),

            Error::Support(SupportError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ServiceUnavailable("Email service not configured"),
            ),
            Error::Support(SupportError::Mail(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UpstreamFailed("Failed to send email"),
            ),

            Error::Download(DownloadError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ServiceUnavailable("Downloads not configured"),
            ),
            Error::Download(DownloadError::NotFound(_)) => (StatusCode::NOT_FOUND, NotFound),
            Error::Download(DownloadError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UpstreamFailed("Error loading download"),
            ),

            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client is allowed to see. The `Display` impl is the exact
/// `message` field of the JSON error body.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("Unauthorized")]
    Unauthorized,
    #[display("{_0}")]
    ServiceUnavailable(&'static str),
    #[display("{_0}")]
    UpstreamFailed(&'static str),
    #[display("Not found")]
    NotFound,
    #[display("An unexpected error occurred")]
    ServiceError,
}
