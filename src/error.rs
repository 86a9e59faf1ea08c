use crate::{clients, config, web};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("web error: {0}")]
    Web(#[from] web::Error),
    #[error("kv client error: {0}")]
    Kv(#[from] clients::kv::Error),
    #[error("marketing client error: {0}")]
    Marketing(#[from] clients::marketing::Error),
    #[error("mail client error: {0}")]
    Mail(#[from] clients::mail::Error),
    #[error("blob client error: {0}")]
    Blob(#[from] clients::blob::Error),

    #[error("tokio joining error: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
