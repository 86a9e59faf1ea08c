pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    clients::{BlobClient, KvClient, MailClient, MarketingClient},
    config::AppConfig,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the application from config: one client per configured service
    /// section, a bound listener, and the shared state handlers read from.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let count_store = config
            .counter_config
            .as_ref()
            .map(|c| KvClient::new(&c.url, c.api_token.clone(), c.timeout()))
            .transpose()?;

        let marketing_client = config
            .marketing_config
            .as_ref()
            .map(|c| {
                MarketingClient::new(
                    &c.url,
                    c.api_key.clone(),
                    c.transactional_id.clone(),
                    c.timeout(),
                )
            })
            .transpose()?;

        let mail_client = config
            .mail_config
            .as_ref()
            .map(|c| -> Result<MailClient> {
                let support_addr = c.valid_support_addr()?;
                let client = MailClient::new(
                    &c.url,
                    c.api_key.clone(),
                    c.domain.clone(),
                    support_addr,
                    c.timeout(),
                )?;
                Ok(client)
            })
            .transpose()?;

        let download_store = config
            .downloads_config
            .as_ref()
            .map(|c| BlobClient::new(&c.url, c.timeout()))
            .transpose()?;

        let webhook_secret = config.webhook_config.map(|c| c.secret);

        let app_state = AppState::new(
            count_store,
            marketing_client,
            mail_client,
            download_store,
            webhook_secret,
        );

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub count_store: Option<KvClient>,
    pub marketing_client: Option<MarketingClient>,
    pub mail_client: Option<MailClient>,
    pub download_store: Option<BlobClient>,
    pub webhook_secret: Option<SecretString>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        count_store: Option<KvClient>,
        marketing_client: Option<MarketingClient>,
        mail_client: Option<MailClient>,
        download_store: Option<BlobClient>,
        webhook_secret: Option<SecretString>,
    ) -> Self {
        AppState(Arc::new(InternalState {
            count_store,
            marketing_client,
            mail_client,
            download_store,
            webhook_secret,
        }))
    }
}
