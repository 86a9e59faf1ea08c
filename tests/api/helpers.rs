use std::net::SocketAddr;

use anyhow::Result;
use leadgate::{
    config::{
        AppConfig, CounterConfig, DownloadsConfig, MailConfig, MarketingConfig, NetConfig,
        WebhookConfig,
    },
    App,
};
use secrecy::SecretString;
use wiremock::MockServer;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const MAIL_DOMAIN: &str = "mail.example.com";

/// A running instance of the app, wired against one mock server per external
/// service. Dropping the `TestApp` shuts the mock servers down, which also
/// verifies their `expect` counts.
pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub kv_server: MockServer,
    pub marketing_server: MockServer,
    pub mail_server: MockServer,
    pub downloads_server: MockServer,
}

impl TestApp {
    /// Spawns the app with every service configured against a mock server.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the app, letting the caller drop or tweak config sections to
    /// exercise the unconfigured paths.
    pub async fn spawn_with<F>(mutate: F) -> Result<Self>
    where
        F: FnOnce(&mut AppConfig),
    {
        let kv_server = MockServer::start().await;
        let marketing_server = MockServer::start().await;
        let mail_server = MockServer::start().await;
        let downloads_server = MockServer::start().await;

        // Binding port 0 triggers an OS scan for an available port.
        let mut config = AppConfig {
            net_config: NetConfig {
                host: [127, 0, 0, 1],
                app_port: 0,
            },
            webhook_config: Some(WebhookConfig {
                secret: SecretString::from(WEBHOOK_SECRET),
            }),
            counter_config: Some(CounterConfig {
                url: kv_server.uri(),
                api_token: SecretString::from("test-counter-token"),
                timeout_millis: 500,
            }),
            marketing_config: Some(MarketingConfig {
                url: marketing_server.uri(),
                api_key: SecretString::from("test-marketing-key"),
                transactional_id: "lead-magnet-delivery".to_string(),
                timeout_millis: 500,
            }),
            mail_config: Some(MailConfig {
                url: mail_server.uri(),
                api_key: SecretString::from("test-mail-key"),
                domain: MAIL_DOMAIN.to_string(),
                support_addr: "support@example.com".to_string(),
                timeout_millis: 500,
            }),
            downloads_config: Some(DownloadsConfig {
                url: downloads_server.uri(),
                timeout_millis: 500,
            }),
        };
        mutate(&mut config);

        let app = App::build_from_config(config).await?;
        let addr = app.listener.local_addr()?;

        tokio::spawn(leadgate::serve(app));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            kv_server,
            marketing_server,
            mail_server,
            downloads_server,
        })
    }

    pub async fn get_installs(&self) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .get(format!("http://{}/api/installs", self.addr))
            .send()
            .await?;
        Ok(res)
    }

    pub async fn post_installs(
        &self,
        body: &serde_json::Value,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .http_client
            .post(format!("http://{}/api/installs", self.addr))
            .json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok(res)
    }

    pub async fn post_subscribe(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/subscribe", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn post_support(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/support", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn get_download(&self, slug: &str) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .get(format!("http://{}/downloads/{slug}", self.addr))
            .send()
            .await?;
        Ok(res)
    }
}

/// Pulls the `message` field out of an error body.
pub async fn message_of(res: reqwest::Response) -> Result<String> {
    let body: serde_json::Value = res.json().await?;
    Ok(body
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string())
}
