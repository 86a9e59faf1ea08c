//! Tries to create an `AppConfig` from config files.
//! Uses `AppConfigBuilder` to layer configuration from multiple files,
//! then overlays production secrets from the environment.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod data;
mod error;

use std::sync::OnceLock;

use secrecy::SecretString;
use tracing::info;

// Re-export config structs
pub use data::{
    AppConfig, CounterConfig, DownloadsConfig, Environment, MailConfig, MarketingConfig, NetConfig,
    WebhookConfig,
};
pub use error::{ConfigError, ConfigResult};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<12} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let base_file = std::fs::File::open(config_dir.join("base.toml"))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));
        let env_file = std::fs::File::open(config_dir.join(environment_filename))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        let mut config = AppConfig::init()
            .add_source_file(base_file)
            .add_source_file(env_file)
            .build()
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        // In production none of the secrets live in the config files,
        // they get injected through the environment instead.
        if matches!(environment, Environment::Production) {
            overlay_env_secrets(&mut config);
        }

        config
    })
}

/// Replaces the secret placeholders of every configured section with the
/// matching environment variable, where one is set.
fn overlay_env_secrets(config: &mut AppConfig) {
    let env_secret = |name: &str| std::env::var(name).ok().map(SecretString::from);

    if let Some(webhook_config) = config.webhook_config.as_mut() {
        if let Some(secret) = env_secret("WEBHOOK_SECRET") {
            webhook_config.secret = secret;
        }
    }
    if let Some(counter_config) = config.counter_config.as_mut() {
        if let Some(token) = env_secret("COUNTER_API_TOKEN") {
            counter_config.api_token = token;
        }
    }
    if let Some(marketing_config) = config.marketing_config.as_mut() {
        if let Some(key) = env_secret("MARKETING_API_KEY") {
            marketing_config.api_key = key;
        }
    }
    if let Some(mail_config) = config.mail_config.as_mut() {
        if let Some(key) = env_secret("MAIL_API_KEY") {
            mail_config.api_key = key;
        }
    }
}
