//! The configuration structs used to build the AppConfig, and their impls.
use std::{
    collections::{hash_map::Entry, HashMap},
    io::Read,
};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;
use toml::Value;

use crate::config::{ConfigError, ConfigResult};
use crate::web::data::ValidEmail;

// ###################################
// ->   STRUCTS
// ###################################

#[derive(AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

/// The full application configuration.
/// Every service section is optional: a missing section means the matching
/// endpoint reports itself as unconfigured instead of failing at startup.
#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub webhook_config: Option<WebhookConfig>,
    pub counter_config: Option<CounterConfig>,
    pub marketing_config: Option<MarketingConfig>,
    pub mail_config: Option<MailConfig>,
    pub downloads_config: Option<DownloadsConfig>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Shared secret guarding the install-counter webhook.
#[derive(Deserialize, Clone, Debug)]
pub struct WebhookConfig {
    pub secret: SecretString,
}

/// The key-value store holding the install counter.
#[derive(Deserialize, Clone, Debug)]
pub struct CounterConfig {
    pub url: String,
    pub api_token: SecretString,
    pub timeout_millis: u64,
}

/// The marketing-email provider (contacts, transactional sends, events).
#[derive(Deserialize, Clone, Debug)]
pub struct MarketingConfig {
    pub url: String,
    pub api_key: SecretString,
    pub transactional_id: String,
    pub timeout_millis: u64,
}

/// The transactional mail provider used by the support form.
#[derive(Deserialize, Clone, Debug)]
pub struct MailConfig {
    pub url: String,
    pub api_key: SecretString,
    pub domain: String,
    pub support_addr: String,
    pub timeout_millis: u64,
}

/// The object store serving the gated HTML downloads.
#[derive(Deserialize, Clone, Debug)]
pub struct DownloadsConfig {
    pub url: String,
    pub timeout_millis: u64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct AppConfigBuilder(HashMap<String, HashMap<String, Value>>);

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    pub fn init() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

impl MailConfig {
    pub fn valid_support_addr(&self) -> ConfigResult<ValidEmail> {
        let addr = ValidEmail::parse(self.support_addr.as_str())
            .map_err(|er| ConfigError::InvalidEmail(er.to_string()))?;
        Ok(addr)
    }
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl CounterConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl MarketingConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl DownloadsConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl AppConfigBuilder {
    /// Extends this `AppConfigBuilder` with the contents of `other` builder.
    fn extend_builder(&mut self, other: Self) {
        for (entry, entry_hm) in other.0 {
            if let Entry::Vacant(e) = self.0.entry(entry.clone()) {
                e.insert(entry_hm);
            } else {
                let target_hm = self.0.get_mut(&entry).expect("Checked above!");
                for (inner_entry, inner_value) in entry_hm {
                    target_hm.insert(inner_entry, inner_value);
                }
            }
        }
    }

    /// Panics if file reading or deserialization goes wrong.
    pub fn add_source_file(mut self, mut file: std::fs::File) -> Self {
        let mut file_content = String::new();

        if let Err(e) = file.read_to_string(&mut file_content) {
            panic!("Fatal Error: Building config: {e}");
        }

        let app_conf_builder: AppConfigBuilder = toml::from_str(&file_content)
            .unwrap_or_else(|e| panic!("Fatal Error: Building config: {e}"));

        self.extend_builder(app_conf_builder);
        self
    }

    pub fn build(self) -> ConfigResult<AppConfig> {
        let serialized = toml::to_string(&self)?;
        let app_config: AppConfig = toml::from_str(&serialized)?;
        Ok(app_config)
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::StringToEnvironmentFail),
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
