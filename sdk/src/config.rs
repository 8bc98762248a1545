use {
    crate::{
        cache::DEFAULT_CACHE_MAX_SIZE,
        error::{WalrusError, WalrusResult},
    },
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
    url::Url,
};

// Publisher and Aggregator URLs are from <https://github.com/MystenLabs/walrus/blob/232d27ff7b3c2ba08aa4e10729b095f300b46384/docs/book/assets/operators.json>
// Walrus Default API Endpoints
pub const WALRUS_PUBLISHER_URL: &str = "https://publisher.walrus-testnet.walrus.space";
pub const WALRUS_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration of a Walrus client, usually read from a TOML file.
///
/// Every field is optional in the file, missing ones take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalrusConfig {
    pub publisher_url: String,
    pub aggregator_url: String,
    pub timeout_secs: u64,
    pub cache: CacheConfig,
}

/// Local blob cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory. A temporary directory is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub max_size: usize,
}

impl Default for WalrusConfig {
    fn default() -> Self {
        Self {
            publisher_url: WALRUS_PUBLISHER_URL.to_string(),
            aggregator_url: WALRUS_AGGREGATOR_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_size: DEFAULT_CACHE_MAX_SIZE,
        }
    }
}

impl WalrusConfig {
    pub fn from_toml_str(conf: &str) -> WalrusResult<Self> {
        toml::from_str(conf).map_err(|e| WalrusError::InvalidConfig(e.to_string()))
    }

    pub fn load_from_path(path: &Path) -> WalrusResult<Self> {
        let conf = std::fs::read_to_string(path).map_err(|e| {
            WalrusError::io(format!("Failed to read config {}", path.display()), e)
        })?;

        Self::from_toml_str(&conf)
    }

    /// Write the config as pretty TOML, creating parent folders as needed.
    pub fn save(&self, path: &Path) -> WalrusResult<()> {
        let conf =
            toml::to_string_pretty(self).map_err(|e| WalrusError::InvalidConfig(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WalrusError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        std::fs::write(path, conf)
            .map_err(|e| WalrusError::io(format!("Failed to write config {}", path.display()), e))
    }

    /// Check that the endpoints are valid URLs and that limits are non-zero.
    pub fn validate(&self) -> WalrusResult<()> {
        for (name, url) in [
            ("publisher_url", &self.publisher_url),
            ("aggregator_url", &self.aggregator_url),
        ] {
            Url::parse(url)
                .map_err(|e| WalrusError::InvalidConfig(format!("Invalid {name} '{url}': {e}")))?;
        }

        if self.timeout_secs == 0 {
            return Err(WalrusError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.max_size == 0 {
            return Err(WalrusError::InvalidConfig(
                "cache.max_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Turn the config into a client builder.
    #[cfg(feature = "client")]
    pub fn into_builder(self) -> crate::client::WalrusClientBuilder {
        crate::client::WalrusClient::builder()
            .with_publisher_url(&self.publisher_url)
            .with_aggregator_url(&self.aggregator_url)
            .with_timeout(std::time::Duration::from_secs(self.timeout_secs))
            .with_cache_dir(self.cache.dir)
            .with_cache_max_size(self.cache.max_size)
    }
}
