pub(crate) use {
    crate::error::WalrusCliError,
    anyhow::{anyhow, Result as AnyResult},
    clap::{builder::ValueParser, Args, Parser, Subcommand},
    colored::Colorize,
    serde::Serialize,
    std::{
        path::PathBuf,
        sync::atomic::{AtomicBool, Ordering},
    },
    walrus_sdk::{WalrusClient, WalrusConfig},
};

// Where to find config file.
pub(crate) const CLI_CONF_PATH: &str = "~/.walrus/conf.toml";

/// When set, commands print machine-readable JSON instead of pretty output.
pub(crate) static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Load the CLI configuration, falling back to defaults when the file is
/// missing.
pub(crate) fn load_conf(conf_path: &PathBuf) -> AnyResult<WalrusConfig, WalrusCliError> {
    if !conf_path.exists() {
        return Ok(WalrusConfig::default());
    }

    WalrusConfig::load_from_path(conf_path).map_err(WalrusCliError::Walrus)
}

/// Build a [`WalrusClient`] from the configuration at `conf_path`.
pub(crate) fn build_client(conf_path: &PathBuf) -> AnyResult<WalrusClient, WalrusCliError> {
    let conf = load_conf(conf_path)?;

    log::debug!(
        "Using publisher {} and aggregator {}",
        conf.publisher_url,
        conf.aggregator_url
    );

    conf.validate().map_err(WalrusCliError::Walrus)?;

    conf.into_builder().build().map_err(WalrusCliError::Walrus)
}

// == Used by clap ==

/// Expands `~/` to the user's home directory in path arguments.
pub(crate) fn expand_tilde(path: &str) -> AnyResult<PathBuf> {
    if let Some(path) = path.strip_prefix("~/") {
        match home::home_dir() {
            Some(home) => return Ok(home.join(path)),
            None => return Err(anyhow!("Could not find home directory")),
        }
    }

    Ok(path.into())
}
