use {
    crate::{display::*, prelude::*},
    thiserror::Error,
};

/// Custom error definitions for the Walrus CLI. Takes care of displaying
/// a pretty summary in the console.
#[derive(Debug, Error)]
pub(crate) enum WalrusCliError {
    #[error("{error}{separator}\n{0}", error = "Syntax Error".red().bold(), separator = separator())]
    SyntaxError(clap::error::Error),
    #[error("{error}{separator}\n{0}", error = "IO Error".red().bold(), separator = separator())]
    IoError(std::io::Error),
    #[error("{error}{separator}\n{0}", error = "Walrus Error".red().bold(), separator = separator())]
    Walrus(walrus_sdk::WalrusError),
    #[error("{error}{separator}\n{0}", error = "Error".red().bold(), separator = separator())]
    Any(anyhow::Error),
}
