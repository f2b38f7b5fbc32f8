//! Command line and environment configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use crate::auth::TogglePolicy;

/// Backend origin used when `CRYPTODESK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://musical-space-waffle-7vvvvq9xjjqg2wr9w-8000.app.github.dev/";

pub const DEFAULT_LOG_FILTER: &str = "cryptodesk=info";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "cryptodesk",
    version,
    about = "Terminal client for the CryptoDesk task API"
)]
pub struct Config {
    /// Base URL of the CryptoDesk backend.
    #[arg(long, env = "CRYPTODESK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// Directory for the session file and log (default: ~/.config/cryptodesk).
    #[arg(long, env = "CRYPTODESK_HOME")]
    pub home: Option<PathBuf>,

    /// Clear email and password when switching between login and register.
    #[arg(long, env = "CRYPTODESK_CLEAR_ON_TOGGLE")]
    pub clear_on_toggle: bool,

    /// Log filter directives, written to <home>/cryptodesk.log.
    #[arg(long = "log", env = "CRYPTODESK_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Config {
    pub fn home_dir(&self) -> Result<PathBuf> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".config").join("cryptodesk"))
            .context("Could not determine home directory, pass --home")
    }

    pub fn toggle_policy(&self) -> TogglePolicy {
        if self.clear_on_toggle {
            TogglePolicy::Clear
        } else {
            TogglePolicy::Preserve
        }
    }
}
