//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_receiver;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ReceiverConfig;

use crate::error::CliError;

/// Load and validate the configuration file at `path`
fn load_config(path: &Path) -> Result<ReceiverConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
