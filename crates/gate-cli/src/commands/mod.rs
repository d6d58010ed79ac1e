pub mod config;
pub mod redact;
pub mod serve;

use anyhow::Result;
use gate_config::Config;
use std::path::Path;

/// Load an explicit config file, or the default one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
