//! Command-line arguments of the `inkstamp` binary.

use crate::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "inkstamp",
    version,
    about = "Stamp signatures onto a scanned page from a JSON bake job"
)]
pub struct Cli {
    /// Bake job describing the page, the signature and the placements
    pub job: PathBuf,

    /// Settings file (TOML or JSON); defaults to the user config directory
    #[arg(env = "INKSTAMP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Loads and validates the settings these arguments point at.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load_or_default()?,
        };
        config.validate()?;
        Ok(config)
    }
}
