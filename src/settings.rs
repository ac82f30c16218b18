use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const CONFIG_FILE: &str = "talmud_corpus.toml";
pub const ENV_PREFIX: &str = "TALMUD";

/// Runtime paths and the language tag. Defaults, then `talmud_corpus.toml`
/// if present, then `TALMUD_*` variables; CLI flags override all of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub corpus_dir: PathBuf,
    pub report_dir: PathBuf,
    pub language: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::build(Path::new(CONFIG_FILE), Environment::with_prefix(ENV_PREFIX))
    }

    fn build(file: &Path, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("db_path", "data/texts.sqlite")?
            .set_default("corpus_dir", "data")?
            .set_default("report_dir", ".")?
            .set_default("language", "he")?
            .add_source(File::from(file).required(false))
            .add_source(env)
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
