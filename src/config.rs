use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Optional defaults for the `build` subcommand. Command line flags win.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    pub lenex_directory: Option<PathBuf>,
    pub olympic_directory: Option<PathBuf>,
    pub profile_directory: Option<PathBuf>,
    pub database_file: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_from(Path::new("does-not-exist.toml")).unwrap();
        assert!(config.build.lenex_directory.is_none());
        assert!(config.build.workers.is_none());
    }

    #[test]
    fn reads_build_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[build]\nlenex_directory = \"data/lenex\"\nworkers = 4\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.build.lenex_directory,
            Some(PathBuf::from("data/lenex"))
        );
        assert_eq!(config.build.workers, Some(4));
    }
}
