use anyhow::Result;
use dirs;
use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("MOVIEMUSE_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("moviemuse");

        Ok(Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir.join("data"),
            log_dir: base_dir.join("logs"),
        })
    }

    pub fn from_container_env() -> Self {
        let base = container_base_path();
        // In containers, config files live at the base level with data/logs in subdirs
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    /// The single local watchlist slot: a JSON array of movie identifiers
    pub fn watchlist_file(&self) -> PathBuf {
        self.data_dir.join("watchlist.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("moviemuse.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container base directory is created in the Containerfile, so its
        // presence indicates a container environment
        let base = container_base_path();
        if base.exists() {
            return Self::from_container_env();
        }

        // Otherwise, use platform-specific paths (e.g., ~/.config/moviemuse on Linux)
        Self::new().unwrap_or_else(|_| Self::from_container_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchlist_file_lives_under_data_dir() {
        let pm = PathManager {
            config_dir: PathBuf::from("/tmp/mm"),
            data_dir: PathBuf::from("/tmp/mm/data"),
            log_dir: PathBuf::from("/tmp/mm/logs"),
        };
        assert_eq!(pm.watchlist_file(), PathBuf::from("/tmp/mm/data/watchlist.json"));
        assert_eq!(pm.config_file(), PathBuf::from("/tmp/mm/config.toml"));
    }
}
