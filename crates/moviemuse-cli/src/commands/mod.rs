pub mod browse;
pub mod clear;
pub mod config;
pub mod details;
pub mod watchlist;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviemuse_catalog::CatalogClient;
use moviemuse_config::{Config, CredentialStore, PathManager};

/// Load config and credentials from the standard paths
pub fn load_environment() -> Result<(PathManager, Config, CredentialStore)> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let credentials_file = path_manager.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    Ok((path_manager, config, credentials))
}

/// Catalog client for the configured API key
pub fn catalog_client(config: &Config, credentials: &CredentialStore) -> Result<CatalogClient> {
    let api_key = credentials.get_catalog_api_key().ok_or_else(|| {
        eyre!("No catalog API key configured. Run 'moviemuse config set-key' first.")
    })?;
    Ok(CatalogClient::new(api_key.clone(), &config.catalog))
}
