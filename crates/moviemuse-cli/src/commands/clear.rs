use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviemuse_config::PathManager;
use std::fs;

pub fn run_clear(all: bool, watchlist: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_watchlist(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("All local data cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if watchlist {
        clear_watchlist(&path_manager, output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --watchlist, --credentials, or --all");
        output.println("\nExample: moviemuse clear --watchlist");
    }

    Ok(())
}

fn clear_watchlist(path_manager: &PathManager, output: &Output) -> Result<()> {
    let watchlist_file = path_manager.watchlist_file();

    if watchlist_file.exists() {
        fs::remove_file(&watchlist_file).map_err(|e| {
            eyre!(
                "Failed to remove watchlist slot at {}: {}",
                watchlist_file.display(),
                e
            )
        })?;
        output.success(format!("Cleared local watchlist: {}", watchlist_file.display()));
    } else {
        output.info("No local watchlist found to clear");
    }

    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file).map_err(|e| {
            eyre!(
                "Failed to remove credentials file at {}: {}",
                credentials_file.display(),
                e
            )
        })?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}
