use super::{catalog_client, load_environment};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::Table;
use moviemuse_catalog::format_rating;
use moviemuse_config::{Config, CredentialStore, PathManager};
use moviemuse_core::{
    IdentityProvider, LocalStore, RemoteStore, RestRemoteStore, SessionIdentity, Watchlist,
};
use moviemuse_models::UserIdentity;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Signed in only when remote sync is enabled and an identity is stored
fn session_identity(config: &Config, credentials: &CredentialStore) -> SessionIdentity {
    if !config.remote.enabled {
        return SessionIdentity::signed_out();
    }
    match credentials.get_user_uid() {
        Some(uid) => {
            let mut user = UserIdentity::new(uid.clone());
            user.email = credentials.get_user_email().cloned();
            user.display_name = credentials.get_user_display_name().cloned();
            SessionIdentity::new(Some(user))
        }
        None => SessionIdentity::signed_out(),
    }
}

fn build_watchlist(
    path_manager: &PathManager,
    config: &Config,
    credentials: &CredentialStore,
) -> Watchlist {
    let identity = Arc::new(session_identity(config, credentials));
    let remote: Arc<dyn RemoteStore> = Arc::new(RestRemoteStore::new(
        &config.remote.base_url,
        credentials.get_remote_token().cloned(),
    ));
    let local = LocalStore::new(path_manager.watchlist_file());
    Watchlist::new(local, remote, identity as Arc<dyn IdentityProvider>)
}

/// Remote failures never fail the command; the list is safe locally
fn report_remote_errors(watchlist: &Watchlist, output: &Output) {
    if let Some(error) = watchlist.error() {
        output.warn(format!("{} (the watchlist is saved locally)", error));
    }
}

pub async fn run_add(id: u64, output: &Output) -> Result<()> {
    let (path_manager, config, credentials) = load_environment()?;
    let watchlist = build_watchlist(&path_manager, &config, &credentials);

    if watchlist.has(id) {
        output.info(format!("{} is already on the watchlist", id));
        return Ok(());
    }
    watchlist.add(id);
    watchlist.flush().await;
    report_remote_errors(&watchlist, output);
    output.success(format!(
        "Added {} to watchlist ({} items)",
        id,
        watchlist.ids().len()
    ));
    Ok(())
}

pub async fn run_remove(id: u64, output: &Output) -> Result<()> {
    let (path_manager, config, credentials) = load_environment()?;
    let watchlist = build_watchlist(&path_manager, &config, &credentials);

    if !watchlist.has(id) {
        output.info(format!("{} is not on the watchlist", id));
        return Ok(());
    }
    watchlist.remove(id);
    watchlist.flush().await;
    report_remote_errors(&watchlist, output);
    output.success(format!(
        "Removed {} from watchlist ({} items)",
        id,
        watchlist.ids().len()
    ));
    Ok(())
}

pub async fn run_list(output: &Output) -> Result<()> {
    let (path_manager, config, credentials) = load_environment()?;
    let watchlist = build_watchlist(&path_manager, &config, &credentials);
    // Let the sign-in reconciliation (if any) finish before reading
    watchlist.flush().await;
    report_remote_errors(&watchlist, output);

    let ids = watchlist.ids();
    if ids.is_empty() {
        output.info("Watchlist is empty");
        return Ok(());
    }

    let movies = match catalog_client(&config, &credentials) {
        Ok(client) => {
            let fetches = ids.iter().map(|&id| client.movie_details(id));
            Some(futures::future::join_all(fetches).await)
        }
        Err(_) => {
            debug!("No catalog API key; listing identifiers only");
            None
        }
    };

    match output.format() {
        OutputFormat::Human => {
            let mut table = Table::new();
            table.set_header(vec!["ID", "Title", "Year", "Rating"]);
            for (index, id) in ids.iter().enumerate() {
                let detail = movies.as_ref().and_then(|m| m[index].as_ref().ok());
                match detail {
                    Some(d) => table.add_row(vec![
                        id.to_string(),
                        d.movie.title.clone(),
                        d.movie
                            .release_year()
                            .map(|y| y.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        format_rating(d.movie.vote_average),
                    ]),
                    None => table.add_row(vec![
                        id.to_string(),
                        "(title unavailable)".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                    ]),
                };
            }
            output.println(table.to_string());
            output.println(format!("{} items", ids.len()));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let titles: Vec<serde_json::Value> = ids
                .iter()
                .enumerate()
                .map(|(index, id)| {
                    let detail = movies.as_ref().and_then(|m| m[index].as_ref().ok());
                    json!({
                        "id": id,
                        "title": detail.map(|d| d.movie.title.clone()),
                    })
                })
                .collect();
            output.json(&json!({ "ids": ids, "movies": titles }));
        }
    }

    Ok(())
}

pub async fn run_sync(output: &Output) -> Result<()> {
    let (path_manager, config, credentials) = load_environment()?;

    if !config.remote.enabled {
        output.warn("Remote sync is disabled. Enable [remote] in config.toml first.");
        return Ok(());
    }
    if credentials.get_user_uid().is_none() {
        output.warn("Not signed in. Run 'moviemuse config login' first.");
        return Ok(());
    }

    let watchlist = build_watchlist(&path_manager, &config, &credentials);
    // Construction kicked off the reconciliation; wait for it
    watchlist.flush().await;

    match watchlist.error() {
        Some(error) => output.error(format!("{} (the watchlist is saved locally)", error)),
        None => output.success(format!("Watchlist synced ({} items)", watchlist.ids().len())),
    }
    Ok(())
}
