use super::load_environment;
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::{Input, Password};
use serde_json::json;

/// Mask a secret for display, keeping a short recognizable prefix
fn mask(secret: &str) -> String {
    if secret.len() > 8 {
        format!("{}{}", &secret[..4], "****")
    } else {
        "****".to_string()
    }
}

pub fn run_show(output: &Output) -> Result<()> {
    let (path_manager, config, credentials) = load_environment()?;

    let api_key = credentials.get_catalog_api_key().map(|k| mask(k));
    let token = credentials.get_remote_token().map(|t| mask(t));
    let uid = credentials.get_user_uid().cloned();
    let email = credentials.get_user_email().cloned();

    match output.format() {
        OutputFormat::Human => {
            output.println(format!("Config file:      {}", path_manager.config_file().display()));
            output.println(format!("Credentials file: {}", path_manager.credentials_file().display()));
            output.println(format!("Watchlist slot:   {}", path_manager.watchlist_file().display()));
            output.println("");
            output.println(format!("Catalog base URL: {}", config.catalog.base_url));
            output.println(format!("Catalog language: {}", config.catalog.language));
            output.println(format!(
                "Catalog API key:  {}",
                api_key.as_deref().unwrap_or("(not set)")
            ));
            output.println("");
            output.println(format!("Remote sync:      {}", if config.remote.enabled { "enabled" } else { "disabled" }));
            output.println(format!("Remote base URL:  {}", config.remote.base_url));
            match uid {
                Some(ref uid) => {
                    output.println(format!(
                        "Signed in as:     {}{}",
                        uid,
                        email.as_deref().map(|e| format!(" <{}>", e)).unwrap_or_default()
                    ));
                    output.println(format!(
                        "Remote token:     {}",
                        token.as_deref().unwrap_or("(not set)")
                    ));
                }
                None => output.println("Signed in as:     (signed out)".to_string()),
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": path_manager.config_file(),
                "catalog": {
                    "base_url": config.catalog.base_url,
                    "language": config.catalog.language,
                    "api_key": api_key,
                },
                "remote": {
                    "enabled": config.remote.enabled,
                    "base_url": config.remote.base_url,
                    "token": token,
                },
                "user": uid.map(|uid| json!({ "uid": uid, "email": email })),
            }));
        }
    }

    Ok(())
}

pub fn run_set_key(api_key: Option<String>, output: &Output) -> Result<()> {
    let (_path_manager, _config, mut credentials) = load_environment()?;

    let key = match api_key {
        Some(key) => key,
        None => Input::<String>::new()
            .with_prompt("Catalog API key")
            .interact_text()?,
    };
    credentials.set_catalog_api_key(key);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success("Catalog API key saved");
    Ok(())
}

pub fn run_login(
    uid: Option<String>,
    email: Option<String>,
    token: Option<String>,
    output: &Output,
) -> Result<()> {
    let (path_manager, mut config, mut credentials) = load_environment()?;

    let uid = match uid {
        Some(uid) => uid,
        None => Input::<String>::new().with_prompt("User id").interact_text()?,
    };
    let token = match token {
        Some(token) => token,
        None => Password::new().with_prompt("Remote store token").interact()?,
    };

    credentials.set_user_uid(uid.clone());
    if let Some(email) = email {
        credentials.set_user_email(email);
    }
    credentials.set_remote_token(token);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    // Signing in implies the user wants cloud sync
    if !config.remote.enabled {
        config.remote.enabled = true;
        config
            .save(&path_manager.config_file())
            .map_err(|e| eyre!("Failed to save config: {}", e))?;
    }

    output.success(format!("Signed in as {}", uid));
    output.info("Run 'moviemuse watchlist sync' to merge your local watchlist with the cloud record");
    Ok(())
}

pub fn run_logout(output: &Output) -> Result<()> {
    let (_path_manager, _config, mut credentials) = load_environment()?;
    credentials.clear_session();
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success("Signed out (the local watchlist is kept)");
    Ok(())
}
