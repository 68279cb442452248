use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use toml;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    // Convenience methods for specific credentials
    pub fn get_catalog_api_key(&self) -> Option<&String> {
        self.get("catalog_api_key")
    }

    pub fn set_catalog_api_key(&mut self, key: String) {
        self.set("catalog_api_key".to_string(), key);
    }

    pub fn get_remote_token(&self) -> Option<&String> {
        self.get("remote_token")
    }

    pub fn set_remote_token(&mut self, token: String) {
        self.set("remote_token".to_string(), token);
    }

    pub fn get_user_uid(&self) -> Option<&String> {
        self.get("user_uid")
    }

    pub fn set_user_uid(&mut self, uid: String) {
        self.set("user_uid".to_string(), uid);
    }

    pub fn get_user_email(&self) -> Option<&String> {
        self.get("user_email")
    }

    pub fn set_user_email(&mut self, email: String) {
        self.set("user_email".to_string(), email);
    }

    pub fn get_user_display_name(&self) -> Option<&String> {
        self.get("user_display_name")
    }

    pub fn set_user_display_name(&mut self, name: String) {
        self.set("user_display_name".to_string(), name);
    }

    /// Remove the signed-in user and remote token, keeping the API key
    pub fn clear_session(&mut self) {
        self.remove("user_uid");
        self.remove("user_email");
        self.remove("user_display_name");
        self.remove("remote_token");
    }

    // Helper method to get all keys (for config display)
    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_catalog_api_key("test_key".to_string());
        store.set_user_uid("uid-1".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_catalog_api_key(), Some(&"test_key".to_string()));
        assert_eq!(loaded_store.get_user_uid(), Some(&"uid-1".to_string()));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.load().unwrap();
        assert_eq!(store.get_catalog_api_key(), None);
    }

    #[test]
    fn test_clear_session_keeps_api_key() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_catalog_api_key("key".to_string());
        store.set_user_uid("uid-1".to_string());
        store.set_remote_token("tok".to_string());

        store.clear_session();
        assert_eq!(store.get_user_uid(), None);
        assert_eq!(store.get_remote_token(), None);
        assert_eq!(store.get_catalog_api_key(), Some(&"key".to_string()));
    }
}
