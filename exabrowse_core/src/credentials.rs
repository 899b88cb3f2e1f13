//! Credential storage for provider API keys.
//!
//! Lookup order for a provider secret is: the credential store first, then the
//! provider's environment variable.

use std::collections::HashMap;
use std::path::PathBuf;

/// Key/value credential fields for one provider (e.g. `api_key`).
pub type Credentials = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("persist error: {0}")]
    Persist(String),
}

pub trait CredentialStore: Send + Sync {
    fn load(&self, provider: &str) -> Option<Credentials>;
    fn save(&self, provider: &str, credentials: &Credentials) -> Result<(), StoreError>;
    fn remove(&self, provider: &str) -> Result<bool, StoreError>;
    fn list_providers(&self) -> Vec<String>;
}

/// Providers the application knows how to authenticate, with the
/// environment variable each one falls back to.
pub const KNOWN_PROVIDERS: &[(&str, &str)] = &[
    ("exa", "EXA_API_KEY"),
    ("groq", "GROQ_API_KEY"),
    ("cerebras", "CEREBRAS_API_KEY"),
    ("stripe", "STRIPE_SECRET_KEY"),
    ("iucn", "IUCN_API_KEY"),
];

/// Environment variable consulted when the store has no `api_key` for `provider`.
pub fn env_var_for(provider: &str) -> Option<&'static str> {
    KNOWN_PROVIDERS
        .iter()
        .find(|(name, _)| *name == provider)
        .map(|(_, var)| *var)
}

/// Resolve the `api_key` for `provider` from the store, then the environment.
pub fn resolve_api_key(store: &dyn CredentialStore, provider: &str) -> Option<String> {
    store
        .load(provider)
        .and_then(|c| c.get("api_key").cloned())
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            env_var_for(provider)
                .and_then(|var| std::env::var(var).ok())
                .filter(|k| !k.trim().is_empty())
        })
}

/// A simple in-memory store, mainly for testing.
pub struct MemoryCredentialStore {
    map: std::sync::Mutex<HashMap<String, Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            map: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn with_api_key(provider: &str, key: &str) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.map.lock() {
            let mut creds = Credentials::new();
            creds.insert("api_key".to_string(), key.to_string());
            map.insert(provider.to_string(), creds);
        }
        store
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, provider: &str) -> Option<Credentials> {
        self.map.lock().ok()?.get(provider).cloned()
    }

    fn save(&self, provider: &str, credentials: &Credentials) -> Result<(), StoreError> {
        self.map
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .insert(provider.to_string(), credentials.clone());
        Ok(())
    }

    fn remove(&self, provider: &str) -> Result<bool, StoreError> {
        Ok(self
            .map
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .remove(provider)
            .is_some())
    }

    fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .map
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// A JSON file store at `~/.config/exabrowse/credentials.json` (Unix)
/// or `%APPDATA%/exabrowse/credentials.json` (Windows).
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new_default() -> Self {
        Self::new(crate::config::config_dir().join("credentials.json"))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_map(&self) -> HashMap<String, Credentials> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, Credentials>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        let s = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Persist(format!("serde: {}", e)))?;
        std::fs::write(&self.path, &s).map_err(|e| StoreError::Persist(e.to_string()))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| StoreError::Persist(format!("chmod: {}", e)))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, provider: &str) -> Option<Credentials> {
        self.read_map().get(provider).cloned()
    }

    fn save(&self, provider: &str, credentials: &Credentials) -> Result<(), StoreError> {
        let mut map = self.read_map();
        map.insert(provider.to_string(), credentials.clone());
        self.write_map(&map)
    }

    fn remove(&self, provider: &str) -> Result<bool, StoreError> {
        let mut map = self.read_map();
        let existed = map.remove(provider).is_some();
        if existed {
            self.write_map(&map)?;
        }
        Ok(existed)
    }

    fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_map().into_keys().collect();
        names.sort();
        names
    }
}
