/*!
 * API credential lookup.
 *
 * Credentials are addressed by a logical key name (`openai_api_key` by
 * default) and resolved from the first store that knows them: the process
 * environment (`OPENAI_API_KEY`), then a per-user JSON secrets file.
 */

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use log::debug;

use crate::app_config::SecretsConfig;
use crate::errors::ConfigError;

/// Application directory name under the platform config dir
pub const APP_DIR: &str = "docx-translate";

/// A place secrets can be looked up in
pub trait SecretStore: Send + Sync + Debug {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Short description used in error messages
    fn describe(&self) -> String;
}

/// Environment variables, with the key uppercased
#[derive(Debug, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn variable_name(key: &str) -> String {
        key.to_uppercase()
    }
}

impl SecretStore for EnvSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable_name(key)).ok()
    }

    fn describe(&self) -> String {
        "environment".to_string()
    }
}

/// Flat JSON object of `key: value` pairs
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/docx-translate/secrets.json`, when the platform has a config dir
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join(APP_DIR).join("secrets.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<HashMap<String, String>> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(secrets) => Some(secrets),
            Err(e) => {
                debug!("Ignoring unreadable secrets file {:?}: {}", self.path, e);
                None
            }
        }
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read()?.remove(key)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    values: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Consults several stores in order
#[derive(Debug, Default)]
pub struct ChainedSecretStore {
    stores: Vec<Box<dyn SecretStore>>,
}

impl ChainedSecretStore {
    pub fn new(stores: Vec<Box<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Environment first, then the configured or default secrets file
    pub fn from_config(config: &SecretsConfig) -> Self {
        let mut stores: Vec<Box<dyn SecretStore>> = vec![Box::new(EnvSecretStore)];
        let file = match &config.secrets_file {
            Some(path) => Some(FileSecretStore::new(path.clone())),
            None => FileSecretStore::default_location(),
        };
        if let Some(file) = file {
            stores.push(Box::new(file));
        }
        Self::new(stores)
    }
}

impl SecretStore for ChainedSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|store| {
            let value = store.get(key)?;
            debug!("Secret '{}' found in {}", key, store.describe());
            Some(value)
        })
    }

    fn describe(&self) -> String {
        self.stores
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Fetch a non-empty secret or fail with `ConfigError::MissingSecret`
pub fn resolve_secret(store: &dyn SecretStore, key: &str) -> Result<String, ConfigError> {
    match store.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingSecret {
            key: key.to_string(),
            searched: store.describe(),
        }),
    }
}
