//! # Reel Configuration
//!
//! A minimal string key/value store, in the spirit of `app.set()` /
//! `app.get()`. Defaults are set in code and environment variables
//! override them.
//!
//! ## Setting and reading values
//! ```rust
//! use reel_core::ReelConfig;
//! let mut config = ReelConfig::new();
//!
//! config.set("http.port", "3000");
//!
//! assert_eq!(config.get("http.port"), Some("3000"));
//! ```
//!
//! ## Environment overrides
//! ```rust
//! use reel_core::{config::load_env_config, ReelConfig};
//! let mut config = ReelConfig::with_defaults();
//! load_env_config(&mut config, "REEL__");
//! ```
//!
//! `REEL__HTTP__PORT=8080` then overrides `http.port`.

use std::collections::HashMap;

pub const HTTP_HOST: &str = "http.host";
pub const HTTP_PORT: &str = "http.port";
pub const STORAGE_ROOT: &str = "storage.root";
pub const UPLOAD_FIELD: &str = "upload.field";
pub const UPLOAD_MAX_BYTES: &str = "upload.max_bytes";
pub const UPLOAD_EXTENSIONS: &str = "upload.extensions";

#[derive(Debug, Default, Clone)]
pub struct ReelConfig {
    values: HashMap<String, String>,
}

impl ReelConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Config store pre-filled with the service defaults.
    pub fn with_defaults() -> Self {
        let mut config = Self::new();
        config.set(HTTP_HOST, "127.0.0.1");
        config.set(HTTP_PORT, "3000");
        config.set(STORAGE_ROOT, "./videos");
        config.set(UPLOAD_FIELD, "video");
        config.set(UPLOAD_MAX_BYTES, (5u64 * 1024 * 1024 * 1024).to_string());
        config.set(UPLOAD_EXTENSIONS, ".mp4,.avi,.mov,.mkv");
        config
    }

    /// Set a configuration key to a string value.
    ///
    /// Example: config.set("http.port", "3000")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    ///
    /// Returns None if the key is not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ReelConfigSnapshot {
        ReelConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable view handed to request handlers.
#[derive(Debug, Clone, Default)]
pub struct ReelConfigSnapshot {
    map: HashMap<String, String>,
}

impl ReelConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }

    /// Comma separated list, trimmed, empty items dropped.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Copy every `<prefix>A__B` environment variable into `a.b`.
pub fn load_env_config(config: &mut ReelConfig, prefix: &str) {
    apply_overrides(config, prefix, std::env::vars());
}

fn apply_overrides<I>(config: &mut ReelConfig, prefix: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let normalized = stripped.to_lowercase().replace("__", "."); // REEL__HTTP__PORT → http.port
            config.set(normalized, value);
        }
    }
}
