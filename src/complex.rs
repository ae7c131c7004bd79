//! Keyed snapshots of full item stacks that table files refer to by `Key`.

use crate::error::{ConfigError, ResolveError};
use crate::item::ItemStack;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Encode a stack as an opaque snapshot string.
pub fn encode_snapshot(stack: &ItemStack) -> String {
    // serialising a plain struct of strings and integers cannot fail
    let json = serde_json::to_vec(stack).unwrap_or_default();
    STANDARD.encode(json)
}

pub fn decode_snapshot(snapshot: &str) -> Result<ItemStack, ResolveError> {
    let bytes = STANDARD
        .decode(snapshot.trim())
        .map_err(|e| ResolveError::CorruptSnapshot(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ResolveError::CorruptSnapshot(e.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    data: String,
}

/// The complex-item file: `[<key>] data = "<snapshot>"`.
#[derive(Debug, Default)]
pub struct ComplexItemStore {
    items: BTreeMap<String, StoredItem>,
    path: Option<PathBuf>,
}

impl ComplexItemStore {
    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let items = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            items,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add `stack` under `key`; `false` if the key is already taken or saving failed.
    pub fn add_item(&mut self, key: &str, stack: &ItemStack) -> bool {
        if self.items.contains_key(key) {
            return false;
        }
        self.items.insert(
            key.to_owned(),
            StoredItem {
                data: encode_snapshot(stack),
            },
        );
        self.persist("adding", key)
    }

    /// Remove `key`; `false` if it was not present or saving failed.
    pub fn remove_item(&mut self, key: &str) -> bool {
        if self.items.remove(key).is_none() {
            return false;
        }
        self.persist("removing", key)
    }

    pub fn get_snapshot(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|item| item.data.as_str())
    }

    /// Decoded stack for `key`; corrupt snapshots read as absent.
    pub fn get_item(&self, key: &str) -> Option<ItemStack> {
        decode_snapshot(self.get_snapshot(key)?).ok()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = toml::to_string(&self.items)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn persist(&self, action: &str, key: &str) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to save complex items file after {action} \"{key}\": {err}");
                false
            }
        }
    }
}
