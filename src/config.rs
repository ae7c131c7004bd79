//! The `config.toml` file: refill policy plus the structures that own loot.

use crate::duration::RefreshDuration;
use crate::error::ConfigError;
use crate::structure::StructureConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lootables: LootConfig,
    /// Structure name to its loot definition.
    pub structures: BTreeMap<String, StructureConfig>,
}

/// Refill policy shared by every loot container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// Schedule refills after each fill. When off a container fills once.
    pub auto_refill: bool,
    /// Refill cap per container; `-1` is unlimited.
    pub max_refills: i64,
    pub refresh_min: RefreshDuration,
    pub refresh_max: RefreshDuration,
    /// Refuse refills to players who already looted the container.
    pub restrict_player_reloot: bool,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            auto_refill: false,
            max_refills: -1,
            refresh_min: RefreshDuration::parse("1h"),
            refresh_max: RefreshDuration::parse("2h"),
            restrict_player_reloot: false,
        }
    }
}

impl LootConfig {
    pub fn has_refill_cap(&self) -> bool {
        self.max_refills != -1
    }

    /// Inclusive refill delay bounds in seconds; a maximum below the minimum collapses to the minimum.
    pub fn refill_delay_bounds(&self) -> (u64, u64) {
        let min = self.refresh_min.seconds();
        (min, self.refresh_max.seconds().max(min))
    }

    fn validate(&self) {
        if self.refresh_max.seconds() < self.refresh_min.seconds() {
            warn!(
                "lootables.refresh_max ({}) is shorter than lootables.refresh_min ({}); refills use the minimum",
                self.refresh_max, self.refresh_min
            );
        }
        if self.max_refills < -1 {
            warn!(
                "lootables.max_refills is {}; only -1 means unlimited, so no refill will happen",
                self.max_refills
            );
        }
    }
}

impl Config {
    /// Read `<dir>/config.toml`, writing the defaults there when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            let config = Self::default();
            let written = fs::create_dir_all(dir)
                .and_then(|()| fs::write(&path, config.to_toml_string().unwrap_or_default()));
            match written {
                Ok(()) => info!("wrote default configuration to {}", path.display()),
                Err(err) => warn!(
                    "couldn't write default configuration to {}: {err}",
                    path.display()
                ),
            }
            config
        };
        config.lootables.validate();
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LootConfig::default();
        assert!(!config.auto_refill);
        assert!(!config.has_refill_cap());
        assert_eq!(config.refill_delay_bounds(), (3_600, 7_200));
        assert!(!config.restrict_player_reloot);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [lootables]
            auto_refill = true
            refresh_max = "30m"
            "#,
        )
        .unwrap();
        assert!(config.lootables.auto_refill);
        assert_eq!(config.lootables.max_refills, -1);
        assert_eq!(config.lootables.refresh_min.seconds(), 3_600);
        // maximum below minimum
        assert_eq!(config.lootables.refill_delay_bounds(), (3_600, 3_600));
        assert!(config.structures.is_empty());
    }

    #[test]
    fn structures_section() {
        let config = Config::from_toml_str(
            r#"
            [structures.ruin.loot_tables.CHEST]
            common = 3
            rare = 1

            [structures.ruin.loot_tables.furnace]
            fuel = 1
            "#,
        )
        .unwrap();
        let ruin = &config.structures["ruin"];
        assert_eq!(ruin.loot_tables["CHEST"]["rare"], 1.0);
        assert_eq!(ruin.loot_tables["furnace"].len(), 1);
    }

    #[test]
    fn load_writes_defaults_then_reads_them_back() {
        let dir = std::env::temp_dir().join(format!("loot-config-{}", uuid::Uuid::new_v4()));
        let first = Config::load(&dir).unwrap();
        assert!(dir.join(CONFIG_FILE).exists());
        assert_eq!(Config::load(&dir).unwrap(), first);

        fs::write(dir.join(CONFIG_FILE), "[lootables\n").unwrap();
        assert!(matches!(Config::load(&dir), Err(ConfigError::Parse { .. })));
        let _ = fs::remove_dir_all(&dir);
    }
}
