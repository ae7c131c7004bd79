use crate::container::ContainerKind;
use crate::error::{LootError, LootTableError};
use crate::registry::LootTableRegistry;
use crate::sampler::WeightedSampler;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Loot section of a structure in the config file.
///
/// ```toml
/// [structures.ruin.loot_tables.CHEST]
/// common = 3
/// rare = 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Container kind to table name to weight.
    pub loot_tables: BTreeMap<String, BTreeMap<String, f64>>,
}

/// A structure's loot: one weighted pool of table names per container kind.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    name: String,
    loot_tables: HashMap<ContainerKind, WeightedSampler<String>>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loot_tables: HashMap::new(),
        }
    }

    /// Build from config, loading every referenced table so a bad name fails here.
    ///
    /// Unknown container kinds are skipped with a warning.
    pub fn from_config(
        name: &str,
        config: &StructureConfig,
        tables: &mut LootTableRegistry,
    ) -> Result<Self, LootError> {
        let mut structure = Self::new(name);
        for (kind_name, pool) in &config.loot_tables {
            let Some(kind) = ContainerKind::from_block_name(kind_name) else {
                warn!("structure {name}: \"{kind_name}\" is not a container type, skipping it");
                continue;
            };
            for (table, weight) in pool {
                structure.add_loot_table(kind, table, *weight, tables)?;
            }
        }
        Ok(structure)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `table` to containers of `kind`; the table must load.
    pub fn add_loot_table(
        &mut self,
        kind: ContainerKind,
        table: &str,
        weight: f64,
        tables: &mut LootTableRegistry,
    ) -> Result<(), LootError> {
        match tables.try_get(table) {
            Ok(_) => {}
            Err(LootTableError::NotFound(_)) => {
                return Err(LootError::MissingTable(table.to_owned()));
            }
            Err(err) => return Err(err.into()),
        }
        let mut pool = self.loot_tables.remove(&kind).unwrap_or_default();
        let added = pool.add(weight, table.to_owned());
        if !pool.is_empty() {
            self.loot_tables.insert(kind, pool);
        }
        added.map_err(LootTableError::from)?;
        Ok(())
    }

    pub fn has_loot_tables(&self) -> bool {
        !self.loot_tables.is_empty()
    }

    pub fn loot_tables(&self, kind: ContainerKind) -> Option<&WeightedSampler<String>> {
        self.loot_tables.get(&kind)
    }

    /// Pick a table name for a container of `kind`.
    pub fn pick_table<R: Rng + ?Sized>(&self, kind: ContainerKind, rng: &mut R) -> Option<&str> {
        self.loot_tables(kind)?.sample(rng).map(String::as_str)
    }
}

/// Loaded structures by name.
#[derive(Debug, Default)]
pub struct StructureRegistry {
    structures: HashMap<String, Structure>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every structure in `configs`; a structure that fails is logged and left out.
    pub fn from_config(
        configs: &BTreeMap<String, StructureConfig>,
        tables: &mut LootTableRegistry,
    ) -> Self {
        let mut registry = Self::new();
        for (name, config) in configs {
            match Structure::from_config(name, config, tables) {
                Ok(structure) => registry.insert(structure),
                Err(err) => warn!("failed to load the loot of structure {name}: {err}"),
            }
        }
        registry
    }

    pub fn insert(&mut self, structure: Structure) {
        self.structures.insert(structure.name.clone(), structure);
    }

    pub fn get(&self, name: &str) -> Option<&Structure> {
        self.structures.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot_item::LootItem;
    use crate::table::LootTable;
    use rand::{SeedableRng, rngs::StdRng};

    fn tables() -> LootTableRegistry {
        let mut tables = LootTableRegistry::in_memory();
        for name in ["common", "rare", "fuel"] {
            tables.insert(
                LootTable::builder(name)
                    .item(LootItem::simple("STONE"))
                    .build()
                    .unwrap(),
            );
        }
        tables
    }

    #[test]
    fn pools_per_container_kind() {
        let mut tables = tables();
        let config: StructureConfig = toml::from_str(
            r#"
            [loot_tables.chest]
            common = 9
            rare = 1

            [loot_tables.furnace]
            fuel = 1

            [loot_tables.cauldron]
            common = 1
            "#,
        )
        .unwrap();
        let ruin = Structure::from_config("ruin", &config, &mut tables).unwrap();
        assert!(ruin.has_loot_tables());
        assert_eq!(ruin.loot_tables(ContainerKind::Chest).map(|p| p.len()), Some(2));
        assert!(ruin.loot_tables(ContainerKind::Barrel).is_none());

        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(ruin.pick_table(ContainerKind::Furnace, &mut rng), Some("fuel"));
        let rare = (0..2_000)
            .filter(|_| ruin.pick_table(ContainerKind::Chest, &mut rng) == Some("rare"))
            .count();
        assert!((100..=300).contains(&rare), "rare picked {rare} times");
    }

    #[test]
    fn unknown_tables_fail_the_structure() {
        let mut tables = tables();
        let mut config = StructureConfig::default();
        config
            .loot_tables
            .entry("CHEST".into())
            .or_default()
            .insert("missing".into(), 1.0);
        assert!(matches!(
            Structure::from_config("ruin", &config, &mut tables),
            Err(LootError::MissingTable(name)) if name == "missing"
        ));

        let mut configs = BTreeMap::new();
        configs.insert("ruin".to_string(), config);
        configs.insert("empty".to_string(), StructureConfig::default());
        let registry = StructureRegistry::from_config(&configs, &mut tables);
        assert!(!registry.contains("ruin"));
        assert!(registry.get("empty").is_some_and(|s| !s.has_loot_tables()));
    }

    #[test]
    fn weights_must_be_positive() {
        let mut tables = tables();
        let mut ruin = Structure::new("ruin");
        assert!(
            ruin.add_loot_table(ContainerKind::Chest, "common", 0.0, &mut tables)
                .is_err()
        );
        assert!(!ruin.has_loot_tables());
    }
}
