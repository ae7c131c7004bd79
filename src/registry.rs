use crate::complex::ComplexItemStore;
use crate::error::LootTableError;
use crate::table::LootTable;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error};

pub const LOOT_TABLE_FOLDER: &str = "lootTables";

/// Lazily loaded loot tables, keyed by name.
///
/// A table that fails to load is logged and reported as absent; the next lookup
/// tries the file again.
#[derive(Debug, Default)]
pub struct LootTableRegistry {
    tables: HashMap<String, Rc<LootTable>>,
    root: Option<PathBuf>,
    complex: ComplexItemStore,
}

impl LootTableRegistry {
    /// Tables are read from `<root>/lootTables/<name>.toml`.
    pub fn new(root: impl Into<PathBuf>, complex: ComplexItemStore) -> Self {
        Self {
            tables: HashMap::new(),
            root: Some(root.into()),
            complex,
        }
    }

    /// Registry that only knows tables added with [`insert`](Self::insert).
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn complex_items(&self) -> &ComplexItemStore {
        &self.complex
    }

    pub fn complex_items_mut(&mut self) -> &mut ComplexItemStore {
        &mut self.complex
    }

    pub fn insert(&mut self, table: LootTable) -> Rc<LootTable> {
        let table = Rc::new(table);
        self.tables
            .insert(table.name().to_owned(), Rc::clone(&table));
        table
    }

    /// Cached table, loading it on first use.
    pub fn get(&mut self, name: &str) -> Option<Rc<LootTable>> {
        if let Some(table) = self.tables.get(name) {
            return Some(Rc::clone(table));
        }
        match self.load(name) {
            Ok(table) => Some(self.insert(table)),
            Err(err) => {
                error!("there seems to be a problem with the \"{name}\" loot table: {err}");
                None
            }
        }
    }

    pub fn try_get(&mut self, name: &str) -> Result<Rc<LootTable>, LootTableError> {
        if let Some(table) = self.tables.get(name) {
            return Ok(Rc::clone(table));
        }
        let table = self.load(name)?;
        Ok(self.insert(table))
    }

    /// Names of the tables loaded so far.
    pub fn names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Forget every cached table; they load again on next use.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    fn load(&self, name: &str) -> Result<LootTable, LootTableError> {
        let Some(root) = &self.root else {
            return Err(LootTableError::NotFound(name.to_owned()));
        };
        let path = root.join(LOOT_TABLE_FOLDER).join(format!("{name}.toml"));
        if !path.exists() {
            return Err(LootTableError::NotFound(name.to_owned()));
        }
        debug!("loading loot table {name} from {}", path.display());
        let source = fs::read_to_string(&path).map_err(|source| LootTableError::Io {
            name: name.to_owned(),
            source,
        })?;
        LootTable::from_toml_str(name, &source, &self.complex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("loot-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(root.join(LOOT_TABLE_FOLDER)).unwrap();
        root
    }

    #[test]
    fn loads_lazily_and_caches() {
        let root = temp_root();
        fs::write(
            root.join(LOOT_TABLE_FOLDER).join("ore.toml"),
            "Rolls = 1\nReplacement = true\n[Items.iron]\nType = \"IRON_ORE\"\nWeight = 1\n",
        )
        .unwrap();
        let mut registry = LootTableRegistry::new(&root, ComplexItemStore::in_memory());
        assert!(!registry.is_loaded("ore"));
        let first = registry.get("ore").unwrap();
        let second = registry.get("ore").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(registry.names(), vec!["ore".to_string()]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn failed_loads_are_retried() {
        let root = temp_root();
        let path = root.join(LOOT_TABLE_FOLDER).join("late.toml");
        fs::write(&path, "Replacement = true\n[Items]\n").unwrap();
        let mut registry = LootTableRegistry::new(&root, ComplexItemStore::in_memory());
        assert!(registry.get("late").is_none());
        assert!(registry.get("missing").is_none());
        assert!(matches!(
            registry.try_get("missing"),
            Err(LootTableError::NotFound(_))
        ));

        fs::write(&path, "Rolls = 2\nReplacement = true\n[Items]\n").unwrap();
        assert_eq!(registry.get("late").unwrap().rolls(), 2);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn inserted_tables_need_no_file() {
        let mut registry = LootTableRegistry::in_memory();
        registry.insert(LootTable::builder("manual").build().unwrap());
        assert!(registry.get("manual").is_some());
        assert!(registry.get("other").is_none());
        registry.clear();
        assert!(registry.get("manual").is_none());
    }
}
