//! Loot tables: weighted item pools with a roll count and a replacement policy.

use crate::amount::AmountSpec;
use crate::complex::ComplexItemStore;
use crate::error::{LootTableError, ResolveError, WeightError};
use crate::external::ExternalItemRegistry;
use crate::item::ItemStack;
use crate::loot_item::{Decoration, LootItem};
use crate::player::Player;
use crate::registry::LootTableRegistry;
use crate::sampler::WeightedSampler;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Everything a draw needs besides the table itself.
///
/// Tracks the chain of tables currently being drawn so a nested `TABLE` entry that
/// leads back into an active table fails instead of recursing forever.
pub struct DrawContext<'a> {
    tables: &'a mut LootTableRegistry,
    externals: &'a ExternalItemRegistry,
    active: Vec<String>,
}

impl<'a> DrawContext<'a> {
    pub fn new(tables: &'a mut LootTableRegistry, externals: &'a ExternalItemRegistry) -> Self {
        Self {
            tables,
            externals,
            active: Vec::new(),
        }
    }

    pub fn externals(&self) -> &ExternalItemRegistry {
        self.externals
    }

    /// Draw every roll of the table registered as `name`.
    pub fn draw_nested<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        player: Option<&Player>,
        rng: &mut R,
    ) -> Result<Vec<ItemStack>, ResolveError> {
        if self.active.iter().any(|active| active == name) {
            let mut chain = self.active.clone();
            chain.push(name.to_owned());
            return Err(ResolveError::CyclicTable(chain));
        }
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| ResolveError::MissingTable(name.to_owned()))?;
        table.draw_all(self, player, rng)
    }
}

#[derive(Debug, Clone)]
pub struct LootTable {
    name: String,
    rolls: u32,
    replacement: bool,
    items: WeightedSampler<LootItem>,
}

impl LootTable {
    pub fn builder(name: impl Into<String>) -> LootTableBuilder {
        LootTableBuilder {
            name: name.into(),
            rolls: 1,
            replacement: true,
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rolls(&self) -> u32 {
        self.rolls
    }

    pub fn is_replacement(&self) -> bool {
        self.replacement
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &LootItem> {
        self.items.iter()
    }

    pub fn total_weight(&self) -> f64 {
        self.items.total_weight()
    }

    /// First entry that `stack` is an instance of.
    pub fn find_matching(
        &self,
        stack: &ItemStack,
        externals: &ExternalItemRegistry,
    ) -> Option<&LootItem> {
        self.items().find(|item| item.matches(stack, externals))
    }

    /// One weighted sample, resolved.
    pub fn draw_one<R: Rng + ?Sized>(
        &self,
        ctx: &mut DrawContext<'_>,
        player: Option<&Player>,
        rng: &mut R,
    ) -> Result<Vec<ItemStack>, ResolveError> {
        let item = self
            .items
            .sample(rng)
            .ok_or_else(|| ResolveError::EmptyTable(self.name.clone()))?;
        self.with_active(ctx, |ctx| item.resolve(ctx, player, rng))
    }

    /// Select `rolls` items and concatenate their stacks in draw order.
    ///
    /// Without replacement the roll count is capped at the number of distinct items.
    pub fn draw_all<R: Rng + ?Sized>(
        &self,
        ctx: &mut DrawContext<'_>,
        player: Option<&Player>,
        rng: &mut R,
    ) -> Result<Vec<ItemStack>, ResolveError> {
        let selected = self.select(rng)?;
        self.with_active(ctx, |ctx| {
            let mut stacks = Vec::new();
            for idx in selected {
                if let Some(item) = self.items.get(idx) {
                    stacks.extend(item.resolve(ctx, player, rng)?);
                }
            }
            Ok(stacks)
        })
    }

    fn with_active<'a, T>(
        &self,
        ctx: &mut DrawContext<'a>,
        f: impl FnOnce(&mut DrawContext<'a>) -> Result<T, ResolveError>,
    ) -> Result<T, ResolveError> {
        ctx.active.push(self.name.clone());
        let result = f(ctx);
        ctx.active.pop();
        result
    }

    fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>, ResolveError> {
        if self.replacement {
            return (0..self.rolls)
                .map(|_| {
                    self.items
                        .sample_index(rng)
                        .ok_or_else(|| ResolveError::EmptyTable(self.name.clone()))
                })
                .collect();
        }

        let target = (self.rolls as usize).min(self.items.len());
        let mut taken = vec![false; self.items.len()];
        let mut chosen = Vec::with_capacity(target);
        while chosen.len() < target {
            let Some(idx) = self.items.sample_index(rng) else {
                break;
            };
            if !taken[idx] {
                taken[idx] = true;
                chosen.push(idx);
            }
        }
        Ok(chosen)
    }

    /// Load a table definition.
    ///
    /// `COMPLEX` entries are looked up in `complex` right away; `TABLE` and `PLUGIN`
    /// entries are only checked for shape and resolved when drawn.
    pub fn from_toml_str(
        name: &str,
        source: &str,
        complex: &ComplexItemStore,
    ) -> Result<Self, LootTableError> {
        let file: TableFile = toml::from_str(source).map_err(|source| LootTableError::Parse {
            name: name.to_owned(),
            source,
        })?;

        let rolls = match file.rolls {
            None => {
                return Err(LootTableError::MissingSetting {
                    table: name.to_owned(),
                    setting: "Rolls",
                });
            }
            Some(toml::Value::Integer(n)) => {
                u32::try_from(n).map_err(|_| LootTableError::InvalidRolls(name.to_owned()))?
            }
            Some(_) => return Err(LootTableError::InvalidRolls(name.to_owned())),
        };
        let replacement = file.replacement.ok_or_else(|| LootTableError::MissingSetting {
            table: name.to_owned(),
            setting: "Replacement",
        })?;
        let entries = file.items.ok_or_else(|| LootTableError::MissingSetting {
            table: name.to_owned(),
            setting: "Items",
        })?;

        let mut items = WeightedSampler::new();
        for (id, entry) in entries {
            let item = entry.into_loot_item(name, &id, complex)?;
            items.add(f64::from(item.weight()), item)?;
        }

        Ok(Self {
            name: name.to_owned(),
            rolls,
            replacement,
            items,
        })
    }
}

pub struct LootTableBuilder {
    name: String,
    rolls: u32,
    replacement: bool,
    items: Vec<LootItem>,
}

impl LootTableBuilder {
    pub fn rolls(mut self, rolls: u32) -> Self {
        self.rolls = rolls;
        self
    }

    pub fn replacement(mut self, replacement: bool) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn item(mut self, item: LootItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> Result<LootTable, WeightError> {
        let items = WeightedSampler::from_pairs(
            self.items
                .into_iter()
                .map(|item| {
                    let weight = f64::from(item.weight());
                    (item, weight)
                }),
        )?;
        Ok(LootTable {
            name: self.name,
            rolls: self.rolls,
            replacement: self.replacement,
            items,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TableFile {
    rolls: Option<toml::Value>,
    replacement: Option<bool>,
    items: Option<BTreeMap<String, ItemEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemEntry {
    #[serde(rename = "Type")]
    kind: Option<toml::Value>,
    weight: Option<toml::Value>,
    amount: Option<toml::Value>,
    key: Option<String>,
    #[serde(rename = "ID")]
    id: Option<String>,
    name: Option<String>,
    lore: Option<Vec<String>>,
    enchantments: Option<BTreeMap<String, toml::Value>>,
    custom_model_data: Option<i32>,
}

impl ItemEntry {
    fn into_loot_item(
        self,
        table: &str,
        item_id: &str,
        complex: &ComplexItemStore,
    ) -> Result<LootItem, LootTableError> {
        let Some(kind) = self.kind.as_ref().and_then(toml::Value::as_str) else {
            return Err(LootTableError::MissingType {
                table: table.to_owned(),
                item: item_id.to_owned(),
            });
        };
        let kind = kind.trim().to_uppercase();
        let weight = match self.weight {
            Some(toml::Value::Integer(n)) if n >= 1 => u32::try_from(n).ok(),
            _ => None,
        }
        .ok_or_else(|| LootTableError::InvalidWeight {
            table: table.to_owned(),
            item: item_id.to_owned(),
        })?;
        let amount = match &self.amount {
            None => AmountSpec::default(),
            Some(toml::Value::String(s)) => AmountSpec::parse_lenient(s),
            Some(toml::Value::Integer(n)) => AmountSpec::parse_lenient(&n.to_string()),
            Some(_) => AmountSpec::Fixed(0),
        };
        let missing = |option: &'static str| LootTableError::MissingOption {
            table: table.to_owned(),
            item: item_id.to_owned(),
            option,
        };

        let item = match kind.as_str() {
            "TABLE" => LootItem::table(self.key.ok_or_else(|| missing("Key"))?),
            "COMPLEX" => {
                let key = self.key.ok_or_else(|| missing("Key"))?;
                let snapshot = complex.get_snapshot(&key).ok_or_else(|| {
                    LootTableError::UnknownComplexItem {
                        table: table.to_owned(),
                        item: item_id.to_owned(),
                        key: key.clone(),
                    }
                })?;
                LootItem::complex(snapshot)
            }
            "PLUGIN" => {
                let id = self.id.ok_or_else(|| missing("ID"))?;
                let Some((namespace, reference)) = id.split_once(':') else {
                    return Err(LootTableError::MalformedExternalId {
                        table: table.to_owned(),
                        item: item_id.to_owned(),
                        id,
                    });
                };
                LootItem::external(namespace, reference)
            }
            _ if self.name.is_some()
                || self.lore.is_some()
                || self.enchantments.is_some()
                || self.custom_model_data.is_some() =>
            {
                let mut decoration =
                    Decoration::new(kind.clone()).lore(self.lore.unwrap_or_default());
                if let Some(name) = &self.name {
                    decoration = decoration.name(name);
                }
                if let Some(data) = self.custom_model_data {
                    decoration = decoration.custom_model_data(data);
                }
                for (key, level) in self.enchantments.unwrap_or_default() {
                    let parsed = match &level {
                        toml::Value::String(s) => AmountSpec::parse(s),
                        toml::Value::Integer(n) => AmountSpec::parse(&n.to_string()),
                        _ => None,
                    };
                    let level = parsed.ok_or_else(|| LootTableError::InvalidEnchantmentLevel {
                        table: table.to_owned(),
                        item: item_id.to_owned(),
                        enchantment: key.clone(),
                    })?;
                    decoration = decoration.enchantment(&key, level);
                }
                LootItem::decorated(decoration)
            }
            _ => LootItem::simple(kind.clone()),
        };

        Ok(item.with_weight(weight).with_amount(amount))
    }
}
