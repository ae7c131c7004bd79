//! Loot item descriptors and how each kind turns into concrete stacks.

use crate::amount::AmountSpec;
use crate::complex::{decode_snapshot, encode_snapshot};
use crate::error::ResolveError;
use crate::external::ExternalItemRegistry;
use crate::item::{ItemMeta, ItemStack, loosely_equal, translate_color_codes};
use crate::player::Player;
use crate::table::DrawContext;
use rand::Rng;
use std::collections::BTreeMap;

/// Base item with display name, lore, enchantments and model data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoration {
    pub item: String,
    pub display_name: Option<String>,
    pub lore: Vec<String>,
    /// Enchantment key to (possibly ranged) level.
    pub enchantments: BTreeMap<String, AmountSpec>,
    pub custom_model_data: Option<i32>,
}

impl Decoration {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ..Self::default()
        }
    }

    /// Display name; `&` colour codes are translated.
    pub fn name(mut self, name: &str) -> Self {
        self.display_name = Some(translate_color_codes(name));
        self
    }

    /// Append lore lines; `&` colour codes are translated.
    pub fn lore<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lore
            .extend(lines.into_iter().map(|l| translate_color_codes(l.as_ref())));
        self
    }

    pub fn enchantment(mut self, key: &str, level: AmountSpec) -> Self {
        self.enchantments.insert(key.trim().to_lowercase(), level);
        self
    }

    pub fn custom_model_data(mut self, data: i32) -> Self {
        self.custom_model_data = Some(data);
        self
    }

    fn build_stack<R: Rng + ?Sized>(&self, count: u32, rng: &mut R) -> ItemStack {
        let meta = ItemMeta {
            display_name: self.display_name.clone(),
            lore: self.lore.clone(),
            enchantments: self
                .enchantments
                .iter()
                .map(|(key, level)| (key.clone(), level.roll(rng)))
                .collect(),
            custom_model_data: self.custom_model_data,
        };
        ItemStack::new(self.item.clone(), count).with_meta(meta)
    }

    /// Match rules: same type, name and model data when this side sets them, our
    /// lore found as a consecutive run in theirs, and all of our enchantments present
    /// on theirs regardless of level.
    pub fn matches(&self, other: &ItemStack) -> bool {
        if self.item != other.item {
            return false;
        }
        let Some(meta) = &other.meta else {
            return false;
        };

        if let Some(name) = &self.display_name {
            match &meta.display_name {
                Some(theirs) if loosely_equal(name, theirs) => {}
                _ => return false,
            }
        }

        if let Some(data) = self.custom_model_data {
            if meta.custom_model_data != Some(data) {
                return false;
            }
        }

        if !lore_contains(&meta.lore, &self.lore) {
            return false;
        }

        self.enchantments
            .keys()
            .all(|key| meta.enchantments.contains_key(key))
    }
}

/// Whether `needle` appears as a consecutive run of lines in `haystack`.
fn lore_contains(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(theirs, ours)| loosely_equal(ours, theirs))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LootItemKind {
    /// Base item type with no decoration.
    Simple { item: String },
    Decorated(Decoration),
    /// Opaque snapshot of a full stack.
    Complex { snapshot: String },
    /// Resolved through a registered external resolver.
    External { namespace: String, reference: String },
    /// Draws from another loot table, `amount` times.
    Table { name: String },
}

/// One weighted entry of a loot table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootItem {
    kind: LootItemKind,
    weight: u32,
    amount: AmountSpec,
}

impl LootItem {
    pub fn new(kind: LootItemKind) -> Self {
        Self {
            kind,
            weight: 1,
            amount: AmountSpec::default(),
        }
    }

    pub fn simple(item: impl Into<String>) -> Self {
        Self::new(LootItemKind::Simple { item: item.into() })
    }

    pub fn decorated(decoration: Decoration) -> Self {
        Self::new(LootItemKind::Decorated(decoration))
    }

    pub fn complex(snapshot: impl Into<String>) -> Self {
        Self::new(LootItemKind::Complex {
            snapshot: snapshot.into(),
        })
    }

    pub fn complex_from_stack(stack: &ItemStack) -> Self {
        Self::complex(encode_snapshot(stack))
    }

    pub fn external(namespace: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::new(LootItemKind::External {
            namespace: namespace.into(),
            reference: reference.into(),
        })
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(LootItemKind::Table { name: name.into() })
    }

    /// Weights below one are raised to one.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight.max(1);
        self
    }

    pub fn with_amount(mut self, amount: AmountSpec) -> Self {
        self.amount = amount;
        self
    }

    /// Amount from its source string; unparsable input becomes zero.
    pub fn with_amount_str(self, amount: &str) -> Self {
        self.with_amount(AmountSpec::parse_lenient(amount))
    }

    pub fn kind(&self) -> &LootItemKind {
        &self.kind
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn amount(&self) -> AmountSpec {
        self.amount
    }

    /// Produce fresh stacks for this entry.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        ctx: &mut DrawContext<'_>,
        player: Option<&Player>,
        rng: &mut R,
    ) -> Result<Vec<ItemStack>, ResolveError> {
        let count = self.amount.roll(rng);
        let stacks = match &self.kind {
            LootItemKind::Simple { item } => vec![ItemStack::new(item.clone(), count)],
            LootItemKind::Decorated(decoration) => vec![decoration.build_stack(count, rng)],
            LootItemKind::Complex { snapshot } => {
                vec![decode_snapshot(snapshot)?.with_count(count)]
            }
            LootItemKind::External {
                namespace,
                reference,
            } => vec![
                ctx.externals()
                    .resolve(namespace, reference, player)?
                    .with_count(count),
            ],
            LootItemKind::Table { name } => {
                let mut stacks = Vec::new();
                for _ in 0..count {
                    stacks.extend(ctx.draw_nested(name, player, rng)?);
                }
                stacks
            }
        };
        Ok(stacks)
    }

    /// Whether `other` counts as an instance of this entry.
    pub fn matches(&self, other: &ItemStack, externals: &ExternalItemRegistry) -> bool {
        match &self.kind {
            LootItemKind::Simple { item } => *item == other.item && !other.has_meta(),
            LootItemKind::Decorated(decoration) => decoration.matches(other),
            LootItemKind::Complex { snapshot } => {
                decode_snapshot(snapshot).is_ok_and(|stack| stack.is_similar(other))
            }
            LootItemKind::External {
                namespace,
                reference,
            } => externals.matches(namespace, reference, other),
            LootItemKind::Table { .. } => false,
        }
    }
}
