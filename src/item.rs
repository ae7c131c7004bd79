use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MAX_STACK_SIZE: u32 = 64;

/// Section sign introducing a colour/format code.
pub const FORMAT_CHAR: char = '§';

const FORMAT_CODES: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Decoration carried by an item stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<String>,
    /// Enchantment key to level.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantments: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_model_data: Option<i32>,
}

impl ItemMeta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A concrete stack of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStack {
    /// Base item type, e.g. `STONE`.
    pub item: String,
    pub count: u32,
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ItemMeta>,
}

fn default_max_stack_size() -> u32 {
    DEFAULT_MAX_STACK_SIZE
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            meta: None,
        }
    }

    /// Attach decoration; an empty meta is dropped so plain stacks stay plain.
    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = (!meta.is_empty()).then_some(meta);
        self
    }

    pub fn with_max_stack_size(mut self, max_stack_size: u32) -> Self {
        self.max_stack_size = max_stack_size.max(1);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn has_meta(&self) -> bool {
        self.meta.is_some()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.meta.as_ref()?.display_name.as_deref()
    }

    /// Same item type and decoration; count and stack limit are not part of identity.
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.meta == other.meta
    }
}

/// Replace `&x` colour codes with `§x`.
pub fn translate_color_codes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '&' && FORMAT_CODES.contains(next) => out.push(FORMAT_CHAR),
            _ => out.push(c),
        }
    }
    out
}

/// Remove `§x` colour/format codes.
pub fn strip_formatting(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == FORMAT_CHAR {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Case-insensitive comparison after stripping formatting from both sides.
pub fn loosely_equal(a: &str, b: &str) -> bool {
    strip_formatting(a).to_lowercase() == strip_formatting(b).to_lowercase()
}
