//! # structure_loot
//!
//! Loot generation for containers in generated structures: weighted loot tables,
//! a per-container refill schedule and placement that knows chests from furnaces.
//!
//! The pieces, leaf first:
//!
//! 1. [`WeightedSampler`]: cumulative-weight sampling with O(log n) draws.
//! 2. [`LootItem`]: plain, decorated, complex, external and nested-table entries,
//!    each resolving to concrete [`ItemStack`]s.
//! 3. [`LootTable`]: weighted items plus a roll count and a replacement policy,
//!    loaded from TOML and cached by [`LootTableRegistry`].
//! 4. [`ContainerTag`]: the state persisted on every loot container, and the
//!    refill state machine driven by [`LootConfig`].
//! 5. [`placer`]: spreading drawn stacks over an [`Inventory`].
//! 6. [`LootChestPopulator`]: tags containers when a structure is placed and fills
//!    them when a player opens one.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use structure_loot::{
//!     BlockContainer, ContainerKind, ExternalItemRegistry, LootChestPopulator, LootConfig,
//!     LootItem, LootTable, LootTableRegistry, Player, Structure, StructureRegistry,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tables = LootTableRegistry::in_memory();
//! tables.insert(
//!     LootTable::builder("ruin_chest")
//!         .rolls(3)
//!         .item(LootItem::simple("GOLD_INGOT").with_weight(1).with_amount_str("[1:4]"))
//!         .item(LootItem::simple("BREAD").with_weight(5).with_amount_str("2"))
//!         .build()?,
//! );
//! let mut ruin = Structure::new("ruin");
//! ruin.add_loot_table(ContainerKind::Chest, "ruin_chest", 1.0, &mut tables)?;
//! let mut structures = StructureRegistry::new();
//! structures.insert(ruin);
//!
//! let mut populator = LootChestPopulator::new(
//!     LootConfig::default(),
//!     structures,
//!     tables,
//!     ExternalItemRegistry::new(),
//! );
//!
//! let mut chest = BlockContainer::new(ContainerKind::Chest);
//! populator.write_tag("ruin", &mut chest)?;
//!
//! let mut rng = rand::rng();
//! let player = Player::new(uuid::Uuid::new_v4(), "Steve");
//! let outcome = populator.open(&player, &mut chest, &mut rng)?;
//! println!("{outcome:?}");
//! # Ok(()) }
//! ```
//!
//! ## Loot table files
//!
//! ```toml
//! Rolls = 2
//! Replacement = false
//!
//! [Items.bread]
//! Type = "BREAD"
//! Weight = 5
//! Amount = "[1:3]"
//!
//! [Items.blade]
//! Type = "IRON_SWORD"
//! Weight = 1
//! Name = "&6Old Blade"
//! Enchantments = { sharpness = "[1:3]" }
//!
//! [Items.more]
//! Type = "TABLE"
//! Key = "ruin_extra"
//! Weight = 1
//! ```
//!
//! ## Gotchas
//! * An `Amount` that cannot be read is `0`, not an error.
//! * Furnaces and brewing stands only ever receive the first drawn stack.
//! * Nested tables that lead back into a table being drawn fail with
//!   [`ResolveError::CyclicTable`].
//! * Nothing here is `Send`; everything runs on the host's logic thread.

mod amount;
mod complex;
mod config;
mod container;
mod duration;
mod error;
mod events;
mod external;
mod item;
mod loot_item;
pub mod placer;
mod player;
mod populator;
mod registry;
mod sampler;
mod structure;
mod table;
mod tag;

pub use amount::AmountSpec;
pub use complex::{ComplexItemStore, decode_snapshot, encode_snapshot};
pub use config::{CONFIG_FILE, Config, LootConfig};
pub use container::{
    BlockContainer, BrewerSlots, ContainerKind, FurnaceSlots, Inventory, LOOT_CHEST_KEY,
    LootContainer, PersistentData, SlotInventory,
};
pub use duration::RefreshDuration;
pub use error::{ConfigError, LootError, LootTableError, ResolveError, TagError, WeightError};
pub use events::{LootEvents, NoEvents};
pub use external::{ExternalItemRegistry, ExternalItemResolver};
pub use item::{
    DEFAULT_MAX_STACK_SIZE, FORMAT_CHAR, ItemMeta, ItemStack, loosely_equal, strip_formatting,
    translate_color_codes,
};
pub use loot_item::{Decoration, LootItem, LootItemKind};
pub use player::Player;
pub use populator::{
    LootChestPopulator, MARKER_ITEM, OpenOutcome, PopulateOutcome, can_break, is_loot_container,
    retain_breakable,
};
pub use registry::{LOOT_TABLE_FOLDER, LootTableRegistry};
pub use sampler::WeightedSampler;
pub use structure::{Structure, StructureConfig, StructureRegistry};
pub use table::{DrawContext, LootTable, LootTableBuilder};
pub use tag::{Clock, ContainerTag, SystemClock, TAG_VERSION, UNSET};
