//! Loads loot tables from a scratch directory, tags a chest and a furnace, and
//! opens them a few times with a clock that moves forward.
//!
//! `RUST_LOG=structure_loot=debug cargo run --example fill_chest`

use std::cell::Cell;
use std::error::Error;
use std::fs;
use std::rc::Rc;

use structure_loot::{
    BlockContainer, CONFIG_FILE, Clock, ComplexItemStore, Config, ContainerKind,
    ExternalItemRegistry, ItemMeta, ItemStack, LOOT_TABLE_FOLDER, LootChestPopulator,
    LootContainer, LootTableRegistry, Player,
};
use tracing::info;

const CHEST_TABLE: &str = r#"
Rolls = 4
Replacement = true

[Items.bread]
Type = "BREAD"
Weight = 6
Amount = "[2:5]"

[Items.blade]
Type = "IRON_SWORD"
Weight = 2
Name = "&6Old Blade"
Lore = ["&7Found in the ruins"]
Enchantments = { sharpness = "[1:3]" }

[Items.relic]
Type = "COMPLEX"
Key = "relic"
Weight = 1

[Items.gem]
Type = "PLUGIN"
ID = "gems:ruby"
Weight = 1
Amount = 2

[Items.ores]
Type = "TABLE"
Key = "ores"
Weight = 2
"#;

const ORE_TABLE: &str = r#"
Rolls = 2
Replacement = false

[Items.iron]
Type = "IRON_INGOT"
Weight = 3
Amount = "[1:3]"

[Items.gold]
Type = "GOLD_INGOT"
Weight = 1
"#;

const CONFIG: &str = r#"
[lootables]
auto_refill = true
max_refills = 3
refresh_min = "10m"
refresh_max = "20m"

[structures.ruin.loot_tables.chest]
ruin_chest = 1

[structures.ruin.loot_tables.furnace]
ores = 1
"#;

#[derive(Clone, Default)]
struct DemoClock(Rc<Cell<i64>>);

impl Clock for DemoClock {
    fn now_millis(&self) -> i64 {
        self.0.get()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let root = std::env::temp_dir().join("structure_loot_demo");
    fs::create_dir_all(root.join(LOOT_TABLE_FOLDER))?;
    fs::write(root.join(LOOT_TABLE_FOLDER).join("ruin_chest.toml"), CHEST_TABLE)?;
    fs::write(root.join(LOOT_TABLE_FOLDER).join("ores.toml"), ORE_TABLE)?;
    fs::write(root.join(CONFIG_FILE), CONFIG)?;

    let mut complex = ComplexItemStore::open(root.join("complex_items.toml"))?;
    let relic = ItemStack::new("NETHER_STAR", 1)
        .with_max_stack_size(1)
        .with_meta(ItemMeta {
            display_name: Some("§5Relic".into()),
            ..ItemMeta::default()
        });
    if complex.get_snapshot("relic").is_none() {
        complex.add_item("relic", &relic);
    }

    let mut externals = ExternalItemRegistry::new();
    externals.register(
        "gems",
        |reference: &str, _player: Option<&Player>| -> Result<ItemStack, String> {
            match reference {
                "ruby" => Ok(ItemStack::new("RED_DYE", 1)),
                other => Err(format!("no gem called {other}")),
            }
        },
    );

    let config = Config::load(&root)?;
    let tables = LootTableRegistry::new(&root, complex);
    let clock = DemoClock::default();
    let mut populator =
        LootChestPopulator::from_config(&config, tables, externals).with_clock(clock.clone());

    let mut chest = BlockContainer::new(ContainerKind::Chest);
    let mut furnace = BlockContainer::new(ContainerKind::Furnace);
    populator.write_tag("ruin", &mut chest)?;
    populator.write_tag("ruin", &mut furnace)?;

    let player = Player::new(uuid::Uuid::new_v4(), "Steve");
    let mut rng = rand::rng();
    for minute in [0, 5, 25, 50] {
        clock.0.set(minute * 60_000);
        let outcome = populator.open(&player, &mut chest, &mut rng)?;
        info!("minute {minute}: chest {outcome:?}");
        populator.open(&player, &mut furnace, &mut rng)?;
    }

    for stack in chest.inventory().stacks() {
        info!("chest holds {} x{}", stack.item, stack.count);
    }
    for stack in furnace.inventory().stacks() {
        info!("furnace holds {} x{}", stack.item, stack.count);
    }
    Ok(())
}
