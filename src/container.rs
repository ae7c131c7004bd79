//! Container blocks, their inventory topologies and attached key-value data.

use crate::error::TagError;
use crate::item::ItemStack;
use crate::tag::ContainerTag;
use std::collections::BTreeMap;
use std::fmt;

/// Key the loot tag is stored under in a container's [`PersistentData`].
pub const LOOT_CHEST_KEY: &str = "structure_loot:loot_chest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKind {
    Chest,
    TrappedChest,
    Barrel,
    ShulkerBox,
    Hopper,
    Dispenser,
    Dropper,
    Furnace,
    BlastFurnace,
    Smoker,
    BrewingStand,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 11] = [
        ContainerKind::Chest,
        ContainerKind::TrappedChest,
        ContainerKind::Barrel,
        ContainerKind::ShulkerBox,
        ContainerKind::Hopper,
        ContainerKind::Dispenser,
        ContainerKind::Dropper,
        ContainerKind::Furnace,
        ContainerKind::BlastFurnace,
        ContainerKind::Smoker,
        ContainerKind::BrewingStand,
    ];

    /// Parse a block name such as `chest`, `BLAST_FURNACE` or `minecraft:red_shulker_box`.
    pub fn from_block_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        let name = name.strip_prefix("minecraft:").unwrap_or(&name);
        let kind = match name {
            "chest" => ContainerKind::Chest,
            "trapped_chest" => ContainerKind::TrappedChest,
            "barrel" => ContainerKind::Barrel,
            "hopper" => ContainerKind::Hopper,
            "dispenser" => ContainerKind::Dispenser,
            "dropper" => ContainerKind::Dropper,
            "furnace" => ContainerKind::Furnace,
            "blast_furnace" => ContainerKind::BlastFurnace,
            "smoker" => ContainerKind::Smoker,
            "brewing_stand" => ContainerKind::BrewingStand,
            _ if name.ends_with("shulker_box") => ContainerKind::ShulkerBox,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Chest => "CHEST",
            ContainerKind::TrappedChest => "TRAPPED_CHEST",
            ContainerKind::Barrel => "BARREL",
            ContainerKind::ShulkerBox => "SHULKER_BOX",
            ContainerKind::Hopper => "HOPPER",
            ContainerKind::Dispenser => "DISPENSER",
            ContainerKind::Dropper => "DROPPER",
            ContainerKind::Furnace => "FURNACE",
            ContainerKind::BlastFurnace => "BLAST_FURNACE",
            ContainerKind::Smoker => "SMOKER",
            ContainerKind::BrewingStand => "BREWING_STAND",
        }
    }

    /// An empty inventory shaped like this container's.
    pub fn default_inventory(self) -> Inventory {
        match self {
            ContainerKind::Chest
            | ContainerKind::TrappedChest
            | ContainerKind::Barrel
            | ContainerKind::ShulkerBox => Inventory::Generic(SlotInventory::new(27)),
            ContainerKind::Hopper => Inventory::Generic(SlotInventory::new(5)),
            ContainerKind::Dispenser | ContainerKind::Dropper => {
                Inventory::Generic(SlotInventory::new(9))
            }
            ContainerKind::Furnace | ContainerKind::BlastFurnace | ContainerKind::Smoker => {
                Inventory::Furnace(FurnaceSlots::default())
            }
            ContainerKind::BrewingStand => Inventory::Brewer(BrewerSlots::default()),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size row of optional stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
}

impl SlotInventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn get_stack(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot)?.as_ref()
    }

    /// Out-of-range slots are ignored.
    pub fn set_stack(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = stack.filter(|s| s.count > 0);
        }
    }

    pub fn remove_stack(&mut self, slot: usize) -> Option<ItemStack> {
        self.slots.get_mut(slot)?.take()
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FurnaceSlots {
    pub smelting: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
    pub result: Option<ItemStack>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrewerSlots {
    pub bottles: [Option<ItemStack>; 3],
    pub ingredient: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
}

/// Inventory topology of a container.
///
/// Slot indices follow the block layout: a furnace is smelting, fuel, result; a
/// brewing stand is three bottles, ingredient, fuel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inventory {
    Generic(SlotInventory),
    Furnace(FurnaceSlots),
    Brewer(BrewerSlots),
}

impl Inventory {
    pub fn size(&self) -> usize {
        match self {
            Inventory::Generic(inv) => inv.size(),
            Inventory::Furnace(_) => 3,
            Inventory::Brewer(_) => 5,
        }
    }

    fn slot(&self, slot: usize) -> Option<&Option<ItemStack>> {
        match self {
            Inventory::Generic(inv) => inv.slots.get(slot),
            Inventory::Furnace(f) => [&f.smelting, &f.fuel, &f.result].get(slot).copied(),
            Inventory::Brewer(b) => {
                let [a, c, d] = &b.bottles;
                [a, c, d, &b.ingredient, &b.fuel].get(slot).copied()
            }
        }
    }

    fn slot_mut(&mut self, slot: usize) -> Option<&mut Option<ItemStack>> {
        match self {
            Inventory::Generic(inv) => inv.slots.get_mut(slot),
            Inventory::Furnace(f) => match slot {
                0 => Some(&mut f.smelting),
                1 => Some(&mut f.fuel),
                2 => Some(&mut f.result),
                _ => None,
            },
            Inventory::Brewer(b) => match slot {
                0..=2 => b.bottles.get_mut(slot),
                3 => Some(&mut b.ingredient),
                4 => Some(&mut b.fuel),
                _ => None,
            },
        }
    }

    pub fn get_stack(&self, slot: usize) -> Option<&ItemStack> {
        self.slot(slot)?.as_ref()
    }

    pub fn set_stack(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(entry) = self.slot_mut(slot) {
            *entry = stack.filter(|s| s.count > 0);
        }
    }

    pub fn remove_stack(&mut self, slot: usize) -> Option<ItemStack> {
        self.slot_mut(slot)?.take()
    }

    pub fn stacks(&self) -> Vec<&ItemStack> {
        (0..self.size()).filter_map(|i| self.get_stack(i)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks().is_empty()
    }

    /// Units of `item` across every slot.
    pub fn count_of(&self, item: &str) -> u32 {
        self.stacks()
            .iter()
            .filter(|s| s.item == item)
            .map(|s| s.count)
            .sum()
    }
}

/// Namespaced string values attached to a container block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistentData {
    values: BTreeMap<String, String>,
}

impl PersistentData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// A container block as seen by loot generation.
///
/// Changes to [`data_mut`](Self::data_mut) are only committed by
/// [`update`](Self::update); hosts where committing also resyncs the inventory
/// need inventory changes to happen after the update.
pub trait LootContainer {
    fn kind(&self) -> ContainerKind;
    fn data(&self) -> &PersistentData;
    fn data_mut(&mut self) -> &mut PersistentData;
    fn inventory(&self) -> &Inventory;
    fn inventory_mut(&mut self) -> &mut Inventory;
    fn update(&mut self);

    /// The loot tag, if this container carries one.
    fn loot_tag(&self) -> Result<Option<ContainerTag>, TagError> {
        self.data()
            .get(LOOT_CHEST_KEY)
            .map(ContainerTag::from_json)
            .transpose()
    }

    fn set_loot_tag(&mut self, tag: &ContainerTag) -> Result<(), TagError> {
        let json = tag.to_json()?;
        self.data_mut().set(LOOT_CHEST_KEY, json);
        Ok(())
    }

    fn is_loot_container(&self) -> bool {
        self.data().contains(LOOT_CHEST_KEY)
    }
}

/// In-memory container block.
#[derive(Debug, Clone)]
pub struct BlockContainer {
    kind: ContainerKind,
    data: PersistentData,
    committed: PersistentData,
    inventory: Inventory,
}

impl BlockContainer {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            data: PersistentData::default(),
            committed: PersistentData::default(),
            inventory: kind.default_inventory(),
        }
    }

    /// Data as of the last [`update`](LootContainer::update).
    pub fn committed(&self) -> &PersistentData {
        &self.committed
    }
}

impl LootContainer for BlockContainer {
    fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn data(&self) -> &PersistentData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut PersistentData {
        &mut self.data
    }

    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    fn update(&mut self) {
        self.committed = self.data.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_names() {
        assert_eq!(
            ContainerKind::from_block_name("minecraft:blast_furnace"),
            Some(ContainerKind::BlastFurnace)
        );
        assert_eq!(
            ContainerKind::from_block_name("CHEST"),
            Some(ContainerKind::Chest)
        );
        assert_eq!(
            ContainerKind::from_block_name("light_blue_shulker_box"),
            Some(ContainerKind::ShulkerBox)
        );
        assert_eq!(ContainerKind::from_block_name("crafting_table"), None);
        for kind in ContainerKind::ALL {
            assert_eq!(ContainerKind::from_block_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn topologies() {
        assert_eq!(ContainerKind::Chest.default_inventory().size(), 27);
        assert_eq!(ContainerKind::Hopper.default_inventory().size(), 5);
        assert!(matches!(
            ContainerKind::Smoker.default_inventory(),
            Inventory::Furnace(_)
        ));
        assert!(matches!(
            ContainerKind::BrewingStand.default_inventory(),
            Inventory::Brewer(_)
        ));
    }

    #[test]
    fn fixed_role_slot_indices() {
        let mut furnace = ContainerKind::Furnace.default_inventory();
        furnace.set_stack(2, Some(ItemStack::new("IRON_INGOT", 4)));
        let Inventory::Furnace(slots) = &furnace else {
            unreachable!()
        };
        assert_eq!(slots.result.as_ref().map(|s| s.count), Some(4));

        let mut brewer = ContainerKind::BrewingStand.default_inventory();
        brewer.set_stack(3, Some(ItemStack::new("NETHER_WART", 1)));
        assert_eq!(brewer.count_of("NETHER_WART"), 1);
        assert_eq!(brewer.remove_stack(3).map(|s| s.item), Some("NETHER_WART".into()));
        assert!(brewer.is_empty());
    }

    #[test]
    fn zero_count_stacks_leave_the_slot_empty() {
        let mut inv = SlotInventory::new(3);
        inv.set_stack(1, Some(ItemStack::new("STONE", 0)));
        assert!(inv.is_empty());
        inv.set_stack(1, Some(ItemStack::new("STONE", 2)));
        inv.set_stack(9, Some(ItemStack::new("STONE", 2)));
        assert_eq!(inv.first_empty(), Some(0));
        assert_eq!(inv.stacks().count(), 1);
    }

    #[test]
    fn tag_lives_in_persistent_data() {
        let mut block = BlockContainer::new(ContainerKind::Barrel);
        assert!(block.loot_tag().unwrap().is_none());
        let tag = ContainerTag::new("ruin", None);
        block.set_loot_tag(&tag).unwrap();
        assert!(block.is_loot_container());
        assert!(!block.committed().contains(LOOT_CHEST_KEY));
        block.update();
        assert!(block.committed().contains(LOOT_CHEST_KEY));
        assert_eq!(block.loot_tag().unwrap(), Some(tag));

        block.data_mut().set(LOOT_CHEST_KEY, "garbage");
        assert!(block.loot_tag().is_err());
    }
}
