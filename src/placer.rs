//! Spreading drawn stacks over a container's slots.

use crate::container::{BrewerSlots, FurnaceSlots, Inventory, SlotInventory};
use crate::item::ItemStack;
use rand::Rng;

/// Place `stacks` into `inventory` according to its topology.
///
/// Generic inventories scatter every unit of every stack over random slots.
/// Furnaces and brewing stands only take the first stack, into the first empty role.
pub fn place<R: Rng + ?Sized>(stacks: &[ItemStack], inventory: &mut Inventory, rng: &mut R) {
    match inventory {
        Inventory::Generic(slots) => place_scattered(stacks, slots, rng),
        Inventory::Furnace(slots) => place_furnace(stacks, slots),
        Inventory::Brewer(slots) => place_brewer(stacks, slots),
    }
}

/// Each unit probes up to `size` random slots: it joins a similar stack with room,
/// or starts a new stack in an empty slot. Units that find neither are dropped,
/// and the rest of a stack is dropped once nothing in the inventory can take it.
/// Placement stops once the inventory has no empty slot left.
pub fn place_scattered<R: Rng + ?Sized>(
    stacks: &[ItemStack],
    inventory: &mut SlotInventory,
    rng: &mut R,
) {
    let size = inventory.size();
    if size == 0 {
        return;
    }
    for loot in stacks {
        if inventory.first_empty().is_none() {
            return;
        }
        for _ in 0..loot.count {
            if !probe_unit(loot, inventory, rng) && !has_room_for(loot, inventory) {
                break;
            }
        }
    }
}

fn probe_unit<R: Rng + ?Sized>(
    loot: &ItemStack,
    inventory: &mut SlotInventory,
    rng: &mut R,
) -> bool {
    let size = inventory.size();
    for _ in 0..size {
        let pos = rng.random_range(0..size);
        match inventory.get_stack(pos) {
            Some(existing) => {
                if existing.is_similar(loot) && existing.count < loot.max_stack_size {
                    let grown = loot.clone().with_count(existing.count + 1);
                    inventory.set_stack(pos, Some(grown));
                    return true;
                }
            }
            None => {
                inventory.set_stack(pos, Some(loot.clone().with_count(1)));
                return true;
            }
        }
    }
    false
}

// once this is false every remaining unit of `loot` would miss too
fn has_room_for(loot: &ItemStack, inventory: &SlotInventory) -> bool {
    inventory.first_empty().is_some()
        || inventory
            .stacks()
            .any(|s| s.is_similar(loot) && s.count < loot.max_stack_size)
}

fn place_furnace(stacks: &[ItemStack], slots: &mut FurnaceSlots) {
    let Some(loot) = stacks.first() else {
        return;
    };
    fill_first_vacant(
        [&mut slots.result, &mut slots.fuel, &mut slots.smelting],
        loot,
    );
}

fn place_brewer(stacks: &[ItemStack], slots: &mut BrewerSlots) {
    let Some(loot) = stacks.first() else {
        return;
    };
    fill_first_vacant([&mut slots.ingredient, &mut slots.fuel], loot);
}

fn fill_first_vacant<const N: usize>(roles: [&mut Option<ItemStack>; N], loot: &ItemStack) {
    if loot.count == 0 {
        return;
    }
    if let Some(role) = roles.into_iter().find(|role| role.is_none()) {
        *role = Some(loot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerKind;
    use rand::{SeedableRng, rngs::StdRng};

    fn stone(count: u32) -> ItemStack {
        ItemStack::new("STONE", count)
    }

    #[test]
    fn every_unit_lands_in_an_empty_chest() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut chest = ContainerKind::Chest.default_inventory();
            place(&[stone(3)], &mut chest, &mut rng);
            assert_eq!(chest.count_of("STONE"), 3);
            assert!(chest.stacks().iter().all(|s| s.count >= 1 && s.count <= 3));
        }
    }

    #[test]
    fn joins_a_similar_stack() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut inv = SlotInventory::new(1);
        inv.set_stack(0, Some(stone(5)));
        place_scattered(&[stone(2)], &mut inv, &mut rng);
        // the only slot is occupied, so the first-empty guard stops placement
        assert_eq!(inv.get_stack(0).map(|s| s.count), Some(5));

        let mut inv = SlotInventory::new(2);
        inv.set_stack(0, Some(stone(5)));
        place_scattered(&[stone(2)], &mut inv, &mut rng);
        let total: u32 = inv.stacks().map(|s| s.count).sum();
        assert_eq!(total, 7);
        let grew = inv.get_stack(0).is_some_and(|s| s.count > 5);
        assert!(grew || inv.get_stack(1).is_some_and(|s| s.count == 2));
    }

    #[test]
    fn full_stacks_and_strangers_are_not_merged() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut inv = SlotInventory::new(3);
            inv.set_stack(0, Some(stone(64)));
            inv.set_stack(1, Some(ItemStack::new("DIRT", 1)));
            place_scattered(&[stone(1)], &mut inv, &mut rng);
            assert_eq!(inv.get_stack(0), Some(&stone(64)));
            assert_eq!(inv.get_stack(1), Some(&ItemStack::new("DIRT", 1)));
            assert!(inv.get_stack(2).is_none_or(|s| *s == stone(1)));
        }
    }

    #[test]
    fn units_that_find_no_room_are_dropped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut inv = SlotInventory::new(2);
        let saddles = ItemStack::new("SADDLE", 5).with_max_stack_size(1);
        place_scattered(&[saddles], &mut inv, &mut rng);
        let placed: u32 = inv.stacks().map(|s| s.count).sum();
        assert!(placed <= 2);
        assert!(inv.stacks().all(|s| s.count == 1));
    }

    #[test]
    fn huge_amounts_stop_once_the_inventory_is_full() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut inv = SlotInventory::new(3);
        place_scattered(&[stone(2_000_000_000)], &mut inv, &mut rng);
        let placed: u32 = inv.stacks().map(|s| s.count).sum();
        assert!(placed <= 3 * 64);
        assert!(inv.stacks().all(|s| s.item == "STONE"));
    }

    #[test]
    fn furnace_takes_only_the_first_stack() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut furnace = ContainerKind::Furnace.default_inventory();
        place(
            &[ItemStack::new("IRON_INGOT", 4), ItemStack::new("COAL", 8)],
            &mut furnace,
            &mut rng,
        );
        place(&[ItemStack::new("COAL", 8)], &mut furnace, &mut rng);
        place(&[ItemStack::new("RAW_IRON", 2)], &mut furnace, &mut rng);
        place(&[ItemStack::new("SAND", 2)], &mut furnace, &mut rng);

        let Inventory::Furnace(slots) = furnace else {
            unreachable!()
        };
        assert_eq!(slots.result, Some(ItemStack::new("IRON_INGOT", 4)));
        assert_eq!(slots.fuel, Some(ItemStack::new("COAL", 8)));
        assert_eq!(slots.smelting, Some(ItemStack::new("RAW_IRON", 2)));
    }

    #[test]
    fn brewer_fills_ingredient_then_fuel() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut brewer = ContainerKind::BrewingStand.default_inventory();
        place(&[], &mut brewer, &mut rng);
        assert!(brewer.is_empty());
        place(&[ItemStack::new("NETHER_WART", 1)], &mut brewer, &mut rng);
        place(&[ItemStack::new("BLAZE_POWDER", 3)], &mut brewer, &mut rng);
        place(&[ItemStack::new("SUGAR", 3)], &mut brewer, &mut rng);

        let Inventory::Brewer(slots) = brewer else {
            unreachable!()
        };
        assert_eq!(slots.ingredient, Some(ItemStack::new("NETHER_WART", 1)));
        assert_eq!(slots.fuel, Some(ItemStack::new("BLAZE_POWDER", 3)));
        assert!(slots.bottles.iter().all(Option::is_none));
    }
}
