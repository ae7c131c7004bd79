//! Loot generation for structure containers.
//!
//! Loot is generated when a player opens a container, not when the structure is
//! placed. Placement only writes a [`ContainerTag`] naming the structure (and
//! optionally a loot table); [`LootChestPopulator::open`] later reads it back,
//! decides whether the container is due and fills it.

use crate::config::{Config, LootConfig};
use crate::container::LootContainer;
use crate::error::LootError;
use crate::events::{LootEvents, NoEvents};
use crate::external::ExternalItemRegistry;
use crate::item::ItemStack;
use crate::placer;
use crate::player::Player;
use crate::registry::LootTableRegistry;
use crate::structure::StructureRegistry;
use crate::table::{DrawContext, LootTable};
use crate::tag::{Clock, ContainerTag, SystemClock};
use rand::Rng;
use std::rc::Rc;
use tracing::{debug, warn};

/// Item type of the slot-0 marker that pins a container to a loot table.
pub const MARKER_ITEM: &str = "PAPER";
const MARKER_PREFIX: &str = "%${";
const MARKER_SUFFIX: &str = "}$%";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The container carries no loot tag.
    NotLootContainer,
    /// An open hook vetoed the interaction.
    Denied,
    /// Spectators never trigger generation.
    Spectating,
    /// Already filled and no refill is due.
    NotDue,
    Populated(PopulateOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    NoTag,
    /// The structure has no loot tables at all.
    NoLootTables,
    /// The structure has no pool for this kind of container.
    NoPoolForContainer,
    Cancelled,
    Filled {
        table: String,
        /// Everything drawn, including units the placer had no room for.
        stacks: Vec<ItemStack>,
    },
}

pub struct LootChestPopulator {
    config: LootConfig,
    structures: StructureRegistry,
    tables: LootTableRegistry,
    externals: ExternalItemRegistry,
    events: Box<dyn LootEvents>,
    clock: Box<dyn Clock>,
}

impl LootChestPopulator {
    pub fn new(
        config: LootConfig,
        structures: StructureRegistry,
        tables: LootTableRegistry,
        externals: ExternalItemRegistry,
    ) -> Self {
        Self {
            config,
            structures,
            tables,
            externals,
            events: Box::new(NoEvents),
            clock: Box::new(SystemClock),
        }
    }

    /// Load the structures named in `config` against `tables`.
    pub fn from_config(
        config: &Config,
        mut tables: LootTableRegistry,
        externals: ExternalItemRegistry,
    ) -> Self {
        let structures = StructureRegistry::from_config(&config.structures, &mut tables);
        Self::new(config.lootables.clone(), structures, tables, externals)
    }

    pub fn with_events(mut self, events: impl LootEvents + 'static) -> Self {
        self.events = Box::new(events);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &LootConfig {
        &self.config
    }

    pub fn structures(&self) -> &StructureRegistry {
        &self.structures
    }

    pub fn structures_mut(&mut self) -> &mut StructureRegistry {
        &mut self.structures
    }

    pub fn tables_mut(&mut self) -> &mut LootTableRegistry {
        &mut self.tables
    }

    pub fn externals_mut(&mut self) -> &mut ExternalItemRegistry {
        &mut self.externals
    }

    /// Mark `container` as loot of `structure_name`.
    ///
    /// A paper named `%${table}$%` in slot 0 pins the container to `table`; the
    /// paper is removed once the tag has been committed.
    pub fn write_tag(
        &self,
        structure_name: &str,
        container: &mut dyn LootContainer,
    ) -> Result<ContainerTag, LootError> {
        if !self.structures.contains(structure_name) {
            return Err(LootError::UnknownStructure(structure_name.to_owned()));
        }
        let explicit = container.inventory().get_stack(0).and_then(marker_table);
        let tag = ContainerTag::new(structure_name, explicit.clone());
        container.set_loot_tag(&tag)?;
        container.update();
        if explicit.is_some() {
            container.inventory_mut().remove_stack(0);
        }
        Ok(tag)
    }

    /// Handle `player` opening `container`.
    pub fn open<R: Rng + ?Sized>(
        &mut self,
        player: &Player,
        container: &mut dyn LootContainer,
        rng: &mut R,
    ) -> Result<OpenOutcome, LootError> {
        let Some(tag) = container.loot_tag()? else {
            return Ok(OpenOutcome::NotLootContainer);
        };
        let Some(structure) = self.structures.get(tag.structure_name()) else {
            warn!(
                "the structure named \"{}\" in a loot chest tag was not found",
                tag.structure_name()
            );
            return Err(LootError::UnknownStructure(tag.structure_name().to_owned()));
        };
        let explicit = match tag.explicit_table() {
            Some(name) => Some(
                self.tables
                    .get(name)
                    .ok_or_else(|| LootError::MissingTable(name.to_owned()))?,
            ),
            None => None,
        };

        if !self
            .events
            .on_open(player, structure, &*container, &tag, explicit.as_deref())
        {
            return Ok(OpenOutcome::Denied);
        }
        if player.spectator {
            return Ok(OpenOutcome::Spectating);
        }
        let now = self.clock.now_millis();
        if !tag.should_refill(Some(player), &self.config, now, self.events.as_mut()) {
            return Ok(OpenOutcome::NotDue);
        }
        Ok(OpenOutcome::Populated(self.populate(
            Some(player),
            container,
            rng,
        )?))
    }

    /// Fill `container` from its tag, regardless of refill timing.
    ///
    /// The updated tag is committed before the inventory is touched.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        player: Option<&Player>,
        container: &mut dyn LootContainer,
        rng: &mut R,
    ) -> Result<PopulateOutcome, LootError> {
        let Some(mut tag) = container.loot_tag()? else {
            return Ok(PopulateOutcome::NoTag);
        };
        let structure = self
            .structures
            .get(tag.structure_name())
            .ok_or_else(|| LootError::UnknownStructure(tag.structure_name().to_owned()))?;
        if !structure.has_loot_tables() {
            return Ok(PopulateOutcome::NoLootTables);
        }

        let table_name = match tag.explicit_table() {
            Some(name) => name.to_owned(),
            None => match structure.pick_table(container.kind(), rng) {
                Some(name) => name.to_owned(),
                None => return Ok(PopulateOutcome::NoPoolForContainer),
            },
        };
        let table: Rc<LootTable> = self
            .tables
            .get(&table_name)
            .ok_or_else(|| LootError::MissingTable(table_name.clone()))?;

        if !self
            .events
            .before_populate(player, structure, &*container, &table, &tag)
        {
            debug!(
                "population of a {} in {} was cancelled",
                container.kind(),
                structure.name()
            );
            return Ok(PopulateOutcome::Cancelled);
        }

        tag.process_refill(player, &self.config, self.clock.now_millis(), rng);
        container.set_loot_tag(&tag)?;
        container.update();

        let stacks = {
            let mut ctx = DrawContext::new(&mut self.tables, &self.externals);
            table.draw_all(&mut ctx, player, rng)?
        };
        placer::place(&stacks, container.inventory_mut(), rng);
        debug!(
            "filled a {} in {} from {} with {} stacks",
            container.kind(),
            tag.structure_name(),
            table.name(),
            stacks.len()
        );
        Ok(PopulateOutcome::Filled {
            table: table.name().to_owned(),
            stacks,
        })
    }
}

fn marker_table(stack: &ItemStack) -> Option<String> {
    if stack.item != MARKER_ITEM {
        return None;
    }
    let name = stack.display_name()?.trim();
    let inner = name
        .strip_prefix(MARKER_PREFIX)?
        .strip_suffix(MARKER_SUFFIX)?
        .trim();
    (!inner.is_empty()).then(|| inner.to_owned())
}

/// Whether `container` holds a loot tag.
pub fn is_loot_container(container: &dyn LootContainer) -> bool {
    container.is_loot_container()
}

/// Loot containers only break for players allowed to bypass the protection.
pub fn can_break(container: &dyn LootContainer, has_bypass_permission: bool) -> bool {
    has_bypass_permission || !container.is_loot_container()
}

/// Drop every loot container from an explosion's block list.
pub fn retain_breakable<B>(
    blocks: &mut Vec<B>,
    as_container: impl Fn(&B) -> Option<&dyn LootContainer>,
) {
    blocks.retain(|block| !as_container(block).is_some_and(|c| c.is_loot_container()));
}
