use crate::container::LootContainer;
use crate::player::Player;
use crate::structure::Structure;
use crate::table::LootTable;
use crate::tag::ContainerTag;

/// Hooks the host can use to watch or veto loot generation.
///
/// Each hook returns whether to proceed; the defaults always do.
pub trait LootEvents {
    /// A player opened a loot container. `explicit_table` is set when the tag names one.
    fn on_open(
        &mut self,
        _player: &Player,
        _structure: &Structure,
        _container: &dyn LootContainer,
        _tag: &ContainerTag,
        _explicit_table: Option<&LootTable>,
    ) -> bool {
        true
    }

    /// A scheduled refill came due.
    fn before_refill(&mut self, _player: &Player, _tag: &ContainerTag) -> bool {
        true
    }

    /// `table` is about to fill `container`.
    fn before_populate(
        &mut self,
        _player: Option<&Player>,
        _structure: &Structure,
        _container: &dyn LootContainer,
        _table: &LootTable,
        _tag: &ContainerTag,
    ) -> bool {
        true
    }
}

/// Proceeds with everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl LootEvents for NoEvents {}
