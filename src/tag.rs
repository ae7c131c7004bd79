//! Per-container loot state and the refill state machine.
//!
//! A container moves from never filled, to filled, to pending refill and back to
//! filled. The tag is persisted as JSON on the container; see [`ContainerTag::to_json`].

use crate::config::LootConfig;
use crate::error::TagError;
use crate::events::LootEvents;
use crate::player::Player;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

/// Wire format version written by [`ContainerTag::to_json`].
pub const TAG_VERSION: u32 = 1;

/// Marker for "never filled" and "no refill scheduled".
pub const UNSET: i64 = -1;

/// Source of the current time in epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

fn unset() -> i64 {
    UNSET
}

fn current_version() -> u32 {
    TAG_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTag {
    #[serde(default = "current_version")]
    version: u32,
    structure_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explicit_loot_table_name: Option<String>,
    #[serde(default = "unset", alias = "lastFill")]
    last_filled_at_millis: i64,
    #[serde(default = "unset", alias = "nextRefill")]
    next_refill_at_millis: i64,
    #[serde(default, alias = "numRefills")]
    refill_count: u32,
    #[serde(default)]
    looted_players: BTreeMap<Uuid, i64>,
}

impl ContainerTag {
    pub fn new(structure_name: impl Into<String>, explicit_table: Option<String>) -> Self {
        Self {
            version: TAG_VERSION,
            structure_name: structure_name.into(),
            explicit_loot_table_name: explicit_table,
            last_filled_at_millis: UNSET,
            next_refill_at_millis: UNSET,
            refill_count: 0,
            looted_players: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TagError> {
        let mut tag: ContainerTag = serde_json::from_str(json)?;
        if tag.version > TAG_VERSION {
            return Err(TagError::UnsupportedVersion {
                found: tag.version,
                supported: TAG_VERSION,
            });
        }
        tag.version = TAG_VERSION;
        Ok(tag)
    }

    pub fn to_json(&self) -> Result<String, TagError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn structure_name(&self) -> &str {
        &self.structure_name
    }

    pub fn explicit_table(&self) -> Option<&str> {
        self.explicit_loot_table_name.as_deref()
    }

    pub fn last_filled(&self) -> i64 {
        self.last_filled_at_millis
    }

    pub fn next_refill(&self) -> i64 {
        self.next_refill_at_millis
    }

    /// Reschedule the next refill, returning the previous schedule.
    pub fn set_next_refill(&mut self, at_millis: i64) -> i64 {
        std::mem::replace(&mut self.next_refill_at_millis, at_millis)
    }

    pub fn refill_count(&self) -> u32 {
        self.refill_count
    }

    pub fn has_been_filled(&self) -> bool {
        self.last_filled_at_millis != UNSET
    }

    pub fn has_pending_refill(&self) -> bool {
        self.next_refill_at_millis != UNSET
    }

    pub fn has_player_looted(&self, player: Uuid) -> bool {
        self.looted_players.contains_key(&player)
    }

    /// When `player` last looted this container.
    pub fn last_looted(&self, player: Uuid) -> Option<i64> {
        self.looted_players.get(&player).copied()
    }

    pub fn looted_players(&self) -> impl Iterator<Item = (Uuid, i64)> + '_ {
        self.looted_players.iter().map(|(id, at)| (*id, *at))
    }

    /// Record (or forget) that `player` looted this container at `now`.
    pub fn set_player_looted(&mut self, player: Uuid, looted: bool, now: i64) {
        if looted {
            self.looted_players.insert(player, now);
        } else {
            self.looted_players.remove(&player);
        }
    }

    /// Whether the container may be (re)filled for this interaction.
    ///
    /// The first fill always proceeds, as does every fill while auto refill is off.
    /// Refills need a player, a schedule that has come due and a refill cap that
    /// has not been reached. `events` may then veto; with re-loot restriction on, a
    /// player that already looted is always refused.
    pub fn should_refill(
        &self,
        player: Option<&Player>,
        config: &LootConfig,
        now: i64,
        events: &mut dyn LootEvents,
    ) -> bool {
        if !self.has_been_filled() || !config.auto_refill {
            return true;
        }
        let Some(player) = player else {
            return false;
        };
        if !self.has_pending_refill() {
            return false;
        }
        if config.has_refill_cap() && i64::from(self.refill_count) >= config.max_refills {
            return false;
        }
        if now < self.next_refill_at_millis {
            return false;
        }

        let proceed = events.before_refill(player, self);
        if config.restrict_player_reloot && self.has_player_looted(player.id) {
            debug!(
                "refill of {} refused: {} already looted it",
                self.structure_name, player.name
            );
            return false;
        }
        proceed
    }

    /// Mark the container filled at `now` and, with auto refill on, schedule the next refill.
    pub fn process_refill<R: Rng + ?Sized>(
        &mut self,
        player: Option<&Player>,
        config: &LootConfig,
        now: i64,
        rng: &mut R,
    ) {
        self.last_filled_at_millis = now;
        if !config.auto_refill {
            return;
        }
        let (min, max) = config.refill_delay_bounds();
        let delay = rng.random_range(min..=max);
        let delay_millis = i64::try_from(delay.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.next_refill_at_millis = now.saturating_add(delay_millis);
        self.refill_count = self.refill_count.saturating_add(1);
        if let Some(player) = player {
            self.set_player_looted(player.id, true, now);
        }
        debug!(
            "{} refill #{} scheduled in {delay}s",
            self.structure_name, self.refill_count
        );
    }
}
