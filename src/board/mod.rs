//! Board representation and game-state types.
//!
//! Contains regions and their neighbor graph, units, orders, oracle battle
//! results, and the [`Board`] aggregate that a round mutates.

pub mod battle;
pub mod map;
pub mod order;
pub mod region;
pub mod state;
pub mod unit;

pub use battle::{
    Battle, BattleKind, BattleResult, Modifier, ModifierKind, MIN_RESULT_TO_CONQUER_NEUTRAL,
    MIN_RESULT_TO_SURVIVE_DANGER_ZONE,
};
pub use map::{BoardBuilder, MapDefinition, MapError, NeighborDefinition, RegionDefinition};
pub use order::{Order, OrderKind};
pub use region::{DangerZone, Neighbor, Region, RegionId};
pub use state::{Board, Phase, Season};
pub use unit::{Faction, Unit, UnitType};
