//! Regions of the board and their per-round resolving state.
//!
//! A region carries static map data (terrain, neighbors), dynamic game
//! state that survives between rounds (unit, control, siege count), and a
//! transient [`ResolvingState`] that is rebuilt every round.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::Order;
use super::unit::{Faction, Unit};

/// Index of a region within its [`Board`](super::Board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u16);

impl RegionId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Name of a hazardous crossing on a neighbor edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DangerZone(pub String);

impl DangerZone {
    pub fn new(name: impl Into<String>) -> Self {
        DangerZone(name.into())
    }
}

impl fmt::Display for DangerZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge to an adjacent region.
///
/// Two regions may be joined by several edges, told apart by their danger zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub region: RegionId,
    pub across_water: bool,
    pub cliffs: bool,
    pub danger_zone: Option<DangerZone>,
}

/// Transient state of a region while a round is being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvingState {
    pub(crate) order: Option<Order>,
    pub(crate) incoming_moves: Vec<Order>,
    pub(crate) incoming_supports: Vec<Order>,
    pub(crate) expected_second_moves: usize,
    pub(crate) incoming_second_moves: Vec<Order>,
    pub(crate) resolving_second_moves: bool,
    pub(crate) resolved: bool,
    pub(crate) transports_resolved: bool,
    pub(crate) part_of_cycle: bool,
    pub(crate) unresolved_retreat: Option<Order>,
}

/// A single region of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub neighbors: Vec<Neighbor>,
    pub sea: bool,
    pub forest: bool,
    pub castle: bool,
    pub nation: Option<String>,
    pub home_faction: Option<Faction>,

    pub unit: Option<Unit>,
    pub controlling_faction: Option<Faction>,
    pub siege_count: u8,

    pub(crate) resolving: ResolvingState,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.unit.is_none()
    }

    pub fn controlled(&self) -> bool {
        self.controlling_faction.is_some()
    }

    /// A region is attacked while any move is headed into it.
    pub fn attacked(&self) -> bool {
        !self.resolving.incoming_moves.is_empty()
    }

    /// True for land regions bordering at least one sea.
    pub fn is_coast(&self, board: &super::Board) -> bool {
        !self.sea && self.neighbors.iter().any(|n| board[n.region].sea)
    }

    /// Returns true if any edge leads to `other`.
    pub fn adjacent_to(&self, other: RegionId) -> bool {
        self.neighbors.iter().any(|n| n.region == other)
    }

    /// Finds the edge to `other`, disambiguated by danger zone when several exist.
    pub fn neighbor(&self, other: RegionId, via: Option<&DangerZone>) -> Option<&Neighbor> {
        let edges = || self.neighbors.iter().filter(move |n| n.region == other);
        let first = edges().next()?;
        let preferred = match via {
            Some(zone) => edges().find(|n| n.danger_zone.as_ref() == Some(zone)),
            None => edges().find(|n| n.danger_zone.is_none()),
        };
        Some(preferred.unwrap_or(first))
    }

    /// Places a unit, replacing any occupant. Resets the siege count.
    pub fn replace_unit(&mut self, unit: Unit) {
        self.unit = Some(unit);
        self.siege_count = 0;
    }

    /// Clears the unit. Regions mid-cycle keep whatever moved into them.
    pub fn remove_unit(&mut self) {
        if self.resolving.part_of_cycle {
            return;
        }
        self.unit = None;
        self.siege_count = 0;
    }

    /// Puts a deferred retreating unit back home once the region is free.
    pub fn resolve_retreat(&mut self) {
        if let Some(retreat) = self.resolving.unresolved_retreat.take() {
            if self.is_empty() {
                self.unit = Some(retreat.unit());
            }
        }
    }

    pub fn order(&self) -> Option<&Order> {
        self.resolving.order.as_ref()
    }

    pub fn incoming_moves(&self) -> &[Order] {
        &self.resolving.incoming_moves
    }

    pub fn incoming_supports(&self) -> &[Order] {
        &self.resolving.incoming_supports
    }

    pub fn incoming_second_moves(&self) -> &[Order] {
        &self.resolving.incoming_second_moves
    }

    pub fn expected_second_moves(&self) -> usize {
        self.resolving.expected_second_moves
    }

    pub fn resolving_second_moves(&self) -> bool {
        self.resolving.resolving_second_moves
    }

    pub fn resolved(&self) -> bool {
        self.resolving.resolved
    }

    pub fn transports_resolved(&self) -> bool {
        self.resolving.transports_resolved
    }

    pub fn part_of_cycle(&self) -> bool {
        self.resolving.part_of_cycle
    }

    pub fn unresolved_retreat(&self) -> Option<&Order> {
        self.resolving.unresolved_retreat.as_ref()
    }

    /// Drops every piece of per-round state.
    pub fn reset_resolving_state(&mut self) {
        self.resolving = ResolvingState::default();
    }
}
