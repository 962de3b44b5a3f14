//! Order types.
//!
//! Every order belongs to one faction's unit standing in its origin region.
//! Moves may carry a second destination (knights), the danger zone they
//! cross, and a `retreat` flag that only the engine ever sets.

use super::region::{DangerZone, Region, RegionId};
use super::unit::{Faction, Unit, UnitType};

/// The kind of an order and the data it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Move {
        destination: RegionId,
        second_destination: Option<RegionId>,
        via_danger_zone: Option<DangerZone>,
        retreat: bool,
    },
    Support {
        destination: RegionId,
    },
    Transport,
    Besiege,
    /// Winter only. `unit_type` names the unit to build.
    Build,
    /// Winter only.
    Disband,
}

impl OrderKind {
    /// Returns the lowercase protocol name.
    pub const fn name(&self) -> &'static str {
        match self {
            OrderKind::Move { .. } => "move",
            OrderKind::Support { .. } => "support",
            OrderKind::Transport => "transport",
            OrderKind::Besiege => "besiege",
            OrderKind::Build => "build",
            OrderKind::Disband => "disband",
        }
    }
}

/// An order given to a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub faction: Faction,
    pub unit_type: UnitType,
    pub origin: RegionId,
    pub kind: OrderKind,
}

impl Order {
    /// Creates a plain move order.
    pub fn new_move(
        faction: impl Into<Faction>,
        unit_type: UnitType,
        origin: RegionId,
        destination: RegionId,
    ) -> Self {
        Order {
            faction: faction.into(),
            unit_type,
            origin,
            kind: OrderKind::Move {
                destination,
                second_destination: None,
                via_danger_zone: None,
                retreat: false,
            },
        }
    }

    /// The unit carrying out this order.
    pub fn unit(&self) -> Unit {
        Unit::new(self.unit_type, self.faction.clone())
    }

    pub fn is_move(&self) -> bool {
        matches!(self.kind, OrderKind::Move { .. })
    }

    pub fn is_retreat(&self) -> bool {
        matches!(self.kind, OrderKind::Move { retreat: true, .. })
    }

    /// Destination of a move or support.
    pub fn destination(&self) -> Option<RegionId> {
        match self.kind {
            OrderKind::Move { destination, .. } | OrderKind::Support { destination } => {
                Some(destination)
            }
            _ => None,
        }
    }

    /// Destination of a move, None for every other kind.
    pub fn move_destination(&self) -> Option<RegionId> {
        match self.kind {
            OrderKind::Move { destination, .. } => Some(destination),
            _ => None,
        }
    }

    pub fn second_destination(&self) -> Option<RegionId> {
        match self.kind {
            OrderKind::Move {
                second_destination, ..
            } => second_destination,
            _ => None,
        }
    }

    pub fn via_danger_zone(&self) -> Option<&DangerZone> {
        match &self.kind {
            OrderKind::Move {
                via_danger_zone, ..
            } => via_danger_zone.as_ref(),
            _ => None,
        }
    }

    /// The follow-up move a knight makes from its first destination.
    pub fn second_step(&self) -> Option<Order> {
        let OrderKind::Move {
            destination,
            second_destination: Some(second),
            ..
        } = self.kind
        else {
            return None;
        };
        Some(Order {
            faction: self.faction.clone(),
            unit_type: self.unit_type,
            origin: destination,
            kind: OrderKind::Move {
                destination: second,
                second_destination: None,
                via_danger_zone: None,
                retreat: false,
            },
        })
    }

    /// Builds the order that carries a bounced unit back to its origin.
    pub fn to_retreat(&self) -> Option<Order> {
        let destination = self.move_destination()?;
        Some(Order {
            faction: self.faction.clone(),
            unit_type: self.unit_type,
            origin: destination,
            kind: OrderKind::Move {
                destination: self.origin,
                second_destination: None,
                via_danger_zone: self.via_danger_zone().cloned(),
                retreat: true,
            },
        })
    }

    /// Returns the danger zone this order has to cross to reach `destination`,
    /// if the edge from its origin carries one.
    pub fn must_cross_danger_zone<'a>(&self, destination: &'a Region) -> Option<&'a DangerZone> {
        destination
            .neighbor(self.origin, self.via_danger_zone())?
            .danger_zone
            .as_ref()
    }
}
