//! Units and the factions that own them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player faction, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faction(pub String);

impl Faction {
    pub fn new(name: impl Into<String>) -> Self {
        Faction(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Faction {
    fn from(name: &str) -> Self {
        Faction(name.to_string())
    }
}

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Footman,
    /// Moves up to two regions in one round.
    Knight,
    Ship,
    /// Conquers castles without a siege.
    Catapult,
}

impl UnitType {
    /// Returns the lowercase protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            UnitType::Footman => "footman",
            UnitType::Knight => "knight",
            UnitType::Ship => "ship",
            UnitType::Catapult => "catapult",
        }
    }

    /// Parses a unit type from its protocol name.
    pub fn from_name(name: &str) -> Option<UnitType> {
        match name {
            "footman" => Some(UnitType::Footman),
            "knight" => Some(UnitType::Knight),
            "ship" => Some(UnitType::Ship),
            "catapult" => Some(UnitType::Catapult),
            _ => None,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit standing in a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub faction: Faction,
}

impl Unit {
    pub fn new(unit_type: UnitType, faction: impl Into<Faction>) -> Self {
        Unit {
            unit_type,
            faction: faction.into(),
        }
    }
}
