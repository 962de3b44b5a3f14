//! Map definitions.
//!
//! A board is created from a [`MapDefinition`], the JSON document sent with
//! the `gamestarted` command, or from a [`BoardBuilder`] in code.

use serde::{Deserialize, Serialize};

use super::region::DangerZone;
use super::state::Board;
use super::unit::{Faction, Unit, UnitType};

/// Errors raised while turning a map definition into a board.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map has no regions")]
    Empty,

    #[error("duplicate region '{0}'")]
    DuplicateRegion(String),

    #[error("region '{region}' lists unknown neighbor '{neighbor}'")]
    UnknownNeighbor { region: String, neighbor: String },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("map has {0} regions, more than a board can index")]
    TooManyRegions(usize),
}

/// Edge to a neighbor, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborDefinition {
    pub name: String,
    #[serde(default)]
    pub across_water: bool,
    #[serde(default)]
    pub cliffs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger_zone: Option<DangerZone>,
}

/// A region with its static data and the state it starts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDefinition {
    pub name: String,
    #[serde(default)]
    pub neighbors: Vec<NeighborDefinition>,
    #[serde(default)]
    pub sea: bool,
    #[serde(default)]
    pub forest: bool,
    #[serde(default)]
    pub castle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_faction: Option<Faction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controlling_faction: Option<Faction>,
    #[serde(default)]
    pub siege_count: u8,
}

impl RegionDefinition {
    fn new(name: &str) -> Self {
        RegionDefinition {
            name: name.to_string(),
            neighbors: Vec::new(),
            sea: false,
            forest: false,
            castle: false,
            nation: None,
            home_faction: None,
            unit: None,
            controlling_faction: None,
            siege_count: 0,
        }
    }
}

/// The full board as a serializable document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub regions: Vec<RegionDefinition>,
}

/// Incremental construction of small boards, mostly for tests and benches.
///
/// Edges added with [`connect`](Self::connect) go both ways.
#[derive(Debug, Default)]
pub struct BoardBuilder {
    definition: MapDefinition,
    unknown: Vec<String>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn land(mut self, name: &str) -> Self {
        self.definition.regions.push(RegionDefinition::new(name));
        self
    }

    pub fn sea(mut self, name: &str) -> Self {
        let mut region = RegionDefinition::new(name);
        region.sea = true;
        self.definition.regions.push(region);
        self
    }

    pub fn castle(mut self, name: &str) -> Self {
        let mut region = RegionDefinition::new(name);
        region.castle = true;
        self.definition.regions.push(region);
        self
    }

    pub fn forest(self, name: &str) -> Self {
        self.with(name, |r| r.forest = true)
    }

    pub fn connect(self, a: &str, b: &str) -> Self {
        self.connect_edge(a, b, None)
    }

    /// Adds an edge that crosses the named danger zone.
    pub fn connect_via(self, a: &str, b: &str, danger_zone: &str) -> Self {
        self.connect_edge(a, b, Some(DangerZone::new(danger_zone)))
    }

    fn connect_edge(self, a: &str, b: &str, danger_zone: Option<DangerZone>) -> Self {
        let edge = |name: &str| NeighborDefinition {
            name: name.to_string(),
            across_water: false,
            cliffs: false,
            danger_zone: danger_zone.clone(),
        };
        let (to_b, to_a) = (edge(b), edge(a));
        self.with(a, |r| r.neighbors.push(to_b))
            .with(b, |r| r.neighbors.push(to_a))
    }

    pub fn unit(self, name: &str, unit_type: UnitType, faction: &str) -> Self {
        self.with(name, |r| r.unit = Some(Unit::new(unit_type, faction)))
    }

    pub fn control(self, name: &str, faction: &str) -> Self {
        self.with(name, |r| r.controlling_faction = Some(Faction::from(faction)))
    }

    /// Marks a region as a home region of `faction` within `nation`.
    pub fn home(self, name: &str, nation: &str, faction: &str) -> Self {
        self.with(name, |r| {
            r.nation = Some(nation.to_string());
            r.home_faction = Some(Faction::from(faction));
        })
    }

    pub fn nation(self, name: &str, nation: &str) -> Self {
        self.with(name, |r| r.nation = Some(nation.to_string()))
    }

    pub fn siege_count(self, name: &str, count: u8) -> Self {
        self.with(name, |r| r.siege_count = count)
    }

    fn with(mut self, name: &str, f: impl FnOnce(&mut RegionDefinition)) -> Self {
        match self.definition.regions.iter_mut().find(|r| r.name == name) {
            Some(region) => f(region),
            None => self.unknown.push(name.to_string()),
        }
        self
    }

    pub fn definition(&self) -> &MapDefinition {
        &self.definition
    }

    pub fn build(self) -> Result<Board, MapError> {
        if let Some(name) = self.unknown.into_iter().next() {
            return Err(MapError::UnknownRegion(name));
        }
        Board::from_definition(&self.definition)
    }
}
