//! Board state.
//!
//! The [`Board`] owns every region and is the only thing a round mutates.
//! The mutation primitives here (placing, removing, succeeding, killing and
//! retreating orders) are what the resolver and battle application build on.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::battle::{Battle, BattleKind};
use super::map::{MapDefinition, MapError, NeighborDefinition, RegionDefinition};
use super::order::{Order, OrderKind};
use super::region::{Neighbor, Region, RegionId, ResolvingState};
use super::unit::{Faction, UnitType};

/// The season of a round. Winter is for builds, disbands and internal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const fn next(self) -> Season {
        match self {
            Season::Winter => Season::Spring,
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }

    pub fn from_name(name: &str) -> Option<Season> {
        match name {
            "winter" => Some(Season::Winter),
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "fall" => Some(Season::Fall),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the round stands from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    SubmittingOrders,
    OrdersSubmitted,
    ResolvingOrders,
}

/// All regions of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    regions: Vec<Region>,
    ids: HashMap<String, RegionId>,
}

impl Index<RegionId> for Board {
    type Output = Region;

    fn index(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }
}

impl IndexMut<RegionId> for Board {
    fn index_mut(&mut self, id: RegionId) -> &mut Region {
        &mut self.regions[id.index()]
    }
}

impl Board {
    /// Builds a board from a map definition, resolving neighbor names to ids.
    pub fn from_definition(definition: &MapDefinition) -> Result<Board, MapError> {
        if definition.regions.is_empty() {
            return Err(MapError::Empty);
        }
        if definition.regions.len() > u16::MAX as usize {
            return Err(MapError::TooManyRegions(definition.regions.len()));
        }

        let mut ids = HashMap::with_capacity(definition.regions.len());
        for (i, region) in definition.regions.iter().enumerate() {
            if ids.insert(region.name.clone(), RegionId(i as u16)).is_some() {
                return Err(MapError::DuplicateRegion(region.name.clone()));
            }
        }

        let mut regions = Vec::with_capacity(definition.regions.len());
        for (i, def) in definition.regions.iter().enumerate() {
            let mut neighbors = Vec::with_capacity(def.neighbors.len());
            for n in &def.neighbors {
                let region = *ids.get(&n.name).ok_or_else(|| MapError::UnknownNeighbor {
                    region: def.name.clone(),
                    neighbor: n.name.clone(),
                })?;
                neighbors.push(Neighbor {
                    region,
                    across_water: n.across_water,
                    cliffs: n.cliffs,
                    danger_zone: n.danger_zone.clone(),
                });
            }

            regions.push(Region {
                id: RegionId(i as u16),
                name: def.name.clone(),
                neighbors,
                sea: def.sea,
                forest: def.forest,
                castle: def.castle,
                nation: def.nation.clone(),
                home_faction: def.home_faction.clone(),
                unit: def.unit.clone(),
                controlling_faction: def.controlling_faction.clone(),
                siege_count: def.siege_count,
                resolving: ResolvingState::default(),
            });
        }

        Ok(Board { regions, ids })
    }

    /// Serializes the current persistent state back into a map definition.
    pub fn to_definition(&self) -> MapDefinition {
        let regions = self
            .regions
            .iter()
            .map(|r| RegionDefinition {
                name: r.name.clone(),
                neighbors: r
                    .neighbors
                    .iter()
                    .map(|n| NeighborDefinition {
                        name: self[n.region].name.clone(),
                        across_water: n.across_water,
                        cliffs: n.cliffs,
                        danger_zone: n.danger_zone.clone(),
                    })
                    .collect(),
                sea: r.sea,
                forest: r.forest,
                castle: r.castle,
                nation: r.nation.clone(),
                home_faction: r.home_faction.clone(),
                unit: r.unit.clone(),
                controlling_faction: r.controlling_faction.clone(),
                siege_count: r.siege_count,
            })
            .collect();
        MapDefinition { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.regions.len() as u16).map(RegionId)
    }

    /// Looks up a region id by name.
    pub fn id(&self, name: &str) -> Option<RegionId> {
        self.ids.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.id(name).map(|id| &self[id])
    }

    pub fn name(&self, id: RegionId) -> &str {
        &self[id].name
    }

    /// Whether the id names a region on this board.
    pub fn contains(&self, id: RegionId) -> bool {
        id.index() < self.regions.len()
    }

    /// The first region named by the order that is not on this board.
    pub fn unknown_region(&self, order: &Order) -> Option<RegionId> {
        std::iter::once(order.origin)
            .chain(order.destination())
            .chain(order.second_destination())
            .find(|&id| !self.contains(id))
    }

    /// Whether every region has finished resolving this round.
    pub fn resolved(&self) -> bool {
        self.regions.iter().all(|r| r.resolved())
    }

    pub(crate) fn mark_all_resolved(&mut self) {
        for region in &mut self.regions {
            region.resolving.resolved = true;
        }
    }

    pub fn reset_resolving_state(&mut self) {
        for region in &mut self.regions {
            region.reset_resolving_state();
        }
    }

    /// Places a round's orders. Supports go last, and a support whose origin
    /// is attacked is cut instead of placed. Returns the cut supports.
    pub fn place_orders(&mut self, orders: Vec<Order>) -> Vec<Order> {
        let (supports, others): (Vec<Order>, Vec<Order>) = orders
            .into_iter()
            .partition(|o| matches!(o.kind, OrderKind::Support { .. }));

        for order in others {
            self.place_order(order);
        }

        let mut cut = Vec::new();
        for support in supports {
            if self[support.origin].attacked() {
                cut.push(support);
            } else {
                self.place_order(support);
            }
        }
        cut
    }

    pub fn place_order(&mut self, order: Order) {
        match &order.kind {
            OrderKind::Move {
                destination,
                second_destination,
                ..
            } => {
                self[*destination]
                    .resolving
                    .incoming_moves
                    .push(order.clone());
                if let Some(second) = second_destination {
                    self[*second].resolving.expected_second_moves += 1;
                }
            }
            OrderKind::Support { destination } => {
                self[*destination]
                    .resolving
                    .incoming_supports
                    .push(order.clone());
            }
            _ => {}
        }
        let origin = order.origin;
        self[origin].resolving.order = Some(order);
    }

    /// Takes an order off the board. Retreat orders leave their origin's
    /// order slot alone, since their origin is the region they bounced from.
    pub fn remove_order(&mut self, order: &Order) {
        if !order.is_retreat() {
            let origin = &mut self[order.origin].resolving;
            if origin.order.as_ref() == Some(order) {
                origin.order = None;
            }
        }

        match order.kind {
            OrderKind::Move { destination, .. } => {
                remove_first(&mut self[destination].resolving.incoming_moves, order);
            }
            OrderKind::Support { destination } => {
                remove_first(&mut self[destination].resolving.incoming_supports, order);
            }
            _ => {}
        }
    }

    /// Moves the unit into its destination and queues a knight's second step.
    pub fn succeed_move(&mut self, mv: &Order) {
        let Some(destination_id) = mv.move_destination() else {
            return;
        };

        let destination = &mut self[destination_id];
        debug_assert!(
            destination.is_empty() || destination.controlled(),
            "move into occupied uncontrolled region {}",
            destination.name
        );
        destination.replace_unit(mv.unit());
        destination.resolving.order = None;

        // Seas cannot be held, and castles must be besieged unless taken by a catapult.
        if !destination.sea
            && (!destination.castle
                || destination.controlled()
                || mv.unit_type == UnitType::Catapult)
        {
            destination.controlling_faction = Some(mv.faction.clone());
        }

        if !mv.is_retreat() {
            self[mv.origin].remove_unit();
        }
        self.remove_order(mv);

        if let Some(step) = mv.second_step() {
            if let Some(second) = step.move_destination() {
                self[second].resolving.incoming_second_moves.push(step);
            }
        }
    }

    /// Removes the order together with its unit.
    pub fn kill_move(&mut self, mv: &Order) {
        self.remove_order(mv);

        if !mv.is_retreat() {
            self[mv.origin].remove_unit();
            self.drop_expected_second_move(mv);
        }
    }

    /// Sends the unit back to its origin, or queues its way back if the
    /// origin is under attack.
    pub fn retreat_move(&mut self, mv: &Order) {
        self.remove_order(mv);

        if mv.is_retreat() {
            return;
        }

        let origin = &mut self[mv.origin];
        if !origin.attacked() {
            if origin.is_empty() {
                origin.unit = Some(mv.unit());
            }
        } else if origin.part_of_cycle() {
            origin.resolving.unresolved_retreat = Some(mv.clone());
        } else if let Some(retreat) = mv.to_retreat() {
            origin.resolving.incoming_moves.push(retreat);
            origin.resolving.order = None;
            origin.remove_unit();
        }

        self.drop_expected_second_move(mv);
    }

    fn drop_expected_second_move(&mut self, mv: &Order) {
        if let Some(second) = mv.second_destination() {
            let expected = &mut self[second].resolving.expected_second_moves;
            *expected = expected.saturating_sub(1);
        }
    }

    /// Returns the region the given region is fighting a border battle with:
    /// both regions move into each other and belong to different factions.
    pub fn find_border_battle(&self, id: RegionId) -> Option<RegionId> {
        let order = self[id].order()?;
        let other = order.move_destination()?;
        let counter = self[other].order()?;
        if counter.move_destination() == Some(id) && counter.faction != order.faction {
            Some(other)
        } else {
            None
        }
    }

    /// Turns the arrived second steps into the region's incoming moves.
    /// A support given from the region is cut by the arriving knights and
    /// returned.
    pub fn place_second_moves(&mut self, id: RegionId) -> Option<Order> {
        let moves = std::mem::take(&mut self[id].resolving.incoming_second_moves);
        for mv in &moves {
            self[mv.origin].resolving.order = Some(mv.clone());
        }

        let resolving = &mut self[id].resolving;
        resolving.incoming_moves = moves;
        resolving.resolving_second_moves = true;
        resolving.expected_second_moves = 0;
        resolving.transports_resolved = false;
        resolving.part_of_cycle = false;

        let support = self[id]
            .order()
            .filter(|o| matches!(o.kind, OrderKind::Support { .. }))
            .cloned()?;
        self.remove_order(&support);
        Some(support)
    }

    /// Counts a faction's units and how many it may keep: one per controlled
    /// home region plus one per foreign nation it controls entirely.
    pub fn unit_counts(&self, faction: &Faction) -> (usize, usize) {
        let mut units = 0;
        let mut homes_controlled = 0;
        let mut nations_controlled = BTreeSet::new();
        let mut nations_not_controlled = BTreeSet::new();

        for region in &self.regions {
            if region.unit.as_ref().is_some_and(|u| &u.faction == faction) {
                units += 1;
            }

            let controls = region.controlling_faction.as_ref() == Some(faction);
            if region.home_faction.as_ref() == Some(faction) {
                if controls {
                    homes_controlled += 1;
                }
                continue;
            }
            let Some(nation) = &region.nation else {
                continue;
            };
            if controls {
                nations_controlled.insert(nation.as_str());
            } else {
                nations_not_controlled.insert(nation.as_str());
            }
        }

        let foreign = nations_controlled
            .difference(&nations_not_controlled)
            .count();
        (units, homes_controlled + foreign)
    }

    /// Whether the board is waiting on the contest this battle reports.
    pub fn expects_battle(&self, battle: &Battle) -> bool {
        if battle.results.is_empty() || battle.results.iter().any(|r| r.faction().is_none()) {
            return false;
        }
        let orders: Vec<&Order> = battle
            .results
            .iter()
            .filter_map(|r| r.order.as_ref())
            .collect();
        if orders.iter().any(|o| self.unknown_region(o).is_some()) {
            return false;
        }

        match battle.kind() {
            BattleKind::DangerZoneCrossing => {
                let [order] = orders.as_slice() else {
                    return false;
                };
                if battle.results.len() != 1 {
                    return false;
                }
                match order.kind {
                    OrderKind::Move { destination, .. } => {
                        self[destination].incoming_moves().contains(*order)
                    }
                    _ => self[order.origin].order() == Some(*order),
                }
            }
            BattleKind::Border => orders
                .iter()
                .all(|o| self[o.origin].order() == Some(*o)),
            BattleKind::NeutralConquest | BattleKind::Multiplayer => {
                if orders.is_empty() || battle.regions().len() != 1 {
                    return false;
                }
                orders.iter().all(|o| {
                    o.move_destination()
                        .is_some_and(|d| self[d].incoming_moves().contains(*o))
                })
            }
        }
    }
}

fn remove_first(orders: &mut Vec<Order>, order: &Order) {
    if let Some(i) = orders.iter().position(|o| o == order) {
        orders.remove(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::map::BoardBuilder;
    use crate::board::unit::Unit;

    fn board() -> Board {
        BoardBuilder::new()
            .land("Leil")
            .land("Limbol")
            .castle("Worp")
            .sea("Mare Elle")
            .connect("Leil", "Limbol")
            .connect("Limbol", "Worp")
            .connect("Leil", "Mare Elle")
            .unit("Leil", UnitType::Footman, "red")
            .unit("Limbol", UnitType::Knight, "blue")
            .control("Leil", "red")
            .control("Limbol", "blue")
            .build()
            .unwrap()
    }

    fn id(board: &Board, name: &str) -> RegionId {
        board.id(name).unwrap()
    }

    #[test]
    fn seasons_cycle() {
        let mut season = Season::Winter;
        let mut seen = vec![];
        for _ in 0..4 {
            seen.push(season);
            season = season.next();
        }
        assert_eq!(
            seen,
            vec![Season::Winter, Season::Spring, Season::Summer, Season::Fall]
        );
        assert_eq!(season, Season::Winter);
        assert_eq!(Season::from_name("summer"), Some(Season::Summer));
    }

    #[test]
    fn place_and_remove_move() {
        let mut b = board();
        let mv = Order::new_move("red", UnitType::Footman, id(&b, "Leil"), id(&b, "Limbol"));
        b.place_order(mv.clone());
        assert!(b[id(&b, "Limbol")].attacked());
        assert_eq!(b[id(&b, "Leil")].order(), Some(&mv));

        b.remove_order(&mv);
        assert!(!b[id(&b, "Limbol")].attacked());
        assert!(b[id(&b, "Leil")].order().is_none());
    }

    #[test]
    fn attacked_support_is_cut() {
        let mut b = board();
        let support = Order {
            faction: Faction::from("red"),
            unit_type: UnitType::Footman,
            origin: id(&b, "Leil"),
            kind: OrderKind::Support {
                destination: id(&b, "Limbol"),
            },
        };
        let attack = Order::new_move("blue", UnitType::Knight, id(&b, "Limbol"), id(&b, "Leil"));
        let cut = b.place_orders(vec![support.clone(), attack]);
        assert_eq!(cut, vec![support]);
        assert!(b[id(&b, "Limbol")].incoming_supports().is_empty());
    }

    #[test]
    fn castle_needs_siege_unless_catapult() {
        let mut b = board();
        let (limbol, worp) = (id(&b, "Limbol"), id(&b, "Worp"));
        let mv = Order::new_move("blue", UnitType::Knight, limbol, worp);
        b.place_order(mv.clone());
        b.succeed_move(&mv);
        assert_eq!(b[worp].unit, Some(Unit::new(UnitType::Knight, "blue")));
        assert!(b[worp].controlling_faction.is_none());
        assert!(b[limbol].is_empty());

        let mut b = board();
        b[limbol].unit = Some(Unit::new(UnitType::Catapult, "blue"));
        let mv = Order::new_move("blue", UnitType::Catapult, limbol, worp);
        b.place_order(mv.clone());
        b.succeed_move(&mv);
        assert_eq!(b[worp].controlling_faction, Some(Faction::from("blue")));
    }

    #[test]
    fn knight_second_step_is_queued() {
        let mut b = board();
        let (leil, limbol, worp) = (id(&b, "Leil"), id(&b, "Limbol"), id(&b, "Worp"));
        b[limbol].unit = None;
        b[leil].unit = Some(Unit::new(UnitType::Knight, "red"));
        let mut mv = Order::new_move("red", UnitType::Knight, leil, limbol);
        if let OrderKind::Move {
            second_destination, ..
        } = &mut mv.kind
        {
            *second_destination = Some(worp);
        }
        b.place_order(mv.clone());
        assert_eq!(b[worp].expected_second_moves(), 1);

        b.succeed_move(&mv);
        assert_eq!(b[worp].incoming_second_moves().len(), 1);
        assert_eq!(b[worp].incoming_second_moves()[0].origin, limbol);

        assert!(b.place_second_moves(worp).is_none());
        assert!(b[worp].attacked());
        assert!(b[worp].resolving_second_moves());
        assert_eq!(b[worp].expected_second_moves(), 0);
        assert!(b[limbol].order().is_some_and(|o| o.move_destination() == Some(worp)));
    }

    #[test]
    fn retreat_into_attacked_origin_is_queued() {
        let mut b = board();
        let (leil, limbol) = (id(&b, "Leil"), id(&b, "Limbol"));
        let out = Order::new_move("red", UnitType::Footman, leil, limbol);
        let attack = Order::new_move("blue", UnitType::Knight, limbol, leil);
        b.place_order(out.clone());
        b.place_order(attack);
        b.remove_order(&out);

        b.retreat_move(&out);
        let queued = &b[leil].incoming_moves()[1];
        assert!(queued.is_retreat());
        assert_eq!(queued.origin, limbol);
        assert!(b[leil].is_empty());
        assert!(b[leil].order().is_none());
    }

    #[test]
    fn kill_and_retreat_of_synthesized_retreat_keep_origin_order() {
        let mut b = board();
        let (leil, limbol) = (id(&b, "Leil"), id(&b, "Limbol"));
        let hold = Order {
            faction: Faction::from("blue"),
            unit_type: UnitType::Knight,
            origin: limbol,
            kind: OrderKind::Besiege,
        };
        b.place_order(hold.clone());
        let retreat = Order::new_move("red", UnitType::Footman, leil, limbol)
            .to_retreat()
            .unwrap();
        b[leil].resolving.incoming_moves.push(retreat.clone());

        b.kill_move(&retreat);
        assert!(!b[leil].attacked());
        assert_eq!(b[limbol].order(), Some(&hold));
        assert!(b[limbol].unit.is_some());
    }

    #[test]
    fn unit_counts_include_whole_foreign_nations() {
        let b = BoardBuilder::new()
            .land("Leil")
            .land("Worp")
            .land("Gron")
            .land("Fond")
            .home("Leil", "Leil", "red")
            .nation("Worp", "Gewel")
            .nation("Gron", "Gewel")
            .nation("Fond", "Ayll")
            .control("Leil", "red")
            .control("Worp", "red")
            .control("Gron", "red")
            .control("Fond", "blue")
            .unit("Leil", UnitType::Footman, "red")
            .build()
            .unwrap();
        assert_eq!(b.unit_counts(&Faction::from("red")), (1, 2));
        assert_eq!(b.unit_counts(&Faction::from("blue")), (0, 1));
    }

    #[test]
    fn definition_round_trips_state() {
        let b = board();
        let again = Board::from_definition(&b.to_definition()).unwrap();
        assert_eq!(b, again);
    }
}
