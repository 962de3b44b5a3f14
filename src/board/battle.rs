//! Battle results supplied by the dice oracle.
//!
//! The engine never rolls dice. A [`Battle`] arrives fully computed and is
//! only classified and applied here.

use serde::{Deserialize, Serialize};

use super::order::Order;
use super::region::{DangerZone, RegionId};
use super::unit::Faction;

/// Minimum total a lone attacker needs to conquer a neutral region.
pub const MIN_RESULT_TO_CONQUER_NEUTRAL: i32 = 4;

/// Minimum total needed to survive a danger-zone crossing.
pub const MIN_RESULT_TO_SURVIVE_DANGER_ZONE: i32 = 3;

/// Source of a battle modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Dice,
    Unit,
    Forest,
    Castle,
    Water,
    Surprise,
    Support,
}

/// One component of a battle total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supporting_faction: Option<Faction>,
}

/// One combatant's result: either a move order or a defending faction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleResult {
    pub total: i32,
    pub parts: Vec<Modifier>,
    pub order: Option<Order>,
    pub defender_faction: Option<Faction>,
}

impl BattleResult {
    /// The faction this result belongs to.
    pub fn faction(&self) -> Option<&Faction> {
        self.order
            .as_ref()
            .map(|o| &o.faction)
            .or(self.defender_faction.as_ref())
    }
}

/// The shape of a battle, which decides how it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleKind {
    DangerZoneCrossing,
    Border,
    NeutralConquest,
    Multiplayer,
}

/// A resolved battle, a neutral-region conquest attempt, or a danger-zone crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    pub results: Vec<BattleResult>,
    pub danger_zone: Option<DangerZone>,
}

impl Battle {
    pub fn kind(&self) -> BattleKind {
        if self.danger_zone.is_some() {
            BattleKind::DangerZoneCrossing
        } else if self.is_border_battle() {
            BattleKind::Border
        } else if self.results.len() == 1 {
            BattleKind::NeutralConquest
        } else {
            BattleKind::Multiplayer
        }
    }

    /// Two moves headed into each other's origin.
    pub fn is_border_battle(&self) -> bool {
        let [a, b] = self.results.as_slice() else {
            return false;
        };
        match (&a.order, &b.order) {
            (Some(a), Some(b)) => {
                a.move_destination() == Some(b.origin) && b.move_destination() == Some(a.origin)
            }
            _ => false,
        }
    }

    /// Destinations of every order taking part, in order of first appearance.
    pub fn regions(&self) -> Vec<RegionId> {
        let mut regions = Vec::new();
        for region in self
            .results
            .iter()
            .filter_map(|r| r.order.as_ref()?.destination())
        {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        regions
    }

    /// Splits the combatants into winners and losers.
    ///
    /// A single result is measured against a fixed threshold (danger zone or
    /// neutral conquest). Otherwise every result at the highest total wins, so
    /// more than one winner means a tie.
    pub fn winners_and_losers(&self) -> (Vec<Faction>, Vec<Faction>) {
        let mut winners = Vec::new();
        let mut losers = Vec::new();

        if let [result] = self.results.as_slice() {
            let threshold = if self.danger_zone.is_some() {
                MIN_RESULT_TO_SURVIVE_DANGER_ZONE
            } else {
                MIN_RESULT_TO_CONQUER_NEUTRAL
            };
            if let Some(faction) = result.faction() {
                if result.total >= threshold {
                    winners.push(faction.clone());
                } else {
                    losers.push(faction.clone());
                }
            }
            return (winners, losers);
        }

        let highest = self.results.iter().map(|r| r.total).max().unwrap_or(0);
        for result in &self.results {
            let Some(faction) = result.faction() else {
                continue;
            };
            if result.total >= highest {
                winners.push(faction.clone());
            } else {
                losers.push(faction.clone());
            }
        }
        (winners, losers)
    }
}
