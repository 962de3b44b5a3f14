//! JSON messages exchanged with the game driver.
//!
//! Orders and battles travel with region names; these types convert them
//! to and from the board's region ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{
    Battle, BattleResult, Board, DangerZone, Faction, MapError, Modifier, Order, OrderKind,
    RegionId, UnitType,
};
use crate::engine::EngineError;
use crate::validate::{OrderError, OrderRejection};

/// Errors surfaced to the driver.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid map: {0}")]
    Map(#[from] MapError),

    #[error("invalid order: {0}")]
    Order(#[from] OrderError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An order as submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMessage {
    #[serde(rename = "type")]
    pub order_type: String,
    pub faction: Faction,
    pub unit_type: UnitType,
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_danger_zone: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retreat: bool,
}

impl OrderMessage {
    pub fn from_order(order: &Order, board: &Board) -> Self {
        let name = |id: RegionId| board.name(id).to_string();
        OrderMessage {
            order_type: order.kind.name().to_string(),
            faction: order.faction.clone(),
            unit_type: order.unit_type,
            origin: name(order.origin),
            destination: order.destination().map(name),
            second_destination: order.second_destination().map(name),
            via_danger_zone: order.via_danger_zone().map(|dz| dz.0.clone()),
            retreat: order.is_retreat(),
        }
    }

    /// Resolves region names against the board.
    pub fn to_order(&self, board: &Board) -> Result<Order, OrderError> {
        let region = |name: &str| {
            board
                .id(name)
                .ok_or_else(|| OrderError::UnknownRegion(name.to_string()))
        };
        let origin = region(self.origin.as_str())?;
        let destination = self.destination.as_deref().map(region).transpose()?;
        let second_destination = self
            .second_destination
            .as_deref()
            .map(region)
            .transpose()?;

        let kind = match self.order_type.as_str() {
            "move" => OrderKind::Move {
                destination: destination.ok_or(OrderError::MissingDestination("move"))?,
                second_destination,
                via_danger_zone: self.via_danger_zone.clone().map(DangerZone),
                retreat: self.retreat,
            },
            "support" => OrderKind::Support {
                destination: destination.ok_or(OrderError::MissingDestination("support"))?,
            },
            "transport" => OrderKind::Transport,
            "besiege" => OrderKind::Besiege,
            "build" => OrderKind::Build,
            "disband" => OrderKind::Disband,
            other => return Err(OrderError::UnknownOrderType(other.to_string())),
        };

        match kind {
            OrderKind::Move { .. } => {}
            OrderKind::Support { .. } if second_destination.is_none() => {}
            _ if destination.is_none() && second_destination.is_none() => {}
            _ => return Err(OrderError::UnexpectedDestination(kind.name())),
        }

        Ok(Order {
            faction: self.faction.clone(),
            unit_type: self.unit_type,
            origin,
            kind,
        })
    }
}

/// Converts every faction's submitted orders. Orders naming unknown regions
/// or types are rejected here instead of by validation.
pub fn orders_from_messages(
    board: &Board,
    messages: BTreeMap<Faction, Vec<OrderMessage>>,
) -> (BTreeMap<Faction, Vec<Order>>, Vec<OrderRejection>) {
    let mut orders = BTreeMap::new();
    let mut rejected = Vec::new();

    for (faction, submitted) in messages {
        let mut converted = Vec::with_capacity(submitted.len());
        for message in submitted {
            match message.to_order(board) {
                Ok(order) => converted.push(order),
                Err(reason) => {
                    tracing::warn!(
                        "rejected order from {} in {}: {}",
                        faction,
                        message.origin,
                        reason
                    );
                    rejected.push(OrderRejection {
                        faction: faction.clone(),
                        origin: message.origin,
                        reason,
                    });
                }
            }
        }
        orders.insert(faction, converted);
    }

    (orders, rejected)
}

/// One combatant's result as reported by the battle oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMessage {
    pub total: i32,
    #[serde(default)]
    pub parts: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defender_faction: Option<Faction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleMessage {
    pub results: Vec<ResultMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger_zone: Option<String>,
}

impl BattleMessage {
    pub fn from_battle(battle: &Battle, board: &Board) -> Self {
        BattleMessage {
            results: battle
                .results
                .iter()
                .map(|r| ResultMessage {
                    total: r.total,
                    parts: r.parts.clone(),
                    order: r.order.as_ref().map(|o| OrderMessage::from_order(o, board)),
                    defender_faction: r.defender_faction.clone(),
                })
                .collect(),
            danger_zone: battle.danger_zone.as_ref().map(|dz| dz.0.clone()),
        }
    }

    pub fn to_battle(&self, board: &Board) -> Result<Battle, ProtocolError> {
        let results = self
            .results
            .iter()
            .map(|r| {
                Ok(BattleResult {
                    total: r.total,
                    parts: r.parts.clone(),
                    order: r.order.as_ref().map(|o| o.to_order(board)).transpose()?,
                    defender_faction: r.defender_faction.clone(),
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(Battle {
            results,
            danger_zone: self.danger_zone.clone().map(DangerZone),
        })
    }
}

/// A rejected order reported back to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionMessage {
    pub faction: Faction,
    pub origin: String,
    pub reason: String,
}

impl From<&OrderRejection> for RejectionMessage {
    fn from(rejection: &OrderRejection) -> Self {
        RejectionMessage {
            faction: rejection.faction.clone(),
            origin: rejection.origin.clone(),
            reason: rejection.reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardBuilder, ModifierKind};

    fn board() -> Board {
        BoardBuilder::new()
            .land("Leil")
            .land("Worp")
            .land("Lomone")
            .connect("Leil", "Worp")
            .connect_via("Worp", "Lomone", "Gapet")
            .build()
            .unwrap()
    }

    #[test]
    fn parse_knight_move() {
        let b = board();
        let json = r#"{"type":"move","faction":"red","unitType":"knight","origin":"Leil",
                       "destination":"Worp","secondDestination":"Lomone","viaDangerZone":"Gapet"}"#;
        let message: OrderMessage = serde_json::from_str(json).unwrap();
        let order = message.to_order(&b).unwrap();

        assert_eq!(order.faction, Faction::from("red"));
        assert_eq!(order.unit_type, UnitType::Knight);
        assert_eq!(order.origin, b.id("Leil").unwrap());
        assert_eq!(order.move_destination(), b.id("Worp"));
        assert_eq!(order.second_destination(), b.id("Lomone"));
        assert_eq!(order.via_danger_zone(), Some(&DangerZone::new("Gapet")));
        assert!(!order.is_retreat());

        assert_eq!(OrderMessage::from_order(&order, &b), message);
    }

    #[test]
    fn format_besiege_omits_empty_fields() {
        let b = board();
        let order = Order {
            faction: "red".into(),
            unit_type: UnitType::Footman,
            origin: b.id("Worp").unwrap(),
            kind: OrderKind::Besiege,
        };
        let json = serde_json::to_string(&OrderMessage::from_order(&order, &b)).unwrap();
        assert_eq!(
            json,
            r#"{"type":"besiege","faction":"red","unitType":"footman","origin":"Worp"}"#
        );
    }

    #[test]
    fn conversion_errors() {
        let b = board();
        let message = |order_type: &str, origin: &str, destination: Option<&str>| OrderMessage {
            order_type: order_type.to_string(),
            faction: "red".into(),
            unit_type: UnitType::Footman,
            origin: origin.to_string(),
            destination: destination.map(str::to_string),
            second_destination: None,
            via_danger_zone: None,
            retreat: false,
        };

        assert_eq!(
            message("move", "Gron", Some("Worp")).to_order(&b),
            Err(OrderError::UnknownRegion("Gron".to_string()))
        );
        assert_eq!(
            message("hold", "Leil", None).to_order(&b),
            Err(OrderError::UnknownOrderType("hold".to_string()))
        );
        assert_eq!(
            message("support", "Leil", None).to_order(&b),
            Err(OrderError::MissingDestination("support"))
        );
        assert_eq!(
            message("besiege", "Leil", Some("Worp")).to_order(&b),
            Err(OrderError::UnexpectedDestination("besiege"))
        );
    }

    #[test]
    fn unknown_regions_become_rejections() {
        let b = board();
        let json = r#"{"red":[
            {"type":"move","faction":"red","unitType":"footman","origin":"Leil","destination":"Worp"},
            {"type":"move","faction":"red","unitType":"footman","origin":"Atlantis","destination":"Worp"}
        ]}"#;
        let messages: BTreeMap<Faction, Vec<OrderMessage>> = serde_json::from_str(json).unwrap();
        let (orders, rejected) = orders_from_messages(&b, messages);

        assert_eq!(orders[&Faction::from("red")].len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].origin, "Atlantis");

        let reported = RejectionMessage::from(&rejected[0]);
        assert_eq!(reported.reason, "unknown region 'Atlantis'");
    }

    #[test]
    fn parse_battle() {
        let b = board();
        let json = r#"{"results":[
            {"total":5,"parts":[{"type":"dice","value":4},{"type":"unit","value":1}],
             "order":{"type":"move","faction":"red","unitType":"footman","origin":"Leil","destination":"Worp"}},
            {"total":3,"parts":[{"type":"support","value":1,"supportingFaction":"green"}],
             "defenderFaction":"blue"}
        ]}"#;
        let message: BattleMessage = serde_json::from_str(json).unwrap();
        let battle = message.to_battle(&b).unwrap();

        assert_eq!(battle.results.len(), 2);
        assert_eq!(battle.results[0].parts[0].kind, ModifierKind::Dice);
        assert_eq!(
            battle.results[1].parts[0].supporting_faction,
            Some(Faction::from("green"))
        );
        assert_eq!(battle.regions(), vec![b.id("Worp").unwrap()]);
        assert_eq!(BattleMessage::from_battle(&battle, &b), message);
    }
}
