//! Order validation.
//!
//! Every submitted order is checked on its own. An invalid order is rejected
//! with the reason and the rest of the faction's orders still go through.

use std::collections::HashSet;

use crate::board::{Board, Faction, Order, OrderKind, Region, RegionId, Season, UnitType};

/// Why an order was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("unknown order type '{0}'")]
    UnknownOrderType(String),

    #[error("order submitted for faction {submitted} by {submitter}")]
    FactionMismatch {
        submitted: Faction,
        submitter: Faction,
    },

    #[error("retreat orders can only be created by the engine")]
    RetreatSubmitted,

    #[error("{kind} orders are invalid in {season}")]
    WrongSeason { kind: &'static str, season: Season },

    #[error("ordered region has no unit")]
    NoUnit,

    #[error("ordered unit belongs to {0}")]
    NotOwnUnit(Faction),

    #[error("order is for a {ordered}, but the region holds a {actual}")]
    UnitTypeMismatch { ordered: UnitType, actual: UnitType },

    #[error("{0} orders must have a destination")]
    MissingDestination(&'static str),

    #[error("{0} orders cannot have a destination")]
    UnexpectedDestination(&'static str),

    #[error("ship order destination must be sea or coast")]
    ShipDestinationInland,

    #[error("only ships can be ordered to sea")]
    LandUnitToSea,

    #[error("only knights can have a second destination")]
    SecondDestinationNotKnight,

    #[error("second destination must border the first")]
    SecondDestinationNotAdjacent,

    #[error("support order must be adjacent to its destination")]
    SupportNotAdjacent,

    #[error("besieged region must have a castle")]
    BesiegeWithoutCastle,

    #[error("besieged region is already controlled")]
    BesiegeControlled,

    #[error("ships cannot besiege")]
    ShipBesiege,

    #[error("only ships can transport")]
    TransportNotShip,

    #[error("transport orders can only be placed at sea")]
    TransportOnLand,

    #[error("winter moves must go to a region you control")]
    WinterMoveUncontrolled,

    #[error("winter move destination already has a unit")]
    WinterMoveOccupied,

    #[error("ships can only move to the coast in winter")]
    WinterShipInland,

    #[error("cannot build in an occupied region")]
    BuildOccupied,

    #[error("can only build in regions you control")]
    BuildUncontrolled,

    #[error("ships can only be built on the coast")]
    ShipBuildInland,

    #[error("no units left to build")]
    TooManyBuilds,

    #[error("region is ordered twice")]
    DuplicateOrder,

    #[error("another move already goes to '{0}'")]
    DuplicateDestination(String),
}

/// An order that did not make it onto the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRejection {
    pub faction: Faction,
    /// Name of the ordered region, as submitted.
    pub origin: String,
    pub reason: OrderError,
}

/// Validates one faction's orders for the season, returning the accepted
/// orders and a rejection for each invalid one.
pub fn validate_orders(
    board: &Board,
    season: Season,
    faction: &Faction,
    orders: Vec<Order>,
) -> (Vec<Order>, Vec<OrderRejection>) {
    let mut accepted = Vec::with_capacity(orders.len());
    let mut rejected = Vec::new();

    let disbands: HashSet<RegionId> = orders
        .iter()
        .filter(|o| matches!(o.kind, OrderKind::Disband))
        .map(|o| o.origin)
        .collect();
    let leaving: HashSet<RegionId> = orders
        .iter()
        .filter(|o| o.is_move())
        .map(|o| o.origin)
        .collect();

    let (units, max_units) = board.unit_counts(faction);
    let mut builds_left = max_units.saturating_sub(units);
    if season == Season::Winter && units > max_units && disbands.len() != units - max_units {
        tracing::warn!(
            "{} must disband {} units, but ordered {} disbands",
            faction,
            units - max_units,
            disbands.len()
        );
    }

    let mut ordered = HashSet::new();
    let mut destinations = HashSet::new();

    for order in orders {
        let checked = if let Some(unknown) = board.unknown_region(&order) {
            Err(OrderError::UnknownRegion(region_label(board, unknown)))
        } else if &order.faction != faction {
            Err(OrderError::FactionMismatch {
                submitted: order.faction.clone(),
                submitter: faction.clone(),
            })
        } else if season == Season::Winter {
            validate_winter_order(board, &order, &disbands, &leaving)
        } else {
            validate_order(board, season, &order)
        };

        let checked = checked
            .and_then(|()| check_unique(board, &order, &ordered, &destinations))
            .and_then(|()| {
                if matches!(order.kind, OrderKind::Build) {
                    if builds_left == 0 {
                        return Err(OrderError::TooManyBuilds);
                    }
                    builds_left -= 1;
                }
                Ok(())
            });

        match checked {
            Ok(()) => {
                ordered.insert(order.origin);
                if let OrderKind::Move {
                    destination,
                    second_destination,
                    ..
                } = order.kind
                {
                    destinations.insert(destination);
                    destinations.extend(second_destination);
                }
                accepted.push(order);
            }
            Err(reason) => {
                let origin = region_label(board, order.origin);
                tracing::warn!(
                    "rejected {} order from {} in {}: {}",
                    order.kind.name(),
                    faction,
                    origin,
                    reason
                );
                rejected.push(OrderRejection {
                    faction: faction.clone(),
                    origin,
                    reason,
                });
            }
        }
    }

    (accepted, rejected)
}

/// Region name, or its index if the board has no such region.
fn region_label(board: &Board, id: RegionId) -> String {
    if board.contains(id) {
        board.name(id).to_string()
    } else {
        format!("#{}", id.0)
    }
}

fn check_unique(
    board: &Board,
    order: &Order,
    ordered: &HashSet<RegionId>,
    destinations: &HashSet<RegionId>,
) -> Result<(), OrderError> {
    if ordered.contains(&order.origin) {
        return Err(OrderError::DuplicateOrder);
    }
    if let OrderKind::Move {
        destination,
        second_destination,
        ..
    } = order.kind
    {
        for target in std::iter::once(destination).chain(second_destination) {
            if destinations.contains(&target) {
                return Err(OrderError::DuplicateDestination(board.name(target).to_string()));
            }
        }
    }
    Ok(())
}

/// The ordered unit must exist, be the submitter's, and be of the given type.
fn check_ordered_unit(order: &Order, origin: &Region) -> Result<(), OrderError> {
    if matches!(order.kind, OrderKind::Build) {
        return Ok(());
    }
    let unit = origin.unit.as_ref().ok_or(OrderError::NoUnit)?;
    if unit.faction != order.faction {
        return Err(OrderError::NotOwnUnit(unit.faction.clone()));
    }
    if unit.unit_type != order.unit_type {
        return Err(OrderError::UnitTypeMismatch {
            ordered: order.unit_type,
            actual: unit.unit_type,
        });
    }
    Ok(())
}

fn validate_order(board: &Board, season: Season, order: &Order) -> Result<(), OrderError> {
    let origin = &board[order.origin];
    check_ordered_unit(order, origin)?;
    if order.is_retreat() {
        return Err(OrderError::RetreatSubmitted);
    }

    match order.kind {
        OrderKind::Move {
            destination,
            second_destination,
            ..
        } => {
            check_target(board, order, destination)?;
            if let Some(second) = second_destination {
                if order.unit_type != UnitType::Knight {
                    return Err(OrderError::SecondDestinationNotKnight);
                }
                check_target(board, order, second)?;
                if !board[destination].adjacent_to(second) {
                    return Err(OrderError::SecondDestinationNotAdjacent);
                }
            }
            Ok(())
        }
        OrderKind::Support { destination } => {
            check_target(board, order, destination)?;
            if !origin.adjacent_to(destination) {
                return Err(OrderError::SupportNotAdjacent);
            }
            Ok(())
        }
        OrderKind::Besiege => {
            if !origin.castle {
                Err(OrderError::BesiegeWithoutCastle)
            } else if origin.controlled() {
                Err(OrderError::BesiegeControlled)
            } else if order.unit_type == UnitType::Ship {
                Err(OrderError::ShipBesiege)
            } else {
                Ok(())
            }
        }
        OrderKind::Transport => {
            if order.unit_type != UnitType::Ship {
                Err(OrderError::TransportNotShip)
            } else if !origin.sea {
                Err(OrderError::TransportOnLand)
            } else {
                Ok(())
            }
        }
        OrderKind::Build | OrderKind::Disband => Err(OrderError::WrongSeason {
            kind: order.kind.name(),
            season,
        }),
    }
}

/// Ships stay on sea and coast; everything else stays on land.
fn check_target(board: &Board, order: &Order, target: RegionId) -> Result<(), OrderError> {
    let destination = &board[target];
    if order.unit_type == UnitType::Ship {
        if !(destination.sea || destination.is_coast(board)) {
            return Err(OrderError::ShipDestinationInland);
        }
    } else if destination.sea {
        return Err(OrderError::LandUnitToSea);
    }
    Ok(())
}

fn validate_winter_order(
    board: &Board,
    order: &Order,
    disbands: &HashSet<RegionId>,
    leaving: &HashSet<RegionId>,
) -> Result<(), OrderError> {
    let origin = &board[order.origin];
    check_ordered_unit(order, origin)?;
    if order.is_retreat() {
        return Err(OrderError::RetreatSubmitted);
    }

    match order.kind {
        OrderKind::Move {
            destination,
            second_destination,
            ..
        } => {
            if second_destination.is_some() {
                return Err(OrderError::WrongSeason {
                    kind: "knight move",
                    season: Season::Winter,
                });
            }
            let target = &board[destination];
            if target.controlling_faction.as_ref() != Some(&order.faction) {
                return Err(OrderError::WinterMoveUncontrolled);
            }
            if !target.is_empty()
                && !disbands.contains(&destination)
                && !leaving.contains(&destination)
            {
                return Err(OrderError::WinterMoveOccupied);
            }
            if order.unit_type == UnitType::Ship && !target.is_coast(board) {
                return Err(OrderError::WinterShipInland);
            }
            Ok(())
        }
        OrderKind::Build => {
            if !origin.is_empty() {
                Err(OrderError::BuildOccupied)
            } else if origin.controlling_faction.as_ref() != Some(&order.faction) {
                Err(OrderError::BuildUncontrolled)
            } else if order.unit_type == UnitType::Ship && !origin.is_coast(board) {
                Err(OrderError::ShipBuildInland)
            } else {
                Ok(())
            }
        }
        OrderKind::Disband => Ok(()),
        OrderKind::Support { .. } | OrderKind::Transport | OrderKind::Besiege => {
            Err(OrderError::WrongSeason {
                kind: order.kind.name(),
                season: Season::Winter,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardBuilder;

    fn board() -> Board {
        BoardBuilder::new()
            .land("Leil")
            .castle("Worp")
            .land("Lomone")
            .sea("Mare Elle")
            .connect("Leil", "Worp")
            .connect("Worp", "Lomone")
            .connect("Leil", "Mare Elle")
            .unit("Leil", UnitType::Footman, "red")
            .unit("Worp", UnitType::Knight, "red")
            .unit("Mare Elle", UnitType::Ship, "red")
            .unit("Lomone", UnitType::Footman, "blue")
            .control("Leil", "red")
            .control("Lomone", "blue")
            .home("Leil", "Leil", "red")
            .build()
            .unwrap()
    }

    fn id(board: &Board, name: &str) -> RegionId {
        board.id(name).unwrap()
    }

    fn order(board: &Board, unit_type: UnitType, origin: &str, kind: OrderKind) -> Order {
        Order {
            faction: "red".into(),
            unit_type,
            origin: id(board, origin),
            kind,
        }
    }

    fn reasons(rejected: &[OrderRejection]) -> Vec<OrderError> {
        rejected.iter().map(|r| r.reason.clone()).collect()
    }

    #[test]
    fn valid_orders_pass() {
        let b = board();
        let orders = vec![
            Order::new_move("red", UnitType::Footman, id(&b, "Leil"), id(&b, "Worp")),
            order(&b, UnitType::Knight, "Worp", OrderKind::Besiege),
            order(&b, UnitType::Ship, "Mare Elle", OrderKind::Transport),
        ];
        let (accepted, rejected) = validate_orders(&b, Season::Spring, &"red".into(), orders);
        assert_eq!(accepted.len(), 3);
        assert!(rejected.is_empty());
    }

    #[test]
    fn each_invalid_order_rejected_alone() {
        let b = board();
        let mut retreat = Order::new_move("red", UnitType::Footman, id(&b, "Leil"), id(&b, "Worp"));
        if let OrderKind::Move { retreat: flag, .. } = &mut retreat.kind {
            *flag = true;
        }
        let orders = vec![
            retreat,
            order(&b, UnitType::Footman, "Lomone", OrderKind::Besiege),
            order(&b, UnitType::Ship, "Mare Elle", OrderKind::Build),
            Order::new_move("red", UnitType::Knight, id(&b, "Worp"), id(&b, "Lomone")),
        ];
        let (accepted, rejected) = validate_orders(&b, Season::Summer, &"red".into(), orders);
        assert_eq!(accepted.len(), 1);
        assert_eq!(
            reasons(&rejected),
            vec![
                OrderError::RetreatSubmitted,
                OrderError::NotOwnUnit("blue".into()),
                OrderError::WrongSeason {
                    kind: "build",
                    season: Season::Summer
                },
            ]
        );
        assert_eq!(rejected[1].origin, "Lomone");
    }

    #[test]
    fn unit_and_terrain_rules() {
        let b = board();
        let orders = vec![
            Order::new_move("red", UnitType::Footman, id(&b, "Leil"), id(&b, "Mare Elle")),
            order(&b, UnitType::Knight, "Worp", OrderKind::Transport),
            Order::new_move("red", UnitType::Ship, id(&b, "Mare Elle"), id(&b, "Lomone")),
        ];
        let (_, rejected) = validate_orders(&b, Season::Fall, &"red".into(), orders);
        assert_eq!(
            reasons(&rejected),
            vec![
                OrderError::LandUnitToSea,
                OrderError::TransportNotShip,
                OrderError::ShipDestinationInland,
            ]
        );
    }

    #[test]
    fn later_duplicates_rejected() {
        let b = board();
        let orders = vec![
            Order::new_move("red", UnitType::Footman, id(&b, "Leil"), id(&b, "Worp")),
            order(
                &b,
                UnitType::Footman,
                "Leil",
                OrderKind::Support {
                    destination: id(&b, "Worp"),
                },
            ),
            Order::new_move("red", UnitType::Knight, id(&b, "Worp"), id(&b, "Lomone")),
        ];
        let (accepted, rejected) = validate_orders(&b, Season::Spring, &"red".into(), orders);
        assert_eq!(accepted.len(), 2);
        assert_eq!(reasons(&rejected), vec![OrderError::DuplicateOrder]);
    }

    #[test]
    fn winter_rules() {
        let b = board();
        let orders = vec![
            order(&b, UnitType::Footman, "Leil", OrderKind::Disband),
            order(&b, UnitType::Knight, "Worp", OrderKind::Besiege),
            Order::new_move("red", UnitType::Knight, id(&b, "Worp"), id(&b, "Lomone")),
        ];
        let (accepted, rejected) = validate_orders(&b, Season::Winter, &"red".into(), orders);
        assert_eq!(accepted.len(), 1);
        assert_eq!(
            reasons(&rejected),
            vec![
                OrderError::WrongSeason {
                    kind: "besiege",
                    season: Season::Winter
                },
                OrderError::WinterMoveUncontrolled,
            ]
        );
    }

    #[test]
    fn builds_limited_by_quota() {
        let b = BoardBuilder::new()
            .land("Leil")
            .land("Worp")
            .home("Leil", "Leil", "red")
            .home("Worp", "Leil", "red")
            .control("Leil", "red")
            .control("Worp", "red")
            .build()
            .unwrap();
        let build = |name| Order {
            faction: "red".into(),
            unit_type: UnitType::Footman,
            origin: b.id(name).unwrap(),
            kind: OrderKind::Build,
        };
        let orders = vec![build("Leil"), build("Worp")];
        let (accepted, _) = validate_orders(&b, Season::Winter, &"red".into(), orders);
        assert_eq!(accepted.len(), 2);

        let b = BoardBuilder::new()
            .land("Leil")
            .land("Worp")
            .home("Leil", "Leil", "red")
            .control("Leil", "red")
            .control("Worp", "red")
            .build()
            .unwrap();
        let build = |name| Order {
            faction: "red".into(),
            unit_type: UnitType::Footman,
            origin: b.id(name).unwrap(),
            kind: OrderKind::Build,
        };
        let orders = vec![build("Leil"), build("Worp")];
        let (accepted, rejected) = validate_orders(&b, Season::Winter, &"red".into(), orders);
        assert_eq!(accepted.len(), 1);
        assert_eq!(reasons(&rejected), vec![OrderError::TooManyBuilds]);
    }

    #[test]
    fn orders_naming_missing_regions_rejected() {
        let b = board();
        let orders = vec![
            Order::new_move("red", UnitType::Knight, id(&b, "Worp"), RegionId(99)),
            Order::new_move("red", UnitType::Footman, RegionId(42), id(&b, "Worp")),
            order(
                &b,
                UnitType::Footman,
                "Leil",
                OrderKind::Support {
                    destination: RegionId(7),
                },
            ),
        ];
        let (accepted, rejected) = validate_orders(&b, Season::Spring, &"red".into(), orders);
        assert!(accepted.is_empty());
        assert_eq!(
            reasons(&rejected),
            vec![
                OrderError::UnknownRegion("#99".to_string()),
                OrderError::UnknownRegion("#42".to_string()),
                OrderError::UnknownRegion("#7".to_string()),
            ]
        );
        assert_eq!(rejected[1].origin, "#42");
    }

    #[test]
    fn knight_second_step_checked() {
        let b = board();
        let knight_move = |second: RegionId| {
            let mut mv = Order::new_move("red", UnitType::Knight, id(&b, "Worp"), id(&b, "Leil"));
            if let OrderKind::Move {
                second_destination, ..
            } = &mut mv.kind
            {
                *second_destination = Some(second);
            }
            mv
        };

        let (_, rejected) = validate_orders(
            &b,
            Season::Spring,
            &"red".into(),
            vec![knight_move(id(&b, "Mare Elle"))],
        );
        assert_eq!(reasons(&rejected), vec![OrderError::LandUnitToSea]);

        let (_, rejected) = validate_orders(
            &b,
            Season::Spring,
            &"red".into(),
            vec![knight_move(id(&b, "Lomone"))],
        );
        assert_eq!(reasons(&rejected), vec![OrderError::SecondDestinationNotAdjacent]);

        let (accepted, rejected) = validate_orders(
            &b,
            Season::Spring,
            &"red".into(),
            vec![knight_move(id(&b, "Worp"))],
        );
        assert!(rejected.is_empty());
        assert_eq!(accepted.len(), 1);
    }
}
