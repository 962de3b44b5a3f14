//! Winter resolution.
//!
//! Winter has no battles: units are built and disbanded, and moves go only
//! between a faction's own regions. A move lands once its destination is
//! free, so chains and cycles of moves settle over a few passes.

use crate::board::{Board, OrderKind, RegionId};
use crate::events::{Event, Observer};

/// Resolves placed winter orders and marks the whole board resolved.
pub fn resolve_winter<O: Observer>(board: &mut Board, observer: &mut O) {
    let ids: Vec<RegionId> = board.region_ids().collect();

    loop {
        let mut progressed = false;
        let mut pending = false;

        for &id in &ids {
            match board[id].order().map(|o| (o.kind.clone(), o.unit())) {
                Some((OrderKind::Build, unit)) => {
                    board[id].replace_unit(unit);
                    board[id].resolving.order = None;
                    progressed = true;
                }
                Some((OrderKind::Disband, ..)) => {
                    board[id].remove_unit();
                    board[id].resolving.order = None;
                    progressed = true;
                }
                _ => {}
            }

            if !board[id].part_of_cycle() {
                if let Some(cycle) = board.find_cycle(id) {
                    board.prepare_cycle(&cycle);
                    progressed = true;
                }
            }

            // A region still holding an outgoing move keeps its unit for now.
            if board[id].order().is_some() {
                pending = true;
                continue;
            }

            let Some(mv) = board[id].incoming_moves().first().cloned() else {
                continue;
            };
            if board[id].is_empty() {
                board.succeed_move(&mv);
                observer.notify(Event::UncontestedMove {
                    from: board.name(mv.origin).to_string(),
                    to: board.name(id).to_string(),
                });
            } else {
                tracing::warn!(
                    "winter move from {} blocked by unit in {}",
                    board.name(mv.origin),
                    board.name(id)
                );
                board.remove_order(&mv);
            }
            progressed = true;
        }

        if !pending {
            break;
        }
        if !progressed {
            tracing::warn!("winter resolution stalled with orders left on the board");
            break;
        }
    }

    board.mark_all_resolved();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardBuilder, Order, Unit, UnitType};

    fn board() -> Board {
        BoardBuilder::new()
            .land("Worp")
            .land("Lomone")
            .land("Winde")
            .connect("Worp", "Lomone")
            .connect("Worp", "Winde")
            .connect("Lomone", "Winde")
            .control("Worp", "red")
            .control("Lomone", "red")
            .control("Winde", "red")
            .build()
            .unwrap()
    }

    #[test]
    fn build_and_disband() {
        let mut b = board();
        let (worp, lomone) = (b.id("Worp").unwrap(), b.id("Lomone").unwrap());
        b[lomone].unit = Some(Unit::new(UnitType::Footman, "red"));
        b.place_order(Order {
            faction: "red".into(),
            unit_type: UnitType::Catapult,
            origin: worp,
            kind: OrderKind::Build,
        });
        b.place_order(Order {
            faction: "red".into(),
            unit_type: UnitType::Footman,
            origin: lomone,
            kind: OrderKind::Disband,
        });

        let mut events: Vec<Event> = Vec::new();
        resolve_winter(&mut b, &mut events);
        assert_eq!(b[worp].unit, Some(Unit::new(UnitType::Catapult, "red")));
        assert!(b[lomone].is_empty());
        assert!(b.resolved());
        assert!(events.is_empty());
    }

    #[test]
    fn chain_of_moves() {
        let mut b = board();
        let (worp, lomone, winde) = (
            b.id("Worp").unwrap(),
            b.id("Lomone").unwrap(),
            b.id("Winde").unwrap(),
        );
        b[worp].unit = Some(Unit::new(UnitType::Footman, "red"));
        b[winde].unit = Some(Unit::new(UnitType::Knight, "red"));
        b.place_order(Order::new_move("red", UnitType::Footman, worp, lomone));
        b.place_order(Order::new_move("red", UnitType::Knight, winde, worp));

        let mut events: Vec<Event> = Vec::new();
        resolve_winter(&mut b, &mut events);
        assert_eq!(b[lomone].unit, Some(Unit::new(UnitType::Footman, "red")));
        assert_eq!(b[worp].unit, Some(Unit::new(UnitType::Knight, "red")));
        assert!(b[winde].is_empty());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn cycle_of_moves() {
        let mut b = board();
        let ids: Vec<_> = ["Worp", "Lomone", "Winde"]
            .iter()
            .map(|n| b.id(n).unwrap())
            .collect();
        let types = [UnitType::Footman, UnitType::Knight, UnitType::Catapult];
        for (i, &id) in ids.iter().enumerate() {
            b[id].unit = Some(Unit::new(types[i], "red"));
        }
        for i in 0..3 {
            b.place_order(Order::new_move("red", types[i], ids[i], ids[(i + 1) % 3]));
        }

        resolve_winter(&mut b, &mut Vec::<Event>::new());
        for i in 0..3 {
            assert_eq!(b[ids[(i + 1) % 3]].unit, Some(Unit::new(types[i], "red")));
        }
    }
}
