//! Randomized move rings and chains.
//!
//! Boards are built with their regions in a shuffled order, so the passes
//! meet the moves in a different order every time. The outcome must not
//! depend on it.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use casus_belli::board::{Board, BoardBuilder, Faction, Order, Season, Unit, UnitType};
use casus_belli::engine::Engine;
use casus_belli::events::Event;

const UNIT_TYPES: [UnitType; 3] = [UnitType::Footman, UnitType::Knight, UnitType::Catapult];

struct Layout {
    /// Regions along the ring or chain, in marching order.
    path: Vec<String>,
    units: Vec<UnitType>,
    board: Board,
}

/// Builds `len` controlled regions linked in marching order, with a unit in
/// each of the first `occupied` of them.
fn layout(rng: &mut SmallRng, len: usize, occupied: usize, closed: bool) -> Layout {
    let path: Vec<String> = (0..len).map(|i| format!("Region {}", i)).collect();
    let units: Vec<UnitType> = (0..occupied)
        .map(|_| UNIT_TYPES[rng.gen_range(0..UNIT_TYPES.len())])
        .collect();

    let mut shuffled = path.clone();
    shuffled.shuffle(rng);
    let mut builder = BoardBuilder::new();
    for name in &shuffled {
        builder = builder.land(name);
    }

    let links = if closed { len } else { len - 1 };
    for i in 0..links {
        builder = builder.connect(&path[i], &path[(i + 1) % len]);
    }
    for (i, name) in path.iter().enumerate() {
        builder = builder.control(name, "red");
        if let Some(&unit_type) = units.get(i) {
            builder = builder.unit(name, unit_type, "red");
        }
    }

    Layout {
        path,
        units,
        board: builder.build().unwrap(),
    }
}

/// Orders every unit one step forward and resolves the round.
fn march(layout: Layout) -> (Engine<Vec<Event>>, Vec<String>, Vec<UnitType>) {
    let Layout { path, units, board } = layout;
    let len = path.len();
    let orders: Vec<Order> = units
        .iter()
        .enumerate()
        .map(|(i, &unit_type)| {
            let from = board.id(&path[i]).unwrap();
            let to = board.id(&path[(i + 1) % len]).unwrap();
            Order::new_move("red", unit_type, from, to)
        })
        .collect();

    let mut engine = Engine::new(Vec::new());
    engine.start_game(board);
    engine.request_orders(Season::Fall).unwrap();
    let rejected = engine
        .place_orders(BTreeMap::from([(Faction::from("red"), orders)]))
        .unwrap();
    assert!(rejected.is_empty(), "{:?}", rejected);
    (engine, path, units)
}

fn assert_advanced(engine: &Engine<Vec<Event>>, path: &[String], units: &[UnitType]) {
    let board = engine.board().unwrap();
    assert!(engine.round_resolved());
    assert!(engine.battles().is_empty());
    for (i, &unit_type) in units.iter().enumerate() {
        let next = &path[(i + 1) % path.len()];
        assert_eq!(
            board.get(next).unwrap().unit,
            Some(Unit::new(unit_type, "red")),
            "unit from {} did not reach {}",
            path[i],
            next
        );
    }

    let moves = engine
        .observer()
        .iter()
        .filter(|e| matches!(e, Event::UncontestedMove { .. }))
        .count();
    assert_eq!(moves, units.len());
}

#[test]
fn random_rings_rotate_without_losses() {
    let mut rng = SmallRng::seed_from_u64(0x00ca_5b31);
    for _ in 0..50 {
        let len = rng.gen_range(2..12);
        let (engine, path, units) = march(layout(&mut rng, len, len, true));
        assert_advanced(&engine, &path, &units);

        let board = engine.board().unwrap();
        assert_eq!(board.regions().filter(|r| r.unit.is_some()).count(), len);
    }
}

#[test]
fn random_chains_fill_the_empty_end() {
    let mut rng = SmallRng::seed_from_u64(0x00c4_a125);
    for _ in 0..50 {
        let len = rng.gen_range(2..12);
        let (engine, path, units) = march(layout(&mut rng, len, len - 1, false));
        assert_advanced(&engine, &path, &units);

        let board = engine.board().unwrap();
        assert!(board.get(&path[0]).unwrap().unit.is_none());
    }
}
