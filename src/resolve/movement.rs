//! Uncontested move resolution.
//!
//! Passes run over every region until one makes no progress. Each region
//! resolves what it can without dice; everything else waits for a battle
//! result from the oracle.

use crate::board::{Battle, Board, OrderKind, RegionId};
use crate::events::{Event, Observer};

use super::battle::has_crossed_danger_zone;
use super::transport::resolve_uncontested_transports;

/// Outcome of one region's step within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed that could unblock another region.
    Waiting,
    Progressed,
}

/// Runs passes to a fixed point. Returns the number of passes made.
pub fn resolve_uncontested_regions<O: Observer>(
    board: &mut Board,
    battles: &[Battle],
    observer: &mut O,
) -> usize {
    let ids: Vec<RegionId> = board.region_ids().collect();
    let mut passes = 0;
    loop {
        passes += 1;
        let mut progressed = false;
        for &id in &ids {
            if resolve_region(board, id, battles, observer) == Step::Progressed {
                progressed = true;
            }
        }
        if !progressed {
            tracing::debug!("uncontested resolution settled after {} passes", passes);
            return passes;
        }
    }
}

/// Resolves a single region as far as it can go without the oracle.
pub fn resolve_region<O: Observer>(
    board: &mut Board,
    id: RegionId,
    battles: &[Battle],
    observer: &mut O,
) -> Step {
    if board[id].resolved() {
        return Step::Waiting;
    }

    if resolve_uncontested_transports(board, id, |mv| has_crossed_danger_zone(battles, mv)) {
        return Step::Waiting;
    }

    if !board[id].attacked() {
        board[id].resolve_retreat();

        let region = &board[id];
        if region.expected_second_moves() == 0 {
            board[id].resolving.resolved = true;
            return Step::Waiting;
        }
        if region.expected_second_moves() == region.incoming_second_moves().len() {
            if let Some(cut) = board.place_second_moves(id) {
                observer.notify(Event::SupportCut {
                    region: board.name(cut.origin).to_string(),
                });
            }
            return Step::Progressed;
        }
    }

    if board.find_border_battle(id).is_some() {
        return Step::Waiting;
    }

    if !board[id].part_of_cycle() {
        if let Some(cycle) = board.find_cycle(id) {
            tracing::debug!(
                "found move cycle {:?}",
                cycle.iter().map(|&r| board.name(r)).collect::<Vec<_>>()
            );
            board.prepare_cycle(&cycle);
            return Step::Progressed;
        }
    }

    let region = &board[id];
    let [mv] = region.incoming_moves() else {
        return Step::Waiting;
    };
    if !region.is_empty() || !(region.controlled() || region.sea) {
        return Step::Waiting;
    }
    if mv.must_cross_danger_zone(region).is_some() && !has_crossed_danger_zone(battles, mv) {
        return Step::Waiting;
    }
    debug_assert!(matches!(mv.kind, OrderKind::Move { .. }));

    let mv = mv.clone();
    board.succeed_move(&mv);
    observer.notify(Event::UncontestedMove {
        from: board.name(mv.origin).to_string(),
        to: board.name(id).to_string(),
    });
    Step::Progressed
}
