//! Applying oracle battle results to the board.

use crate::board::{Battle, BattleKind, Board, Order, RegionId};

/// A battle the board cannot accept.
#[derive(Debug, thiserror::Error)]
pub enum BattleError {
    #[error("battle has no results")]
    Empty,

    #[error("battle result has neither an order nor a defender")]
    MissingCombatant,

    #[error("no pending contest matches battle at {0:?}")]
    NotPending(Vec<String>),

    #[error("danger zone crossing already resolved for order from {0}")]
    AlreadyCrossed(String),
}

/// Whether the oracle has already reported the given move's danger-zone crossing.
pub fn has_crossed_danger_zone(battles: &[Battle], order: &Order) -> bool {
    battles.iter().any(|b| {
        b.danger_zone.is_some() && b.results.iter().any(|r| r.order.as_ref() == Some(order))
    })
}

/// Checks that a battle is well formed and answers a contest the board is
/// waiting on.
pub fn check_battle(board: &Board, battle: &Battle, history: &[Battle]) -> Result<(), BattleError> {
    if battle.results.is_empty() {
        return Err(BattleError::Empty);
    }
    if battle.results.iter().any(|r| r.faction().is_none()) {
        return Err(BattleError::MissingCombatant);
    }
    if battle.danger_zone.is_some() {
        if let Some(order) = battle.results.iter().find_map(|r| r.order.as_ref()) {
            if has_crossed_danger_zone(history, order) {
                return Err(BattleError::AlreadyCrossed(board.name(order.origin).to_string()));
            }
        }
    }
    if !board.expects_battle(battle) {
        let regions = battle
            .regions()
            .into_iter()
            .filter(|id| id.index() < board.len())
            .map(|id| board.name(id).to_string())
            .collect();
        return Err(BattleError::NotPending(regions));
    }
    Ok(())
}

/// Applies a battle the board is known to expect.
pub fn apply_battle(board: &mut Board, battle: &Battle) {
    match battle.kind() {
        BattleKind::DangerZoneCrossing => resolve_danger_zone_crossing(board, battle),
        BattleKind::Border => resolve_border_battle(board, battle),
        BattleKind::NeutralConquest => resolve_neutral_conquest(board, battle),
        BattleKind::Multiplayer => resolve_multiplayer_battle(board, battle),
    }
}

/// A failed crossing kills a move; any other order just fails.
fn resolve_danger_zone_crossing(board: &mut Board, battle: &Battle) {
    let (winners, _) = battle.winners_and_losers();
    if !winners.is_empty() {
        return;
    }
    let Some(order) = battle.results.first().and_then(|r| r.order.as_ref()) else {
        return;
    };
    tracing::debug!("{} failed to cross {:?}", order.faction, battle.danger_zone);
    if order.is_move() {
        board.kill_move(order);
    } else {
        board.remove_order(order);
    }
}

/// Only the loser of a border battle is affected; the winner may still have
/// to fight for the region it moves into. On a tie both retreat.
fn resolve_border_battle(board: &mut Board, battle: &Battle) {
    let orders: Vec<&Order> = battle.results.iter().filter_map(|r| r.order.as_ref()).collect();
    let (winners, losers) = battle.winners_and_losers();

    if winners.len() > 1 {
        // Both orders go first, so neither origin still counts as attacked.
        for order in &orders {
            board.remove_order(order);
        }
        for order in &orders {
            board.retreat_move(order);
        }
        return;
    }

    if let Some(order) = orders.iter().find(|o| losers.contains(&o.faction)) {
        board.kill_move(order);
    }
}

/// A lone mover against an unheld region, measured against a fixed threshold.
fn resolve_neutral_conquest(board: &mut Board, battle: &Battle) {
    let Some(mv) = battle.results.first().and_then(|r| r.order.as_ref()) else {
        return;
    };
    let (winners, _) = battle.winners_and_losers();
    if winners.len() == 1 {
        board.succeed_move(mv);
    } else {
        board.kill_move(mv);
    }
}

fn resolve_multiplayer_battle(board: &mut Board, battle: &Battle) {
    let (winners, losers) = battle.winners_and_losers();
    let tie = winners.len() > 1;
    let region: Option<RegionId> = battle.regions().first().copied();

    for result in &battle.results {
        if let Some(defender) = &result.defender_faction {
            // A defender beaten outright in a held region is replaced by the
            // winner's succeeded move instead.
            if let Some(id) = region {
                if losers.contains(defender) && (tie || !board[id].controlled()) {
                    board[id].remove_unit();
                }
            }
            continue;
        }

        let Some(mv) = &result.order else {
            continue;
        };
        if losers.contains(&mv.faction) {
            board.kill_move(mv);
        } else if tie {
            board.retreat_move(mv);
        } else if mv
            .move_destination()
            .is_some_and(|d| board[d].controlled())
        {
            board.succeed_move(mv);
        }
    }
}
