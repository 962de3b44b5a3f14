//! End-of-round bookkeeping.
//!
//! Once every region is resolved, sieges advance and the castle count decides
//! whether the game is over.

use std::collections::BTreeMap;

use crate::board::{Board, Faction, OrderKind};

/// Rounds of uninterrupted siege needed to take a castle.
pub const SIEGE_ROUNDS_TO_CONQUER: u8 = 2;

/// Default number of castles a faction must hold to win.
pub const DEFAULT_WINNING_CASTLE_COUNT: usize = 5;

/// Advances every siege still standing at the end of the round. A besieging
/// unit that was removed during the round does not count.
pub fn resolve_sieges(board: &mut Board) {
    let ids: Vec<_> = board.region_ids().collect();
    for id in ids {
        let region = &mut board[id];
        if !matches!(region.order().map(|o| &o.kind), Some(OrderKind::Besiege)) {
            continue;
        }
        let Some(faction) = region.unit.as_ref().map(|u| u.faction.clone()) else {
            continue;
        };

        region.siege_count += 1;
        if region.siege_count >= SIEGE_ROUNDS_TO_CONQUER {
            tracing::info!("{} took {} after a siege", faction, region.name);
            region.controlling_faction = Some(faction);
            region.siege_count = 0;
        }
    }
}

/// Controlled castles per faction.
pub fn castle_counts(board: &Board) -> BTreeMap<Faction, usize> {
    let mut counts = BTreeMap::new();
    for region in board.regions().filter(|r| r.castle) {
        if let Some(faction) = &region.controlling_faction {
            *counts.entry(faction.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Returns the faction holding the most castles, if it holds at least
/// `winning_castle_count` of them and no other faction holds as many.
pub fn check_winner(board: &Board, winning_castle_count: usize) -> Option<Faction> {
    let counts = castle_counts(board);
    let highest = counts.values().copied().max()?;
    if highest < winning_castle_count {
        return None;
    }

    let mut leaders = counts.into_iter().filter(|&(_, count)| count == highest);
    let (winner, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some(winner)
}
