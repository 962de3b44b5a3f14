//! Transport resolution.
//!
//! A land unit may move to a region it does not border if a chain of its own
//! faction's ships, each ordered to transport, links the two. Paths are
//! searched depth first; each level excludes the ships already considered.

use std::collections::HashSet;

use crate::board::{Board, DangerZone, Faction, Order, OrderKind, RegionId, UnitType};

/// A way across the water found for a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPath {
    /// Whether any ship on the path is under attack.
    pub attacked: bool,
    /// Danger zone on the last hop, into the destination.
    pub danger_zone: Option<DangerZone>,
}

/// Picks the best of several paths: unattacked before attacked, then no
/// danger zone before danger zone. Equal paths keep the one found first.
pub fn best_transport_path(paths: impl IntoIterator<Item = TransportPath>) -> Option<TransportPath> {
    paths
        .into_iter()
        .min_by_key(|p| (p.attacked, p.danger_zone.is_some()))
}

/// Resolves transports of the moves into a region.
///
/// Moves with no path are retreated. Returns true if the region must wait,
/// because a transport is under attack or still has to cross a danger zone
/// (`crossed` reports whether the oracle has already ruled on a move's crossing).
pub fn resolve_uncontested_transports(
    board: &mut Board,
    region: RegionId,
    crossed: impl Fn(&Order) -> bool,
) -> bool {
    if board[region].transports_resolved() {
        return false;
    }

    let moves = board[region].incoming_moves().to_vec();
    for mv in &moves {
        if let Some(path) = resolve_transport(board, mv, region) {
            if path.attacked || (path.danger_zone.is_some() && !crossed(mv)) {
                return true;
            }
        }
    }

    board[region].resolving.transports_resolved = true;
    false
}

/// Returns the path a non-adjacent move takes, retreating it if none exists.
/// Moves between neighbors need no transport and return None.
fn resolve_transport(board: &mut Board, mv: &Order, destination: RegionId) -> Option<TransportPath> {
    if board[destination].adjacent_to(mv.origin) {
        return None;
    }

    let path = find_transport_path(board, mv.origin, destination, &mv.faction, mv.unit_type);
    if path.is_none() {
        tracing::debug!(
            "no transport path from {} to {}, retreating",
            board.name(mv.origin),
            board.name(destination)
        );
        board.retreat_move(mv);
    }
    path
}

/// Finds the best chain of transporting ships from `origin` to `destination`.
pub fn find_transport_path(
    board: &Board,
    origin: RegionId,
    destination: RegionId,
    faction: &Faction,
    unit_type: UnitType,
) -> Option<TransportPath> {
    if board[origin].sea || unit_type == UnitType::Ship {
        return None;
    }
    search(board, origin, destination, faction, &HashSet::new())
}

fn search(
    board: &Board,
    region: RegionId,
    destination: RegionId,
    faction: &Faction,
    excluded: &HashSet<RegionId>,
) -> Option<TransportPath> {
    let (transports, next_excluded) = transporting_neighbors(board, region, faction, excluded);

    let mut paths = Vec::new();
    for transport in transports {
        let attacked = board[transport].attacked();
        let mut candidates = Vec::new();

        if let Some(danger_zone) = destination_edge(board, transport, destination) {
            candidates.push(TransportPath {
                attacked,
                danger_zone,
            });
        }
        if let Some(next) = search(board, transport, destination, faction, &next_excluded) {
            candidates.push(TransportPath {
                attacked: attacked || next.attacked,
                danger_zone: next.danger_zone,
            });
        }

        paths.extend(best_transport_path(candidates));
    }

    best_transport_path(paths)
}

/// Neighbors holding a transporting ship of `faction`, plus the exclusion set
/// for the next level of the search.
fn transporting_neighbors(
    board: &Board,
    region: RegionId,
    faction: &Faction,
    excluded: &HashSet<RegionId>,
) -> (Vec<RegionId>, HashSet<RegionId>) {
    let mut transports = Vec::new();
    let mut next_excluded = excluded.clone();

    for neighbor in &board[region].neighbors {
        let candidate = &board[neighbor.region];
        if excluded.contains(&candidate.id) || transports.contains(&candidate.id) {
            continue;
        }
        let transporting = candidate
            .order()
            .is_some_and(|o| matches!(o.kind, OrderKind::Transport));
        let friendly = candidate.unit.as_ref().is_some_and(|u| &u.faction == faction);
        if transporting && friendly {
            transports.push(candidate.id);
            next_excluded.insert(candidate.id);
        }
    }

    (transports, next_excluded)
}

/// If `region` borders `destination`, returns the danger zone of the edge,
/// preferring an edge without one.
fn destination_edge(
    board: &Board,
    region: RegionId,
    destination: RegionId,
) -> Option<Option<DangerZone>> {
    board[region]
        .neighbor(destination, None)
        .map(|edge| edge.danger_zone.clone())
}
