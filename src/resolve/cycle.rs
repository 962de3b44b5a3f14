//! Move cycles.
//!
//! Units moving in a closed loop (A to B, B to C, C to A) would each wait for
//! the next to leave. A detected cycle is prepared by lifting every unit off
//! the board, after which each leg resolves like a move into an empty region.

use crate::board::{Board, RegionId};

impl Board {
    /// Follows move orders from `start` and returns the regions of the loop
    /// leading back to it, in the order they are visited.
    ///
    /// Returns None when the chain ends in a non-move order, in an empty
    /// region, or in a loop that does not pass through `start`.
    pub fn find_cycle(&self, start: RegionId) -> Option<Vec<RegionId>> {
        let mut cycle = Vec::new();
        let mut current = start;
        loop {
            let destination = self[current].order()?.move_destination()?;
            cycle.push(current);
            if destination == start {
                return Some(cycle);
            }
            if cycle.contains(&destination) {
                return None;
            }
            current = destination;
        }
    }

    /// Lifts the units of a cycle and marks its regions, so the moves into
    /// them see empty regions and later removals leave arrivals alone.
    pub fn prepare_cycle(&mut self, cycle: &[RegionId]) {
        for &id in cycle {
            let region = &mut self[id];
            region.remove_unit();
            region.resolving.order = None;
            region.resolving.part_of_cycle = true;
        }
    }
}
