//! Order resolution.
//!
//! Resolves a round of simultaneous orders. Everything that can be settled
//! without dice (uncontested moves, cycles, transports, winter orders) is
//! resolved in passes over the board; contested regions wait for battle
//! results reported back to the engine.

pub mod battle;
pub mod cycle;
pub mod movement;
pub mod phase;
pub mod transport;
pub mod winter;

pub use battle::{apply_battle, check_battle, has_crossed_danger_zone, BattleError};
pub use movement::{resolve_region, resolve_uncontested_regions, Step};
pub use phase::{castle_counts, check_winner, resolve_sieges, DEFAULT_WINNING_CASTLE_COUNT};
pub use transport::{best_transport_path, find_transport_path, TransportPath};
pub use winter::resolve_winter;
