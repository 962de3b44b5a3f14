//! Driver protocol handling.
//!
//! This module implements the line commands the game driver sends and the
//! JSON messages carried by them: maps, orders, battles and rejections.

pub mod message;
pub mod parser;

pub use message::{
    orders_from_messages, BattleMessage, OrderMessage, ProtocolError, RejectionMessage,
    ResultMessage,
};
pub use parser::{parse_command, Command};
