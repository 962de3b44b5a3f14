//! Driver command parser.
//!
//! Parses incoming line commands from raw text into structured `Command`
//! variants that the main loop dispatches on. JSON payloads are kept as raw
//! text here and decoded against the board by the loop.

use crate::board::Season;

/// A parsed driver-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a game on the given map definition.
    GameStarted { map: String },

    /// Open a round for the given season.
    OrderRequest { season: Season },

    /// This player's orders were received by the server.
    OrdersConfirmed,

    /// Every faction's orders for the round, keyed by faction.
    Orders { json: String },

    /// A battle is about to be fought.
    BattleAnnouncement { json: String },

    /// The outcome of a battle.
    BattleResults { json: String },

    /// Print the current board.
    Board,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (trimmed, ""),
    };
    if keyword.is_empty() {
        return None;
    }

    match keyword {
        "isready" => Some(Command::IsReady),
        "ordersconfirmed" => Some(Command::OrdersConfirmed),
        "board" => Some(Command::Board),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(rest),
        "orderrequest" => parse_orderrequest(rest),
        "gamestarted" => payload("gamestarted", rest).map(|map| Command::GameStarted { map }),
        "orders" => payload("orders", rest).map(|json| Command::Orders { json }),
        "battleannouncement" => {
            payload("battleannouncement", rest).map(|json| Command::BattleAnnouncement { json })
        }
        "battleresults" => {
            payload("battleresults", rest).map(|json| Command::BattleResults { json })
        }

        other => {
            tracing::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(rest: &str) -> Option<Command> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 2 || tokens[0] != "name" {
        tracing::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&tokens[1..vi], &tokens[vi + 1..]),
        None => (&tokens[1..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        tracing::warn!("malformed setoption: empty name");
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Some(Command::SetOption { name, value })
}

/// Parses `orderrequest <season>`.
fn parse_orderrequest(rest: &str) -> Option<Command> {
    match Season::from_name(rest) {
        Some(season) => Some(Command::OrderRequest { season }),
        None => {
            tracing::warn!("unknown season: '{}'", rest);
            None
        }
    }
}

/// Everything after the keyword, which must not be empty.
fn payload(keyword: &str, rest: &str) -> Option<String> {
    if rest.is_empty() {
        tracing::warn!("malformed {}: expected '{} <json>'", keyword, keyword);
        return None;
    }
    Some(rest.to_string())
}
