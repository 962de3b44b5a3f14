//! Casus Belli order-resolution engine.
//!
//! This binary reads driver commands from stdin and writes responses and
//! engine events to stdout, one per line. Logs go to stderr, filtered by
//! `RUST_LOG`.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use casus_belli::board::{Battle, Board, Faction, MapDefinition};
use casus_belli::engine::{Engine, EngineError};
use casus_belli::events::Event;
use casus_belli::protocol::{
    orders_from_messages, parse_command, BattleMessage, Command, OrderMessage, ProtocolError,
    RejectionMessage,
};

/// Runs the main protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new(Vec::new());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };
        if cmd == Command::Quit {
            break;
        }

        if let Err(err) = handle_command(&mut engine, cmd, &mut out) {
            tracing::warn!("{}", err);
        }
        if let Err(err) = write_events(&mut engine, &mut out) {
            tracing::error!("failed to write events: {}", err);
            break;
        }
    }
}

fn handle_command<W: Write>(
    engine: &mut Engine<Vec<Event>>,
    cmd: Command,
    out: &mut W,
) -> Result<(), ProtocolError> {
    match cmd {
        Command::IsReady => {
            writeln!(out, "readyok")?;
        }
        Command::SetOption { name, value } => {
            engine.set_option(name, value);
        }
        Command::GameStarted { map } => {
            let definition: MapDefinition = serde_json::from_str(&map)?;
            engine.start_game(Board::from_definition(&definition)?);
        }
        Command::OrderRequest { season } => {
            engine.request_orders(season)?;
        }
        Command::OrdersConfirmed => {
            engine.confirm_orders();
        }
        Command::Orders { json } => {
            let messages: BTreeMap<Faction, Vec<OrderMessage>> = serde_json::from_str(&json)?;
            let board = engine.board().ok_or(EngineError::NoGame)?;
            let (orders, mut rejected) = orders_from_messages(board, messages);
            rejected.extend(engine.place_orders(orders)?);

            if !rejected.is_empty() {
                let messages: Vec<RejectionMessage> = rejected.iter().map(Into::into).collect();
                writeln!(out, "rejected {}", serde_json::to_string(&messages)?)?;
            }
        }
        Command::BattleAnnouncement { json } => {
            let battle = parse_battle(engine, &json)?;
            engine.announce_battle(&battle)?;
        }
        Command::BattleResults { json } => {
            let battle = parse_battle(engine, &json)?;
            engine.apply_battle_result(battle)?;
        }
        Command::Board => {
            let board = engine.board().ok_or(EngineError::NoGame)?;
            writeln!(out, "board {}", serde_json::to_string(&board.to_definition())?)?;
        }
        Command::Quit => {}
    }
    Ok(())
}

fn parse_battle(engine: &Engine<Vec<Event>>, json: &str) -> Result<Battle, ProtocolError> {
    let message: BattleMessage = serde_json::from_str(json)?;
    let board = engine.board().ok_or(EngineError::NoGame)?;
    message.to_battle(board)
}

/// Drains the events raised by the last command.
fn write_events<W: Write>(
    engine: &mut Engine<Vec<Event>>,
    out: &mut W,
) -> Result<(), ProtocolError> {
    for event in std::mem::take(engine.observer_mut()) {
        writeln!(out, "event {}", serde_json::to_string(&event)?)?;
    }
    out.flush()?;
    Ok(())
}
