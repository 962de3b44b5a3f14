//! Engine state management.
//!
//! Holds the board of the running game, the current round's season and
//! phase, the battles reported so far this round, and the engine options.
//! Every input runs a bounded synchronous pass and reports what happened to
//! the observer.

use std::collections::{BTreeMap, HashMap};

use crate::board::{Battle, Board, Faction, Order, Phase, Season};
use crate::events::{Event, Observer};
use crate::resolve::{
    apply_battle, check_battle, check_winner, resolve_sieges, resolve_uncontested_regions,
    resolve_winter, BattleError, DEFAULT_WINNING_CASTLE_COUNT,
};
use crate::validate::{validate_orders, OrderRejection};

/// Option holding the number of castles needed to win.
pub const WINNING_CASTLE_COUNT_OPTION: &str = "WinningCastleCount";

/// Misuse of the engine API.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no game has been started")]
    NoGame,

    #[error("no round is being resolved")]
    NotResolving,

    #[error("battle discarded: {0}")]
    Battle(#[from] BattleError),
}

/// Holds the mutable state of the engine between inputs.
pub struct Engine<O: Observer> {
    board: Option<Board>,
    season: Season,
    phase: Phase,
    /// Battles applied during the current round.
    battles: Vec<Battle>,
    round_resolved: bool,
    options: HashMap<String, String>,
    observer: O,
}

impl<O: Observer> Engine<O> {
    /// Creates an engine with no game, reporting to `observer`.
    pub fn new(observer: O) -> Self {
        Engine {
            board: None,
            season: Season::Winter,
            phase: Phase::SubmittingOrders,
            battles: Vec::new(),
            round_resolved: false,
            options: HashMap::new(),
            observer,
        }
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        tracing::debug!("option {} = {:?}", name, value);
        self.options.insert(name, value.unwrap_or_default());
    }

    /// Returns the configured winning castle count, or the default.
    pub fn winning_castle_count(&self) -> usize {
        let Some(value) = self.options.get(WINNING_CASTLE_COUNT_OPTION) else {
            return DEFAULT_WINNING_CASTLE_COUNT;
        };
        match value.parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                tracing::warn!(
                    "ignoring invalid {} '{}'",
                    WINNING_CASTLE_COUNT_OPTION,
                    value
                );
                DEFAULT_WINNING_CASTLE_COUNT
            }
        }
    }

    /// Starts a game on the given board, dropping any previous one.
    pub fn start_game(&mut self, board: Board) {
        tracing::info!("game started with {} regions", board.len());
        self.board = Some(board);
        self.season = Season::Winter;
        self.phase = Phase::SubmittingOrders;
        self.battles.clear();
        self.round_resolved = false;
    }

    /// Opens a new round: clears last round's transient state.
    pub fn request_orders(&mut self, season: Season) -> Result<(), EngineError> {
        let board = self.board.as_mut().ok_or(EngineError::NoGame)?;
        board.reset_resolving_state();
        self.battles.clear();
        self.round_resolved = false;
        self.season = season;
        tracing::info!("{} round opened", season);
        self.set_phase(Phase::SubmittingOrders);
        Ok(())
    }

    /// Acknowledges that this player's orders were submitted.
    pub fn confirm_orders(&mut self) {
        self.set_phase(Phase::OrdersSubmitted);
    }

    /// Validates and places every faction's orders, then resolves what can
    /// be resolved without battles. Returns the rejected orders.
    pub fn place_orders(
        &mut self,
        orders_by_faction: BTreeMap<Faction, Vec<Order>>,
    ) -> Result<Vec<OrderRejection>, EngineError> {
        let board = self.board.as_mut().ok_or(EngineError::NoGame)?;

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (faction, orders) in orders_by_faction {
            let (ok, bad) = validate_orders(board, self.season, &faction, orders);
            accepted.extend(ok);
            rejected.extend(bad);
        }
        tracing::info!(
            "placing {} orders ({} rejected) for {}",
            accepted.len(),
            rejected.len(),
            self.season
        );

        let cut = board.place_orders(accepted);
        for support in &cut {
            self.observer.notify(Event::SupportCut {
                region: board.name(support.origin).to_string(),
            });
        }

        self.set_phase(Phase::ResolvingOrders);
        self.resolve()?;
        Ok(rejected)
    }

    /// Tells observers a battle is about to be fought.
    pub fn announce_battle(&mut self, battle: &Battle) -> Result<(), EngineError> {
        let board = self.board.as_ref().ok_or(EngineError::NoGame)?;
        let regions = battle
            .regions()
            .into_iter()
            .filter(|id| id.index() < board.len())
            .map(|id| board.name(id).to_string())
            .collect();
        self.observer.notify(Event::BattleAnnounced { regions });
        Ok(())
    }

    /// Applies a battle result and resolves whatever it unblocked. A battle
    /// the board is not waiting on is discarded and the board left untouched.
    pub fn apply_battle_result(&mut self, battle: Battle) -> Result<(), EngineError> {
        let board = self.board.as_mut().ok_or(EngineError::NoGame)?;
        if self.phase != Phase::ResolvingOrders || self.round_resolved {
            return Err(EngineError::NotResolving);
        }

        if let Err(err) = check_battle(board, &battle, &self.battles) {
            tracing::warn!("discarding battle result: {}", err);
            return Err(err.into());
        }

        apply_battle(board, &battle);
        self.battles.push(battle);
        self.resolve()
    }

    /// Runs the resolution pass for the round's season and closes the round
    /// once every region is resolved.
    fn resolve(&mut self) -> Result<(), EngineError> {
        let board = self.board.as_mut().ok_or(EngineError::NoGame)?;
        if self.season == Season::Winter {
            resolve_winter(board, &mut self.observer);
        } else {
            resolve_uncontested_regions(board, &self.battles, &mut self.observer);
        }

        if !board.resolved() || self.round_resolved {
            return Ok(());
        }
        self.round_resolved = true;

        if self.season != Season::Winter {
            resolve_sieges(board);
        }
        tracing::info!("{} round resolved", self.season);
        self.observer.notify(Event::RoundResolved {
            season: self.season,
        });

        let winning_castle_count = self.winning_castle_count();
        let Some(board) = self.board.as_ref() else {
            return Ok(());
        };
        if let Some(faction) = check_winner(board, winning_castle_count) {
            tracing::info!("{} won the game", faction);
            self.observer.notify(Event::Winner { faction });
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.observer.notify(Event::PhaseChanged { phase });
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether every region of the current round has been resolved.
    pub fn round_resolved(&self) -> bool {
        self.round_resolved
    }

    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}
