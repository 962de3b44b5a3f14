//! Events the engine reports while a round is resolved.
//!
//! Anything that wants to follow a game (a UI, a log, a test) implements
//! [`Observer`] and is handed to the engine.

use std::sync::mpsc::Sender;

use serde::Serialize;

use crate::board::{Faction, Phase, Season};

/// Something observable happened to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    PhaseChanged { phase: Phase },
    /// A support order was cancelled by an attack on its origin.
    SupportCut { region: String },
    UncontestedMove { from: String, to: String },
    BattleAnnounced { regions: Vec<String> },
    RoundResolved { season: Season },
    Winner { faction: Faction },
}

/// Receives engine events.
pub trait Observer {
    fn notify(&mut self, event: Event);
}

impl Observer for Vec<Event> {
    fn notify(&mut self, event: Event) {
        self.push(event);
    }
}

/// Forwards events over a channel. A hung-up receiver is ignored.
impl Observer for Sender<Event> {
    fn notify(&mut self, event: Event) {
        let _ = self.send(event);
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn notify(&mut self, event: Event) {
        (**self).notify(event);
    }
}
