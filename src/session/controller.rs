//! Owning controller for one game's session.
//!
//! The controller is the single logical owner the concurrency model calls
//! for: it serializes input delivery and host ticks onto one value, applies
//! the persistence write policy, and feeds terminal results to the score
//! ledger. Everything it does goes through the engine's total transition
//! functions, so no call here can fail.

use tracing::{debug, warn};

use super::events::SessionEvent;
use super::ledger::ScoreLedger;
use super::snapshot;
use super::store::KvStore;
use super::{Difficulty, GameSession, SessionStatus};

/// Opportunistic persistence cadence while a session is running.
pub const PERSIST_INTERVAL_MS: u64 = 10_000;

pub struct SessionController<G: GameSession, S: KvStore> {
    game: G,
    store: S,
    ledger: ScoreLedger,
    /// Running time since the last opportunistic snapshot write.
    since_persist_ms: u64,
}

impl<G: GameSession, S: KvStore> SessionController<G, S> {
    /// Construct the controller, restoring a saved session if a well-formed
    /// record exists. A malformed record is logged, dropped from the store,
    /// and replaced by a fresh `NotStarted` session at `default_difficulty`.
    pub fn new(mut store: S, default_difficulty: Difficulty) -> Self {
        let mut rng = rand::thread_rng();
        let ledger = ScoreLedger::load(&store);
        let game = match store.get(G::KIND.session_key()) {
            None => G::new_game(default_difficulty, &mut rng),
            Some(blob) => match snapshot::from_blob(&blob).and_then(|map| G::restore(&map)) {
                Ok(game) => {
                    debug!(game = G::KIND.id(), "session restored from saved record");
                    game
                }
                Err(err) => {
                    warn!(game = G::KIND.id(), %err, "discarding malformed session record");
                    store.remove(G::KIND.session_key());
                    G::new_game(default_difficulty, &mut rng)
                }
            },
        };
        Self {
            game,
            store,
            ledger,
            since_persist_ms: 0,
        }
    }

    /// Read-only projection of the current session.
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Discard the current session and start fresh at `difficulty`.
    pub fn new_game(&mut self, difficulty: Difficulty) {
        let mut rng = rand::thread_rng();
        self.game.reset(difficulty, &mut rng);
        self.store.remove(G::KIND.session_key());
        self.since_persist_ms = 0;
    }

    pub fn start(&mut self) {
        self.game.start();
    }

    /// Pause and snapshot. The engine cancels its timer inside the
    /// transition; the write happens after, so persistence can never leave
    /// a timer armed.
    pub fn pause(&mut self) {
        self.game.pause();
        self.persist();
    }

    pub fn resume(&mut self) {
        self.game.resume();
    }

    /// Deliver one player input.
    pub fn submit_input(&mut self, input: G::Input) -> Vec<SessionEvent> {
        let events = self.game.submit_input(input);
        self.after_mutation(&events);
        events
    }

    /// Feed host frame time into the session.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<SessionEvent> {
        let mut rng = rand::thread_rng();
        let events = self.game.drive(dt_ms, &mut rng);

        if self.game.status() == SessionStatus::Running {
            self.since_persist_ms += dt_ms;
            if self.since_persist_ms >= PERSIST_INTERVAL_MS {
                self.persist();
            }
        }

        self.after_mutation(&events);
        events
    }

    /// The host is about to be suspended; snapshot now.
    pub fn on_background(&mut self) {
        self.persist();
    }

    /// Drop any persisted record for this game.
    pub fn clear_saved(&mut self) {
        self.store.remove(G::KIND.session_key());
    }

    /// Write policy: running/paused sessions are snapshotted; terminal
    /// sessions clear their record; `NotStarted` writes nothing.
    fn persist(&mut self) {
        match self.game.status() {
            SessionStatus::Running | SessionStatus::Paused => {
                let blob = snapshot::to_blob(&self.game.snapshot());
                self.store.set(G::KIND.session_key(), &blob);
                self.since_persist_ms = 0;
                debug!(game = G::KIND.id(), "session snapshot persisted");
            }
            SessionStatus::Over => self.store.remove(G::KIND.session_key()),
            SessionStatus::NotStarted => {}
        }
    }

    /// Terminal bookkeeping, keyed off the one-shot `GameOver` event so a
    /// finished session is recorded exactly once.
    fn after_mutation(&mut self, events: &[SessionEvent]) {
        let finished = events
            .iter()
            .any(|e| matches!(e, SessionEvent::GameOver { .. }));
        if !finished {
            return;
        }

        let difficulty = self.game.difficulty();
        let game = &self.game;
        if self
            .ledger
            .apply(G::KIND, difficulty, |entry| game.record_best(entry))
        {
            self.ledger.save(&mut self.store);
        }
        self.store.remove(G::KIND.session_key());
        self.since_persist_ms = 0;
    }
}
