//! Session worker that owns the authoritative [`darkroom_core::Session`].
//!
//! Receives commands from [`crate::SessionHandle`], mutates the session, and
//! pushes snapshots out through the registered sinks. Every command is
//! handled to completion before the next one is taken, so round resolution
//! is atomic with the submission that completed the set.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use darkroom_core::{
    ActionKind, ConnectionId, GameConfig, JoinOutcome, PcgSource, Phase, Session, StateSnapshot,
    SubmitOutcome,
};

use crate::api::{Result, RuntimeError, SnapshotSink};

/// Commands that can be sent to the session worker.
pub(crate) enum Command {
    /// Register a connection together with its delivery capability.
    Join {
        connection: ConnectionId,
        name: String,
        sink: Box<dyn SnapshotSink>,
        reply: oneshot::Sender<JoinOutcome>,
    },
    /// Begin the game and broadcast the opening snapshots.
    Start { reply: oneshot::Sender<Result<()>> },
    /// Submit one action for the current round. Invalid submissions are
    /// silently ignored.
    Submit {
        connection: ConnectionId,
        action: ActionKind,
    },
    /// Boot every connection and replace the session with a fresh lobby.
    Restart,
    /// Read-only snapshot query.
    Query {
        connection: ConnectionId,
        reply: oneshot::Sender<Option<StateSnapshot>>,
    },
}

/// Background task that processes session commands.
pub(crate) struct SessionWorker {
    session: Session,
    sinks: BTreeMap<ConnectionId, Box<dyn SnapshotSink>>,
    command_rx: mpsc::Receiver<Command>,
    config: GameConfig,
    seed: Option<u64>,
}

impl SessionWorker {
    pub(crate) fn new(
        config: GameConfig,
        seed: Option<u64>,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            session: Self::fresh_session(config, seed),
            sinks: BTreeMap::new(),
            command_rx,
            config,
            seed,
        }
    }

    fn fresh_session(config: GameConfig, seed: Option<u64>) -> Session {
        let seed = seed.unwrap_or_else(rand::random);
        info!(target: "runtime::worker", seed, "session created");
        Session::new(config, Box::new(PcgSource::seeded(seed)))
    }

    /// Main worker loop. Exits when every handle has been dropped.
    pub(crate) async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command).await;
        }
        debug!(target: "runtime::worker", "command channel closed, worker exiting");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Join {
                connection,
                name,
                sink,
                reply,
            } => {
                let outcome = self.session.join(connection, name);
                self.sinks.insert(connection, sink);
                debug!(target: "runtime::worker", %connection, ?outcome, "join handled");

                // Anyone joining once the game is underway immediately sees
                // the current round state.
                if self.session.phase() != Phase::Lobby {
                    self.deliver(connection).await;
                }
                if reply.send(outcome).is_err() {
                    debug!(target: "runtime::worker", "join reply channel closed (caller dropped)");
                }
            }
            Command::Start { reply } => {
                let result = self.session.start().map_err(RuntimeError::from);
                match &result {
                    Ok(()) => {
                        info!(
                            target: "runtime::worker",
                            players = self.session.participants().len(),
                            "game started"
                        );
                        self.broadcast().await;
                    }
                    Err(error) => {
                        error!(target: "runtime::worker", %error, "start rejected");
                    }
                }
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "start reply channel closed (caller dropped)");
                }
            }
            Command::Submit { connection, action } => match self.session.submit(connection, action)
            {
                SubmitOutcome::Ignored => {
                    debug!(target: "runtime::worker", %connection, %action, "submission ignored");
                }
                SubmitOutcome::Recorded => {
                    self.deliver(connection).await;
                }
                SubmitOutcome::RoundComplete => {
                    // Echo the selection before the round resolves.
                    self.deliver(connection).await;
                    if let Err(error) = self.session.resolve_round() {
                        error!(target: "runtime::worker", %error, "round resolution failed");
                    }
                    self.broadcast().await;
                }
            },
            Command::Restart => {
                for sink in self.sinks.values() {
                    sink.boot().await;
                }
                self.sinks.clear();
                self.session = Self::fresh_session(self.config, self.seed);
                info!(target: "runtime::worker", "session restarted");
            }
            Command::Query { connection, reply } => {
                if reply.send(self.session.snapshot(connection)).is_err() {
                    debug!(target: "runtime::worker", "query reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn deliver(&self, connection: ConnectionId) {
        let Some(snapshot) = self.session.snapshot(connection) else {
            return;
        };
        if let Some(sink) = self.sinks.get(&connection) {
            sink.deliver(snapshot).await;
        }
    }

    async fn broadcast(&self) {
        let connections: Vec<ConnectionId> = self.session.connections().collect();
        for connection in connections {
            self.deliver(connection).await;
        }
    }
}
