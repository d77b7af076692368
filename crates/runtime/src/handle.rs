//! Cloneable façade for clients of the session worker.

use tokio::sync::{mpsc, oneshot};

use darkroom_core::{ActionKind, ConnectionId, JoinOutcome, StateSnapshot};

use crate::api::{Result, RuntimeError, SnapshotSink};
use crate::worker::Command;

/// Cheaply cloneable handle feeding the session worker's command queue.
///
/// Commands sent from one handle are processed in send order, and the worker
/// finishes each one (including a full round resolution) before taking the
/// next.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    /// Registers a connection together with its snapshot sink. Idempotent
    /// per connection.
    pub async fn join(
        &self,
        connection: ConnectionId,
        name: impl Into<String>,
        sink: impl SnapshotSink + 'static,
    ) -> Result<JoinOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Join {
            connection,
            name: name.into(),
            sink: Box::new(sink),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Starts the game. Fails outside the lobby.
    pub async fn start(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Start { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Submits one action for the current round. Unknown connections,
    /// spectators, and double submissions are silently ignored.
    pub async fn submit(&self, connection: ConnectionId, action: ActionKind) -> Result<()> {
        self.send(Command::Submit { connection, action }).await
    }

    /// Ends the current game for everyone, boots their connections, and
    /// opens a fresh lobby.
    pub async fn restart(&self) -> Result<()> {
        self.send(Command::Restart).await
    }

    /// Read-only snapshot for a connection; `None` if it never joined.
    pub async fn snapshot(&self, connection: ConnectionId) -> Result<Option<StateSnapshot>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Query {
            connection,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
