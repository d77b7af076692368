//! Runtime orchestrator: builds and owns the session worker task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use darkroom_core::GameConfig;

use crate::api::{Result, RuntimeError};
use crate::handle::SessionHandle;
use crate::worker::SessionWorker;

/// Owns the background worker and hands out [`SessionHandle`]s.
pub struct SessionRuntime {
    handle: SessionHandle,
    worker: JoinHandle<()>,
}

impl SessionRuntime {
    pub fn builder() -> SessionRuntimeBuilder {
        SessionRuntimeBuilder::new()
    }

    /// A cloneable handle for clients and transport tasks.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Waits for the worker to exit. The worker stops once every outstanding
    /// handle has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`SessionRuntime`] with flexible configuration.
pub struct SessionRuntimeBuilder {
    config: GameConfig,
    seed: Option<u64>,
    command_buffer: usize,
}

impl SessionRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: GameConfig::default(),
            seed: None,
            command_buffer: 32,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Pins the outcome seed for reproducible runs; restarts reuse it.
    /// Unseeded runtimes draw a fresh seed from process entropy per session.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity;
        self
    }

    /// Spawns the worker task and returns the runtime.
    pub fn spawn(self) -> SessionRuntime {
        let (command_tx, command_rx) = mpsc::channel(self.command_buffer);
        let worker = SessionWorker::new(self.config, self.seed, command_rx);
        SessionRuntime {
            handle: SessionHandle::new(command_tx),
            worker: tokio::spawn(worker.run()),
        }
    }
}
