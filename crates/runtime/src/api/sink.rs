use async_trait::async_trait;

use darkroom_core::StateSnapshot;

/// Capability to deliver state to one connected client.
///
/// The engine never sees the concrete transport. The worker holds one sink
/// per connection and calls it after a mid-game join, after every accepted
/// submission, and after every resolved round; tests inject channel-backed
/// fakes.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Delivers this actor's own snapshot.
    async fn deliver(&self, snapshot: StateSnapshot);

    /// Tells the client to drop its local view; sent on restart.
    async fn boot(&self);
}
