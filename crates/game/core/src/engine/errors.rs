use crate::state::ActorId;

/// Lifecycle and internal-consistency failures surfaced by the session.
///
/// Broken invariants (an active participant missing from the grid or the
/// registry) are reported rather than panicking; the owning layer decides
/// how loudly to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("game has already started")]
    NotInLobby,

    #[error("cannot start a game with no joined players")]
    NoParticipants,

    #[error("no free cell available for placement")]
    GridFull,

    #[error("no grid while the game is active")]
    GridMissing,

    #[error("round is not ready to resolve")]
    RoundIncomplete,

    #[error("actor {0} is not registered")]
    UnknownActor(ActorId),

    #[error("actor {0} is not placed on the grid")]
    ActorNotPlaced(ActorId),
}
