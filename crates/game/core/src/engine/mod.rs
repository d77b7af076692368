//! Round coordination state machine.
//!
//! [`Session`] is the authoritative owner of the actor registry, the grid,
//! and the pending-action set. It collects one action per participant per
//! round and resolves the whole round synchronously once the set is
//! complete; nothing can interleave mid-resolution. Snapshot delivery is the
//! owning layer's concern, so every mutation reports what happened through a
//! small outcome enum instead of talking to a transport.

mod errors;
mod resolve;
mod sensing;

pub use errors::EngineError;

use std::collections::BTreeMap;

use crate::action::ActionKind;
use crate::config::GameConfig;
use crate::rng::OutcomeSource;
use crate::snapshot::StateSnapshot;
use crate::state::{ActorId, ActorState, ConnectionId, Grid};

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Players may join; no grid exists yet.
    Lobby,
    /// The grid exists and rounds are being played.
    Active,
    /// The round budget ran out or the door was unlocked.
    Over,
}

/// What `join` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// New lobby participant.
    Joined(ActorId),
    /// This connection was already registered.
    AlreadyJoined(ActorId),
    /// Joined mid-game; read-only from here on.
    Spectating(ActorId),
}

impl JoinOutcome {
    pub fn actor_id(self) -> ActorId {
        match self {
            JoinOutcome::Joined(id)
            | JoinOutcome::AlreadyJoined(id)
            | JoinOutcome::Spectating(id) => id,
        }
    }
}

/// What `submit` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Unknown connection, spectator, duplicate submission, or wrong phase.
    /// Deliberately silent towards the caller.
    Ignored,
    /// Recorded; the round is still waiting on other participants.
    Recorded,
    /// This submission completed the set; call [`Session::resolve_round`].
    RoundComplete,
}

/// One game in progress, from lobby to game over.
///
/// A session is created once per game and discarded wholesale on restart.
/// All randomness flows through the injected [`OutcomeSource`], so a seeded
/// source replays a full game deterministically.
pub struct Session {
    config: GameConfig,
    rng: Box<dyn OutcomeSource>,
    actors: BTreeMap<ActorId, ActorState>,
    connections: BTreeMap<ConnectionId, ActorId>,
    /// Actors that were present at start, in join order. Later joiners
    /// spectate and are never placed.
    participants: Vec<ActorId>,
    grid: Option<Grid>,
    /// Submitted actions for the current round, kept in submission order
    /// because that is the order they resolve in.
    pending: Vec<(ActorId, ActionKind)>,
    rounds_remaining: u32,
    unlocked: bool,
    phase: Phase,
    next_actor_id: u32,
}

impl Session {
    pub fn new(config: GameConfig, rng: Box<dyn OutcomeSource>) -> Self {
        Self {
            config,
            rng,
            actors: BTreeMap::new(),
            connections: BTreeMap::new(),
            participants: Vec::new(),
            grid: None,
            pending: Vec::new(),
            rounds_remaining: config.base_rounds,
            unlocked: false,
            phase: Phase::Lobby,
            next_actor_id: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.rounds_remaining
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn participants(&self) -> &[ActorId] {
        &self.participants
    }

    pub fn actor_id(&self, connection: ConnectionId) -> Option<ActorId> {
        self.connections.get(&connection).copied()
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    /// Every registered connection, participants and spectators alike.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.keys().copied()
    }

    /// Registers the connection, idempotently. Lobby joiners become
    /// participants and extend the round budget; anyone arriving once the
    /// game is active spectates.
    pub fn join(&mut self, connection: ConnectionId, name: impl Into<String>) -> JoinOutcome {
        if let Some(&id) = self.connections.get(&connection) {
            return JoinOutcome::AlreadyJoined(id);
        }

        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        self.actors.insert(id, ActorState::new(id, name));
        self.connections.insert(connection, id);

        if self.phase == Phase::Lobby {
            if !self.participants.is_empty() {
                self.rounds_remaining += self.config.bonus_rounds_per_joiner;
            }
            self.participants.push(id);
            JoinOutcome::Joined(id)
        } else {
            JoinOutcome::Spectating(id)
        }
    }

    /// Creates the grid, places every participant plus the door and key,
    /// opens the first turn segment, and runs the initial surroundings
    /// check. Valid only from the lobby.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Lobby {
            return Err(EngineError::NotInLobby);
        }
        if self.participants.is_empty() {
            return Err(EngineError::NoParticipants);
        }

        let extra = (self.participants.len() as u32 - 1) * self.config.growth_per_player;
        let mut grid = Grid::new(
            self.config.base_width + extra,
            self.config.base_height + extra,
        );

        for &id in &self.participants {
            let (_, facing) = grid
                .place_randomly(id, self.rng.as_mut())
                .ok_or(EngineError::GridFull)?;
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.facing = facing;
            }
        }
        grid.place_door(self.rng.as_mut()).ok_or(EngineError::GridFull)?;
        grid.place_key(self.rng.as_mut()).ok_or(EngineError::GridFull)?;

        self.grid = Some(grid);
        self.phase = Phase::Active;

        for &id in &self.participants {
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.timeline.begin_turn();
            }
        }

        let grid = self.grid.as_mut().ok_or(EngineError::GridMissing)?;
        for &id in &self.participants {
            sensing::surroundings_check(id, &mut self.actors, grid, &mut self.unlocked)?;
        }

        Ok(())
    }

    /// Records a participant's action for the current round. At most one
    /// submission per participant per round; everything else is silently
    /// ignored.
    pub fn submit(&mut self, connection: ConnectionId, action: ActionKind) -> SubmitOutcome {
        if self.phase != Phase::Active {
            return SubmitOutcome::Ignored;
        }
        let Some(&actor_id) = self.connections.get(&connection) else {
            return SubmitOutcome::Ignored;
        };
        if !self.participants.contains(&actor_id) {
            return SubmitOutcome::Ignored;
        }
        if self.pending.iter().any(|(id, _)| *id == actor_id) {
            return SubmitOutcome::Ignored;
        }

        self.pending.push((actor_id, action));
        if self.pending.len() == self.participants.len() {
            SubmitOutcome::RoundComplete
        } else {
            SubmitOutcome::Recorded
        }
    }

    /// Resolves the completed round: opens a new turn segment for every
    /// participant, applies every pending action in submission order,
    /// decrements the round budget, and runs the end-of-round checks.
    ///
    /// Callable exactly when `submit` returned
    /// [`SubmitOutcome::RoundComplete`].
    pub fn resolve_round(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Active || self.pending.len() != self.participants.len() {
            return Err(EngineError::RoundIncomplete);
        }

        for id in &self.participants {
            if let Some(actor) = self.actors.get_mut(id) {
                actor.timeline.begin_turn();
            }
        }

        let pending = std::mem::take(&mut self.pending);
        let grid = self.grid.as_mut().ok_or(EngineError::GridMissing)?;

        for (id, kind) in pending {
            resolve::resolve_action(id, kind, &mut self.actors, grid, self.rng.as_mut())?;
        }

        self.rounds_remaining = self.rounds_remaining.saturating_sub(1);

        if self.rounds_remaining == 0 {
            for id in &self.participants {
                if let Some(actor) = self.actors.get_mut(id) {
                    actor.timeline.record("the game is over");
                }
            }
            self.phase = Phase::Over;
            return Ok(());
        }

        for &id in &self.participants {
            sensing::surroundings_check(id, &mut self.actors, grid, &mut self.unlocked)?;
        }

        if self.unlocked {
            for id in &self.participants {
                if let Some(actor) = self.actors.get_mut(id) {
                    actor.timeline.record("the door is open. you win");
                }
            }
            self.rounds_remaining = 0;
            self.phase = Phase::Over;
        }

        Ok(())
    }

    /// Read-only projection for one connection; `None` for unknown
    /// connections.
    pub fn snapshot(&self, connection: ConnectionId) -> Option<StateSnapshot> {
        let actor_id = self.actor_id(connection)?;
        let actor = self.actors.get(&actor_id)?;

        Some(StateSnapshot {
            rounds_remaining: self.rounds_remaining,
            selected_action: self
                .pending
                .iter()
                .find(|(id, _)| *id == actor_id)
                .map(|(_, kind)| *kind),
            is_standing: actor.is_standing(),
            timeline_events: actor.timeline.segments().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::rng::PcgSource;
    use crate::state::{Facing, Fixture, ItemKind, Position};

    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId(n)
    }

    fn seeded_session(seed: u64) -> Session {
        Session::new(GameConfig::default(), Box::new(PcgSource::seeded(seed)))
    }

    fn timeline_of(session: &Session, id: ActorId) -> Vec<Vec<String>> {
        session.actor(id).unwrap().timeline.segments().to_vec()
    }

    fn has_event(segments: &[Vec<String>], needle: &str) -> bool {
        segments
            .iter()
            .any(|segment| segment.iter().any(|event| event == needle))
    }

    #[test]
    fn lobby_joins_extend_the_round_budget() {
        let mut session = seeded_session(1);
        assert_eq!(session.rounds_remaining(), 20);

        let first = session.join(conn(1), "one");
        assert!(matches!(first, JoinOutcome::Joined(_)));
        assert_eq!(session.rounds_remaining(), 20);

        session.join(conn(2), "two");
        assert_eq!(session.rounds_remaining(), 22);

        let again = session.join(conn(1), "one");
        assert!(matches!(again, JoinOutcome::AlreadyJoined(_)));
        assert_eq!(session.rounds_remaining(), 22);
    }

    #[test]
    fn start_requires_a_lobby_with_players() {
        let mut session = seeded_session(2);
        assert_eq!(session.start(), Err(EngineError::NoParticipants));

        session.join(conn(1), "solo");
        assert_eq!(session.start(), Ok(()));
        assert_eq!(session.phase(), Phase::Active);

        assert_eq!(session.start(), Err(EngineError::NotInLobby));
    }

    #[test]
    fn start_sizes_and_populates_the_grid() {
        let mut session = seeded_session(3);
        let a = session.join(conn(1), "one").actor_id();
        let b = session.join(conn(2), "two").actor_id();
        session.start().unwrap();

        let grid = session.grid().unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert!(grid.locate(a).is_some());
        assert!(grid.locate(b).is_some());

        let mut doors = 0;
        let mut keys = 0;
        for x in 0..4 {
            for y in 0..4 {
                let cell = grid.cell(Position::new(x, y)).unwrap();
                if cell.has_door() {
                    doors += 1;
                }
                keys += cell.items.len();
            }
        }
        // The key is placed on an unoccupied cell, so nobody holds it yet.
        assert_eq!(doors, 1);
        assert_eq!(keys, 1);

        // Start opened a segment and sensed for everyone.
        for id in [a, b] {
            let timeline = timeline_of(&session, id);
            assert_eq!(timeline.len(), 1);
            assert!(!timeline[0].is_empty());
        }
    }

    #[test]
    fn submissions_are_guarded() {
        let mut session = seeded_session(4);
        session.join(conn(1), "one");
        session.join(conn(2), "two");

        // Not started yet.
        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::Ignored
        );

        session.start().unwrap();

        assert_eq!(
            session.submit(conn(9), ActionKind::DoNothing),
            SubmitOutcome::Ignored
        );
        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::Recorded
        );
        assert_eq!(
            session.submit(conn(1), ActionKind::TurnLeft),
            SubmitOutcome::Ignored
        );
    }

    #[test]
    fn partial_submission_leaves_the_round_open() {
        let mut session = seeded_session(5);
        session.join(conn(1), "one");
        session.join(conn(2), "two");
        session.start().unwrap();
        let rounds_before = session.rounds_remaining();

        session.submit(conn(1), ActionKind::TurnLeft);

        assert_eq!(session.rounds_remaining(), rounds_before);
        assert_eq!(
            session.snapshot(conn(1)).unwrap().selected_action,
            Some(ActionKind::TurnLeft)
        );
        assert_eq!(session.snapshot(conn(2)).unwrap().selected_action, None);
    }

    #[test]
    fn completing_the_set_resolves_the_round() {
        let mut session = seeded_session(6);
        let a = session.join(conn(1), "one").actor_id();
        let b = session.join(conn(2), "two").actor_id();
        session.start().unwrap();
        let rounds_before = session.rounds_remaining();

        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::Recorded
        );
        assert_eq!(
            session.submit(conn(2), ActionKind::DoNothing),
            SubmitOutcome::RoundComplete
        );
        session.resolve_round().unwrap();

        assert_eq!(session.rounds_remaining(), rounds_before - 1);
        assert_eq!(session.snapshot(conn(1)).unwrap().selected_action, None);
        for id in [a, b] {
            let timeline = timeline_of(&session, id);
            assert_eq!(timeline.len(), 2);
            assert!(has_event(&timeline[1..], "you did nothing"));
        }
    }

    #[test]
    fn resolve_round_rejects_an_incomplete_set() {
        let mut session = seeded_session(6);
        session.join(conn(1), "one");
        session.join(conn(2), "two");
        session.start().unwrap();
        session.submit(conn(1), ActionKind::DoNothing);

        assert_eq!(session.resolve_round(), Err(EngineError::RoundIncomplete));
    }

    #[test]
    fn round_budget_exhaustion_ends_the_game() {
        let config = GameConfig {
            base_rounds: 1,
            ..GameConfig::default()
        };
        let mut session = Session::new(config, Box::new(PcgSource::seeded(7)));
        let solo = session.join(conn(1), "solo").actor_id();
        session.start().unwrap();

        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::RoundComplete
        );
        session.resolve_round().unwrap();

        assert_eq!(session.rounds_remaining(), 0);
        assert_eq!(session.phase(), Phase::Over);
        let timeline = timeline_of(&session, solo);
        assert!(has_event(&timeline, "the game is over"));

        // Nothing more can be submitted.
        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::Ignored
        );
    }

    /// Drops the actor into a bare 3x3 room at a chosen position and facing.
    fn rig_grid(session: &mut Session, id: ActorId, position: Position, facing: Facing) {
        let mut grid = Grid::new(3, 3);
        grid.cell_mut(position).unwrap().occupant = Some(id);
        session.grid = Some(grid);
        session.actors.get_mut(&id).unwrap().facing = facing;
    }

    #[test]
    fn sensing_a_door_with_the_key_wins_the_game() {
        let mut session = seeded_session(8);
        let solo = session.join(conn(1), "solo").actor_id();
        session.start().unwrap();

        rig_grid(&mut session, solo, Position::new(1, 1), Facing::North);
        session
            .grid
            .as_mut()
            .unwrap()
            .cell_mut(Position::new(0, 1))
            .unwrap()
            .fixture = Some(Fixture::Door);
        let actor = session.actors.get_mut(&solo).unwrap();
        if !actor.holds(ItemKind::Key) {
            actor.inventory.push(ItemKind::Key);
        }

        session.submit(conn(1), ActionKind::DoNothing);
        session.resolve_round().unwrap();

        assert!(session.is_unlocked());
        assert_eq!(session.rounds_remaining(), 0);
        assert_eq!(session.phase(), Phase::Over);
        let timeline = timeline_of(&session, solo);
        assert!(has_event(&timeline, "you opened the door"));
        assert!(has_event(&timeline, "the door is open. you win"));
    }

    #[test]
    fn reaching_into_a_door_with_the_key_wins_the_same_round() {
        let mut session = seeded_session(9);
        let solo = session.join(conn(1), "solo").actor_id();
        session.start().unwrap();

        rig_grid(&mut session, solo, Position::new(1, 1), Facing::East);
        session
            .grid
            .as_mut()
            .unwrap()
            .cell_mut(Position::new(1, 0))
            .unwrap()
            .fixture = Some(Fixture::Door);
        let actor = session.actors.get_mut(&solo).unwrap();
        if !actor.holds(ItemKind::Key) {
            actor.inventory.push(ItemKind::Key);
        }

        session.submit(conn(1), ActionKind::ReachForward);
        session.resolve_round().unwrap();

        let timeline = timeline_of(&session, solo);
        assert!(has_event(&timeline, "you opened the door"));
        assert!(session.is_unlocked());
        assert_eq!(session.phase(), Phase::Over);
    }

    #[test]
    fn reaching_into_a_door_without_the_key_just_feels_it() {
        let mut session = seeded_session(10);
        let solo = session.join(conn(1), "solo").actor_id();
        session.start().unwrap();

        rig_grid(&mut session, solo, Position::new(1, 1), Facing::East);
        session
            .grid
            .as_mut()
            .unwrap()
            .cell_mut(Position::new(1, 0))
            .unwrap()
            .fixture = Some(Fixture::Door);
        session.actors.get_mut(&solo).unwrap().inventory.clear();

        session.submit(conn(1), ActionKind::ReachForward);
        session.resolve_round().unwrap();

        let timeline = timeline_of(&session, solo);
        assert!(has_event(&timeline, "you felt a door"));
        assert!(!session.is_unlocked());
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn walking_into_a_wall_never_moves_the_actor_forward() {
        let mut session = seeded_session(11);
        let solo = session.join(conn(1), "solo").actor_id();
        session.start().unwrap();

        let origin = Position::new(0, 1);
        rig_grid(&mut session, solo, origin, Facing::North);

        session.submit(conn(1), ActionKind::MoveForward);
        session.resolve_round().unwrap();

        let timeline = timeline_of(&session, solo);
        let round = &timeline[1];
        let collisions = round
            .iter()
            .filter(|event| *event == "you collided with a wall")
            .count();
        assert_eq!(collisions, 1);

        let position = session.grid().unwrap().locate(solo).unwrap();
        if round.iter().any(|event| event == "you tripped") {
            let distance = (position.x - origin.x).abs() + (position.y - origin.y).abs();
            assert_eq!(distance, 1);
        } else {
            assert_eq!(position, origin);
        }
    }

    #[test]
    fn mutual_collision_tags_initiator_and_recipient() {
        let mut session = seeded_session(12);
        let a = session.join(conn(1), "one").actor_id();
        let b = session.join(conn(2), "two").actor_id();
        session.start().unwrap();

        let a_start = Position::new(1, 1);
        let b_start = Position::new(2, 1);
        let mut grid = Grid::new(4, 4);
        grid.cell_mut(a_start).unwrap().occupant = Some(a);
        grid.cell_mut(b_start).unwrap().occupant = Some(b);
        session.grid = Some(grid);
        session.actors.get_mut(&a).unwrap().facing = Facing::South;
        session.actors.get_mut(&b).unwrap().facing = Facing::North;

        session.submit(conn(1), ActionKind::MoveForward);
        session.submit(conn(2), ActionKind::MoveForward);
        session.resolve_round().unwrap();

        let a_timeline = timeline_of(&session, a);
        let b_timeline = timeline_of(&session, b);
        assert!(has_event(&a_timeline, "you collided with another player"));
        assert!(has_event(&b_timeline, "another player collided with you"));

        // Neither may end up in the other's starting cell unless it tripped
        // its way there.
        let grid = session.grid().unwrap();
        if grid.locate(a) == Some(b_start) {
            assert!(has_event(&a_timeline, "you tripped"));
        }
        if grid.locate(b) == Some(a_start) {
            assert!(has_event(&b_timeline, "you tripped"));
        }
    }

    #[test]
    fn late_joiners_spectate() {
        let mut session = seeded_session(13);
        session.join(conn(1), "one");
        session.start().unwrap();

        let outcome = session.join(conn(2), "late");
        assert!(matches!(outcome, JoinOutcome::Spectating(_)));

        // A spectator's submission neither counts nor stalls the round.
        assert_eq!(
            session.submit(conn(2), ActionKind::DoNothing),
            SubmitOutcome::Ignored
        );
        assert_eq!(
            session.submit(conn(1), ActionKind::DoNothing),
            SubmitOutcome::RoundComplete
        );
        session.resolve_round().unwrap();

        let snapshot = session.snapshot(conn(2)).unwrap();
        assert_eq!(snapshot.rounds_remaining, session.rounds_remaining());
        assert!(snapshot.timeline_events.is_empty());
    }

    #[test]
    fn fixed_seed_replays_identical_timelines() {
        let run = |seed: u64| {
            let mut session = Session::new(
                GameConfig::default(),
                Box::new(PcgSource::seeded(seed)),
            );
            let solo = session.join(conn(1), "solo").actor_id();
            session.start().unwrap();
            for _ in 0..6 {
                assert_eq!(
                    session.submit(conn(1), ActionKind::MoveForward),
                    SubmitOutcome::RoundComplete
                );
                session.resolve_round().unwrap();
                if session.phase() == Phase::Over {
                    break;
                }
            }
            timeline_of(&session, solo)
        };

        assert_eq!(run(99), run(99));
    }
}
