//! The game record: board, seats, lifecycle and rematch offers.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use noughts_protocol::{Board, GameId, GameKind, GameStatus, PlayerId, Seat, Symbol};
use noughts_transport::ConnectionId;

use crate::GameError;
use crate::outcome::{Outcome, evaluate};

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One player's seat in one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub player_id: PlayerId,

    /// Assigned once per game, never changed.
    pub symbol: Symbol,

    /// The connection currently playing this seat. `None` while the player
    /// is disconnected.
    pub connection: Option<ConnectionId>,
}

impl Participant {
    pub fn new(player_id: PlayerId, symbol: Symbol, connection: Option<ConnectionId>) -> Self {
        Self {
            player_id,
            symbol,
            connection,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A single two-player game.
///
/// Holds at most two participants with distinct symbols. Cells are written
/// once and never cleared; a rematch replaces the whole game.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    kind: GameKind,
    status: GameStatus,
    board: Board,
    turn: Symbol,
    members: Vec<Participant>,
    rematch_offers: HashSet<PlayerId>,
    last_activity: Instant,
    creator_id: PlayerId,
}

impl Game {
    /// Maximum number of seats.
    pub const SEATS: usize = 2;

    /// A custom game waiting for its second player.
    pub fn open(id: GameId, creator: Participant, now: Instant) -> Self {
        Self {
            id,
            kind: GameKind::Custom,
            status: GameStatus::Waiting,
            board: Board::new(),
            turn: Symbol::X,
            creator_id: creator.player_id.clone(),
            members: vec![creator],
            rematch_offers: HashSet::new(),
            last_activity: now,
        }
    }

    /// A game that starts in play with both seats filled. The X player is
    /// recorded as creator.
    pub fn paired(
        id: GameId,
        kind: GameKind,
        x: Participant,
        o: Participant,
        turn: Symbol,
        now: Instant,
    ) -> Self {
        Self {
            id,
            kind,
            status: GameStatus::Playing,
            board: Board::new(),
            turn,
            creator_id: x.player_id.clone(),
            members: vec![x, o],
            rematch_offers: HashSet::new(),
            last_activity: now,
        }
    }

    // -- Accessors --

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Symbol {
        self.turn
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn creator_id(&self) -> &PlayerId {
        &self.creator_id
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn member(&self, player_id: &PlayerId) -> Option<&Participant> {
        self.members.iter().find(|m| &m.player_id == player_id)
    }

    /// The other participant, if there is one.
    pub fn opponent_of(&self, player_id: &PlayerId) -> Option<&Participant> {
        self.members.iter().find(|m| &m.player_id != player_id)
    }

    pub fn has_offered_rematch(&self, player_id: &PlayerId) -> bool {
        self.rematch_offers.contains(player_id)
    }

    /// Idle time as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn all_disconnected(&self) -> bool {
        self.members.iter().all(|m| !m.is_connected())
    }

    /// Live connections of all members.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().filter_map(|m| m.connection)
    }

    /// Full state snapshot as seen by `member`.
    pub fn seat(&self, member: &Participant) -> Seat {
        Seat {
            game_id: self.id,
            player_id: member.player_id.clone(),
            symbol: member.symbol,
            board: self.board,
            turn: self.turn,
            status: self.status,
        }
    }

    /// Snapshot for the member with this identity.
    pub fn seat_for(&self, player_id: &PlayerId) -> Option<Seat> {
        self.member(player_id).map(|m| self.seat(m))
    }

    /// `true` if the lobby should list this game as of `now`.
    pub fn is_joinable(&self, now: Instant, freshness: Duration) -> bool {
        self.kind == GameKind::Custom
            && self.status == GameStatus::Waiting
            && self.members.len() == 1
            && self.idle_for(now) < freshness
    }

    // -- Mutations --

    /// Seats a second player in a waiting game and starts play. The newcomer
    /// gets whichever symbol the remaining member doesn't hold.
    pub(crate) fn seat_second(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
        now: Instant,
    ) -> Symbol {
        let symbol = self
            .members
            .first()
            .map_or(Symbol::O, |remaining| remaining.symbol.other());
        self.members
            .push(Participant::new(player_id, symbol, Some(connection)));
        self.status = GameStatus::Playing;
        self.last_activity = now;
        symbol
    }

    /// Points an existing member's seat at a new connection.
    pub(crate) fn reconnect(
        &mut self,
        player_id: &PlayerId,
        connection: ConnectionId,
        now: Instant,
    ) -> Option<Symbol> {
        let member = self.members.iter_mut().find(|m| &m.player_id == player_id)?;
        member.connection = Some(connection);
        let symbol = member.symbol;
        self.last_activity = now;
        Some(symbol)
    }

    /// Marks every seat held by `connection` as disconnected and returns the
    /// symbols of those seats.
    pub(crate) fn disconnect(&mut self, connection: ConnectionId) -> Vec<Symbol> {
        let mut dropped = Vec::new();
        for member in &mut self.members {
            if member.connection == Some(connection) {
                member.connection = None;
                dropped.push(member.symbol);
            }
        }
        dropped
    }

    /// Removes a member and any rematch offer it made.
    pub(crate) fn remove_member(&mut self, player_id: &PlayerId) -> Option<Participant> {
        let index = self.members.iter().position(|m| &m.player_id == player_id)?;
        self.rematch_offers.remove(player_id);
        Some(self.members.remove(index))
    }

    /// Sends a custom game back to the lobby after an opponent left mid-play.
    /// Finished games stay finished.
    pub(crate) fn reopen(&mut self, now: Instant) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Waiting;
        }
        self.last_activity = now;
    }

    /// Records a rematch offer. Returns `true` once every member has offered.
    pub(crate) fn offer_rematch(&mut self, player_id: PlayerId, now: Instant) -> bool {
        self.rematch_offers.insert(player_id);
        self.last_activity = now;
        self.members
            .iter()
            .all(|m| self.rematch_offers.contains(&m.player_id))
    }

    /// Validates and applies a move for `player_id`, then evaluates the
    /// board. On error nothing changes.
    pub(crate) fn apply_move(
        &mut self,
        player_id: &PlayerId,
        cell: usize,
        now: Instant,
    ) -> Result<Outcome, GameError> {
        let symbol = match self.member(player_id) {
            Some(member) if member.is_connected() => member.symbol,
            _ => {
                return Err(GameError::InvalidMove(format!(
                    "{player_id} is not an active player in {}",
                    self.id
                )));
            }
        };
        if self.status != GameStatus::Playing {
            return Err(GameError::InvalidMove(format!(
                "{} is {}, not playing",
                self.id, self.status
            )));
        }
        if self.turn != symbol {
            return Err(GameError::InvalidMove(format!("it is {}'s turn", self.turn)));
        }
        if !self.board.place(cell, symbol) {
            return Err(GameError::InvalidMove(format!("cell {cell} is taken")));
        }

        self.turn = symbol.other();
        self.last_activity = now;

        let outcome = evaluate(&self.board);
        if outcome.is_terminal() {
            self.status = GameStatus::Finished;
        }
        Ok(outcome)
    }
}

/// Converts a raw wire index into a board cell.
pub fn cell_index(index: i64) -> Result<usize, GameError> {
    usize::try_from(index)
        .ok()
        .filter(|cell| *cell < Board::CELLS)
        .ok_or_else(|| GameError::InvalidMove(format!("cell {index} is out of range")))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn playing() -> Game {
        Game::paired(
            GameId(1),
            GameKind::Custom,
            Participant::new(pid("x"), Symbol::X, Some(conn(1))),
            Participant::new(pid("o"), Symbol::O, Some(conn(2))),
            Symbol::X,
            Instant::now(),
        )
    }

    #[test]
    fn test_cell_index_bounds() {
        assert_eq!(cell_index(0).unwrap(), 0);
        assert_eq!(cell_index(8).unwrap(), 8);
        assert!(matches!(cell_index(9), Err(GameError::InvalidMove(_))));
        assert!(matches!(cell_index(-1), Err(GameError::InvalidMove(_))));
    }

    #[test]
    fn test_apply_move_alternates_turn() {
        let mut game = playing();
        let now = Instant::now();

        assert_eq!(game.apply_move(&pid("x"), 4, now).unwrap(), Outcome::Pending);
        assert_eq!(game.turn(), Symbol::O);
        assert_eq!(game.apply_move(&pid("o"), 0, now).unwrap(), Outcome::Pending);
        assert_eq!(game.turn(), Symbol::X);
    }

    #[test]
    fn test_apply_move_rejections_leave_state_unchanged() {
        let mut game = playing();
        let now = Instant::now();
        game.apply_move(&pid("x"), 4, now).unwrap();
        let before = *game.board();

        // Wrong turn.
        assert!(game.apply_move(&pid("x"), 0, now).is_err());
        // Occupied cell.
        assert!(game.apply_move(&pid("o"), 4, now).is_err());
        // Not a member.
        assert!(game.apply_move(&pid("z"), 0, now).is_err());

        assert_eq!(*game.board(), before);
        assert_eq!(game.turn(), Symbol::O);
    }

    #[test]
    fn test_apply_move_rejects_disconnected_member() {
        let mut game = playing();
        game.disconnect(conn(1));
        assert!(matches!(
            game.apply_move(&pid("x"), 0, Instant::now()),
            Err(GameError::InvalidMove(_))
        ));
    }

    #[test]
    fn test_disconnect_only_matches_that_connection() {
        let mut game = playing();
        assert!(game.disconnect(conn(99)).is_empty());
        assert_eq!(game.disconnect(conn(2)), vec![Symbol::O]);
        assert!(game.member(&pid("x")).unwrap().is_connected());
        assert!(!game.member(&pid("o")).unwrap().is_connected());
    }

    #[test]
    fn test_seat_second_takes_complement_symbol() {
        let now = Instant::now();
        let mut game = playing();
        game.remove_member(&pid("x"));
        game.reopen(now);
        assert_eq!(game.status(), GameStatus::Waiting);

        let symbol = game.seat_second(pid("new"), conn(3), now);
        assert_eq!(symbol, Symbol::X);
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_offer_rematch_needs_every_member() {
        let mut game = playing();
        let now = Instant::now();
        assert!(!game.offer_rematch(pid("x"), now));
        assert!(game.has_offered_rematch(&pid("x")));
        assert!(game.offer_rematch(pid("o"), now));
    }

    #[test]
    fn test_remove_member_forgets_offer() {
        let mut game = playing();
        game.offer_rematch(pid("x"), Instant::now());
        game.remove_member(&pid("x"));
        assert!(!game.has_offered_rematch(&pid("x")));
        assert_eq!(game.members().len(), 1);
    }
}
