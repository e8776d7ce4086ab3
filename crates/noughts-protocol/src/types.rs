//! Core protocol types for the noughts wire format.
//!
//! Every type here travels on the wire. Clients send [`Inbound`] frames and
//! receive [`ServerMessage`]s; both are JSON objects discriminated by a
//! camelCase `"type"` field.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable player identity.
///
/// Opaque to the server: the client makes one up (or receives a generated one
/// from `gameCreated`), stores it, and presents it again after reconnecting.
/// `#[serde(transparent)]` keeps it a bare JSON string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps anything string-like as a `PlayerId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if the identity is empty or whitespace. Blank identities are
    /// treated the same as absent ones.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for one game (a "session" in lobby terms).
///
/// Allocated monotonically by the server; a rematch always gets a fresh one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The opposing mark.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::O => f.write_str("O"),
        }
    }
}

/// The 3×3 grid in row-major order: cell `i` is row `i / 3`, column `i % 3`.
///
/// Serializes as a plain array of nine `null | "X" | "O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Symbol>; Board::CELLS]);

impl Board {
    /// Number of cells on the board.
    pub const CELLS: usize = 9;

    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cells.
    pub fn from_cells(cells: [Option<Symbol>; Self::CELLS]) -> Self {
        Self(cells)
    }

    /// All nine cells.
    pub fn cells(&self) -> &[Option<Symbol>; Self::CELLS] {
        &self.0
    }

    /// The mark at `index`, or `None` if empty or out of range.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied().flatten()
    }

    /// `true` if `index` is on the board and nothing has been written there.
    pub fn is_open(&self, index: usize) -> bool {
        index < Self::CELLS && self.0[index].is_none()
    }

    /// Writes `symbol` into an open cell. Returns `false` (and leaves the
    /// board untouched) if the cell is occupied or off the board.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> bool {
        if !self.is_open(index) {
            return false;
        }
        self.0[index] = Some(symbol);
        true
    }

    /// `true` once no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }
}

// ---------------------------------------------------------------------------
// Game lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a game.
///
/// ```text
/// Waiting ──(second player joins)──→ Playing ──(win / draw)──→ Finished
///    ↑                                  │
///    └──────(custom: opponent leaves)───┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

impl GameStatus {
    /// `true` for any status that still ties its members to the game.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Playing => f.write_str("playing"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// How a game came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Created explicitly, joinable by id, reconnectable.
    Custom,
    /// Paired anonymously from the queue; no reconnection grace.
    Matchmaking,
}

/// The terminal result announced in `gameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl From<Symbol> for Verdict {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Self::X,
            Symbol::O => Self::O,
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// What a client asks for. The `type` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateGame,
    JoinGame,
    RequestMatchmaking,
    CancelMatchmaking,
    /// `index` is signed so that `-1` reaches the game as a bad move
    /// rather than failing to parse.
    MakeMove {
        index: i64,
    },
    LeaveGame,
    RematchRequest,
    RequestLobby,
}

/// One inbound frame: the message plus the identity fields any frame may carry.
///
/// ```json
/// { "type": "joinGame", "gameId": 3, "playerId": "player_1a2b3c4d" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(flatten)]
    pub message: ClientMessage,
}

impl Inbound {
    /// A frame with no identity fields.
    pub fn bare(message: ClientMessage) -> Self {
        Self {
            player_id: None,
            game_id: None,
            message,
        }
    }

    /// Attaches a player identity.
    pub fn with_player(mut self, player_id: PlayerId) -> Self {
        self.player_id = Some(player_id);
        self
    }

    /// Attaches a game id.
    pub fn with_game(mut self, game_id: GameId) -> Self {
        self.game_id = Some(game_id);
        self
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A full seat snapshot: everything a client needs to (re)draw its game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub game_id: GameId,
    /// The recipient's own identity.
    pub player_id: PlayerId,
    /// The recipient's own mark.
    pub symbol: Symbol,
    pub board: Board,
    pub turn: Symbol,
    pub status: GameStatus,
}

/// A joinable custom game as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEntry {
    pub game_id: GameId,
    pub creator_id: PlayerId,
    pub player_count: usize,
}

/// Category of a refused request, so clients can react per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    MalformedMessage,
    MissingIdentity,
    SessionNotFound,
    SessionFull,
    InvalidState,
    InvalidMove,
    AlreadyQueuedOrInGame,
    NotQueued,
    RematchNotPossible,
}

/// Everything the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // -- Full state sync --
    GameCreated(Seat),
    GameJoined(Seat),
    OpponentJoined(Seat),
    Reconnected(Seat),
    MatchFound(Seat),
    RematchAccepted(Seat),

    // -- Play --
    /// Board after a non-terminal move.
    GameState {
        board: Board,
        turn: Symbol,
        status: GameStatus,
    },
    GameOver {
        board: Board,
        winner: Verdict,
    },

    // -- Membership --
    OpponentDisconnected {
        symbol: Symbol,
    },
    OpponentReconnected {
        symbol: Symbol,
    },
    OpponentLeft {
        message: String,
    },
    GameLeft {
        message: String,
    },

    // -- Queue and negotiation --
    MatchmakingQueued {
        message: String,
    },
    MatchmakingCancelled {
        message: String,
    },
    RematchOffered {
        from_player_id: PlayerId,
        message: String,
    },

    // -- Lobby --
    LobbyUpdate {
        games: Vec<LobbyEntry>,
    },

    Error {
        kind: ErrorKind,
        message: String,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! JSON shape tests. A mismatch here means the browser client can't
    //! parse what we send, so these pin the exact field names.

    use super::*;
    use serde_json::json;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    // =====================================================================
    // Identity and board
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&pid("player_ab12")).unwrap();
        assert_eq!(json, "\"player_ab12\"");
    }

    #[test]
    fn test_player_id_blank_detection() {
        assert!(pid("").is_blank());
        assert!(pid("   ").is_blank());
        assert!(!pid("a").is_blank());
    }

    #[test]
    fn test_game_id_serializes_as_plain_number_and_displays_prefixed() {
        assert_eq!(serde_json::to_string(&GameId(7)).unwrap(), "7");
        assert_eq!(GameId(7).to_string(), "game-7");
    }

    #[test]
    fn test_symbol_other_flips() {
        assert_eq!(Symbol::X.other(), Symbol::O);
        assert_eq!(Symbol::O.other(), Symbol::X);
    }

    #[test]
    fn test_board_serializes_as_nine_cells() {
        let mut board = Board::new();
        board.place(0, Symbol::X);
        board.place(4, Symbol::O);
        let value = serde_json::to_value(board).unwrap();
        assert_eq!(
            value,
            json!(["X", null, null, null, "O", null, null, null, null])
        );
    }

    #[test]
    fn test_board_place_refuses_occupied_and_out_of_range() {
        let mut board = Board::new();
        assert!(board.place(3, Symbol::X));
        assert!(!board.place(3, Symbol::O));
        assert_eq!(board.get(3), Some(Symbol::X));
        assert!(!board.place(9, Symbol::O));
        assert_eq!(board.get(9), None);
    }

    #[test]
    fn test_board_is_full() {
        let mut board = Board::new();
        assert!(!board.is_full());
        for i in 0..Board::CELLS {
            board.place(i, if i % 2 == 0 { Symbol::X } else { Symbol::O });
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_status_and_kind_are_lowercase() {
        assert_eq!(
            serde_json::to_value(GameStatus::Playing).unwrap(),
            json!("playing")
        );
        assert_eq!(
            serde_json::to_value(GameKind::Matchmaking).unwrap(),
            json!("matchmaking")
        );
        assert!(GameStatus::Waiting.is_active());
        assert!(!GameStatus::Finished.is_active());
    }

    #[test]
    fn test_verdict_draw_is_lowercase() {
        assert_eq!(serde_json::to_value(Verdict::Draw).unwrap(), json!("draw"));
        assert_eq!(serde_json::to_value(Verdict::X).unwrap(), json!("X"));
        assert_eq!(Verdict::from(Symbol::O), Verdict::O);
    }

    // =====================================================================
    // Inbound
    // =====================================================================

    #[test]
    fn test_inbound_join_game_carries_identity() {
        let inbound: Inbound = serde_json::from_value(json!({
            "type": "joinGame",
            "gameId": 3,
            "playerId": "p1",
        }))
        .unwrap();
        assert_eq!(inbound.message, ClientMessage::JoinGame);
        assert_eq!(inbound.game_id, Some(GameId(3)));
        assert_eq!(inbound.player_id, Some(pid("p1")));
    }

    #[test]
    fn test_inbound_make_move_without_identity() {
        let inbound: Inbound =
            serde_json::from_value(json!({ "type": "makeMove", "index": 8 }))
                .unwrap();
        assert_eq!(inbound.message, ClientMessage::MakeMove { index: 8 });
        assert_eq!(inbound.game_id, None);
    }

    #[test]
    fn test_inbound_make_move_negative_index_still_parses() {
        let inbound: Inbound =
            serde_json::from_value(json!({ "type": "makeMove", "index": -1 }))
                .unwrap();
        assert_eq!(inbound.message, ClientMessage::MakeMove { index: -1 });
    }

    #[test]
    fn test_inbound_make_move_missing_index_is_rejected() {
        let result: Result<Inbound, _> =
            serde_json::from_value(json!({ "type": "makeMove" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_inbound_null_player_id_is_absent() {
        let inbound: Inbound = serde_json::from_value(json!({
            "type": "createGame",
            "playerId": null,
        }))
        .unwrap();
        assert_eq!(inbound.message, ClientMessage::CreateGame);
        assert_eq!(inbound.player_id, None);
    }

    #[test]
    fn test_inbound_unknown_type_is_rejected() {
        let result: Result<Inbound, _> =
            serde_json::from_value(json!({ "type": "flyToMoon" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_inbound_missing_type_is_rejected() {
        let result: Result<Inbound, _> =
            serde_json::from_value(json!({ "playerId": "p1" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_inbound_builder_serializes_flat() {
        let inbound = Inbound::bare(ClientMessage::RematchRequest)
            .with_player(pid("p1"))
            .with_game(GameId(5));
        let value = serde_json::to_value(&inbound).unwrap();
        assert_eq!(
            value,
            json!({ "type": "rematchRequest", "playerId": "p1", "gameId": 5 })
        );
    }

    // =====================================================================
    // Outbound
    // =====================================================================

    #[test]
    fn test_seat_messages_are_flat_and_camel_case() {
        let msg = ServerMessage::MatchFound(Seat {
            game_id: GameId(2),
            player_id: pid("p1"),
            symbol: Symbol::O,
            board: Board::new(),
            turn: Symbol::X,
            status: GameStatus::Playing,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "matchFound");
        assert_eq!(value["gameId"], 2);
        assert_eq!(value["playerId"], "p1");
        assert_eq!(value["symbol"], "O");
        assert_eq!(value["turn"], "X");
        assert_eq!(value["status"], "playing");
        assert_eq!(value["board"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_game_over_json_format() {
        let msg = ServerMessage::GameOver {
            board: Board::new(),
            winner: Verdict::Draw,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "gameOver");
        assert_eq!(value["winner"], "draw");
    }

    #[test]
    fn test_rematch_offered_field_names() {
        let msg = ServerMessage::RematchOffered {
            from_player_id: pid("p2"),
            message: "again?".into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "rematchOffered");
        assert_eq!(value["fromPlayerId"], "p2");
    }

    #[test]
    fn test_lobby_update_json_format() {
        let msg = ServerMessage::LobbyUpdate {
            games: vec![LobbyEntry {
                game_id: GameId(1),
                creator_id: pid("host"),
                player_count: 1,
            }],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "lobbyUpdate");
        assert_eq!(
            value["games"],
            json!([{ "gameId": 1, "creatorId": "host", "playerCount": 1 }])
        );
    }

    #[test]
    fn test_error_kind_is_camel_case() {
        let msg = ServerMessage::Error {
            kind: ErrorKind::AlreadyQueuedOrInGame,
            message: "busy".into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["kind"], "alreadyQueuedOrInGame");
    }

    #[test]
    fn test_server_message_decodes_back() {
        // Integration tests read server frames back into `ServerMessage`.
        let msg = ServerMessage::OpponentDisconnected { symbol: Symbol::X };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }
}
