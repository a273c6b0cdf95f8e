//! WebSocket protocol messages for Catanaki multiplayer.

use catanaki_core::{GameId, PlayerHandle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new game and join it
    CreateGame,

    /// Join an existing game as a member (watcher until a player is created)
    JoinGame { game_id: GameId },

    /// Add a player to the joined game
    CreatePlayer { name: String },

    /// Start the joined game
    StartGame,

    /// Submit a game command (`{"type": "build", "sender": ..., ...}`)
    GameCommand { command: serde_json::Value },

    /// Ask for the current game state
    GetSnapshot,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the connection's id
    Welcome { connection_id: Uuid },

    /// Game created successfully
    GameCreated { game_id: GameId },

    /// Joined game successfully
    JoinedGame { game: GameInfo },

    /// A player was added for this connection
    PlayerCreated { player: PlayerHandle },

    /// Game state updated
    GameUpdate { state: serde_json::Value },

    /// Outcome of a game command
    CommandResult {
        success: bool,
        events: Vec<serde_json::Value>,
        error: Option<String>,
    },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Game information for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    pub players: Vec<String>,
    pub members: usize,
    pub has_started: bool,
}
