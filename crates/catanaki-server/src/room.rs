//! Game room management.
//!
//! A room wraps one `Game` together with the connections that joined it and
//! the players each connection created.

use catanaki_core::{Command, Game, GameError, GameEvent, GameId, PlayerHandle};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::GameInfo;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Not a member of this game")]
    NotMember,

    #[error("Create a player before sending commands")]
    NoPlayer,

    #[error("Cannot send commands for player `{0}`")]
    WrongSender(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Could not serialize game state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A game and everyone connected to it.
pub struct GameRoom {
    pub game: Game,
    /// Connection id to the players it created
    pub members: HashMap<Uuid, BTreeSet<String>>,
}

impl GameRoom {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            members: HashMap::new(),
        }
    }

    pub fn id(&self) -> &GameId {
        self.game.id()
    }

    pub fn join(&mut self, connection: Uuid) {
        self.members.entry(connection).or_default();
    }

    /// Drop a connection; returns true if nobody is left.
    pub fn leave(&mut self, connection: Uuid) -> bool {
        self.members.remove(&connection);
        self.members.is_empty()
    }

    pub fn is_member(&self, connection: Uuid) -> bool {
        self.members.contains_key(&connection)
    }

    pub fn create_player(&mut self, connection: Uuid, name: &str) -> Result<PlayerHandle, RoomError> {
        let owned = self.members.get_mut(&connection).ok_or(RoomError::NotMember)?;
        let player = self.game.add_player(name)?;
        owned.insert(player.name.clone());
        Ok(PlayerHandle {
            name: player.name.clone(),
            color: player.color.clone(),
        })
    }

    pub fn start(&mut self, connection: Uuid) -> Result<(), RoomError> {
        if !self.is_member(connection) {
            return Err(RoomError::NotMember);
        }
        self.game.start()?;
        Ok(())
    }

    /// Parse and apply a command sent by `connection`. The command's sender
    /// must be one of the players this connection created.
    pub fn submit(
        &mut self,
        connection: Uuid,
        command: serde_json::Value,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let owned = self.members.get(&connection).ok_or(RoomError::NotMember)?;
        if owned.is_empty() {
            return Err(RoomError::NoPlayer);
        }

        let command: Command = serde_json::from_value(command)
            .map_err(|e| RoomError::InvalidCommand(e.to_string()))?;
        if !owned.contains(command.sender()) {
            return Err(RoomError::WrongSender(command.sender().to_string()));
        }

        Ok(self.game.apply(command)?)
    }

    pub fn snapshot_json(&self) -> Result<serde_json::Value, RoomError> {
        Ok(serde_json::to_value(self.game.snapshot())?)
    }

    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.keys().copied().collect()
    }

    pub fn to_info(&self) -> GameInfo {
        GameInfo {
            id: self.id().clone(),
            players: self.game.players.iter().map(|p| p.name.clone()).collect(),
            members: self.members.len(),
            has_started: self.game.has_started,
        }
    }
}
