//! In-process lobby: create games, add players, start, submit commands and
//! read snapshots by game id.

use crate::actions::Command;
use crate::board::BoardLayout;
use crate::game::{Game, GameError, GameId};
use crate::rng::{RandomSource, RngSource};
use crate::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// What a client learns about the player it just created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHandle {
    pub name: String,
    pub color: String,
}

/// Owns every game hosted in this process
pub struct GameRegistry {
    games: HashMap<GameId, Game>,
    layout: BoardLayout,
    /// Seeds each new game's own generator
    seeds: Box<dyn RandomSource>,
}

impl GameRegistry {
    pub fn new(layout: BoardLayout) -> Self {
        Self::with_source(layout, Box::new(RngSource::from_entropy()))
    }

    /// Registry whose games are all derived from `seeds`
    pub fn with_source(layout: BoardLayout, seeds: Box<dyn RandomSource>) -> Self {
        Self {
            games: HashMap::new(),
            layout,
            seeds,
        }
    }

    pub fn create_game(&mut self) -> GameId {
        loop {
            let seed = self.seeds.next_u64();
            let game = Game::new(&self.layout, Box::new(RngSource::seeded(seed)));
            let id = game.id().clone();
            if !self.games.contains_key(&id) {
                info!(game = %id, "game created");
                self.games.insert(id.clone(), game);
                return id;
            }
        }
    }

    pub fn create_player(&mut self, id: &GameId, name: &str) -> Result<PlayerHandle, GameError> {
        let player = self.game_mut(id)?.add_player(name)?;
        Ok(PlayerHandle {
            name: player.name.clone(),
            color: player.color.clone(),
        })
    }

    pub fn start_game(&mut self, id: &GameId) -> Result<(), GameError> {
        self.game_mut(id)?.start()
    }

    /// Run a command against a game; false if the game is unknown or the
    /// command was rejected.
    pub fn submit_command(&mut self, id: &GameId, command: Command) -> bool {
        match self.games.get_mut(id) {
            Some(game) => game.handle_command(command),
            None => false,
        }
    }

    pub fn snapshot(&self, id: &GameId) -> Option<GameSnapshot> {
        self.games.get(id).map(Game::snapshot)
    }

    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.get(id)
    }

    fn game_mut(&mut self, id: &GameId) -> Result<&mut Game, GameError> {
        self.games
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownGame(id.clone()))
    }

    pub fn remove_game(&mut self, id: &GameId) -> Option<Game> {
        self.games.remove(id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new(BoardLayout::standard())
    }
}
