//! Core game state machine.
//!
//! This module contains the main `Game` struct and all rule enforcement:
//! the snake-order initial placement, normal turns, the robber flow after a
//! 7 and the win check. Every handler validates fully before it mutates, so
//! a rejected command leaves the game untouched.

use crate::actions::{Command, GameEvent};
use crate::board::{Board, BoardLayout, Buildable, EdgeId, Terrain, VertexId};
use crate::hex::TileCoord;
use crate::player::{BuildingType, Player, ResourceHand};
use crate::rng::{random_color, random_id, RandomSource, RngSource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Victory points needed to win
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Road length a player has to beat to take the bonus
pub const LONGEST_ROAD_START: u32 = 4;

/// Victory points for holding the longest road
pub const LONGEST_ROAD_BONUS: u32 = 2;

/// Hands larger than this lose half on a 7
pub const DISCARD_THRESHOLD: u32 = 7;

const GAME_ID_LEN: usize = 8;

/// Identifier of a game, a short base-36 string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Setup: the current player places a free settlement
    InitialPlacementSettlement,
    /// Setup: the current player places a free road next to it
    InitialPlacementRoad,
    /// Build, upgrade or roll
    Normal,
    /// A 7 was rolled and some players owe cards
    DiscardResources,
    /// The roller must move the robber
    Robber,
    /// The roller must pick whom to steal from
    RobberSteal,
}

/// Errors that can occur when applying commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid placement location")]
    InvalidLocation,

    #[error("Location is already occupied")]
    Occupied,

    #[error("Not connected to your roads or buildings")]
    NotConnected,

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("Invalid discard: expected {expected} cards, got {got}")]
    InvalidDiscard { expected: u32, got: u32 },

    #[error("Invalid steal target")]
    InvalidStealTarget,

    #[error("Unknown player `{0}`")]
    UnknownPlayer(String),

    #[error("Player name `{0}` is already taken")]
    NameTaken(String),

    #[error("Unknown game `{0}`")]
    UnknownGame(GameId),

    #[error("Game has not started")]
    NotStarted,

    #[error("Game has already started")]
    AlreadyStarted,

    #[error("Cannot start a game without players")]
    NoPlayers,

    #[error("Game is over")]
    GameOver,
}

/// The complete game state
pub struct Game {
    id: GameId,
    /// The game board
    pub board: Board,
    /// Players in turn order (reversed during the second setup round)
    pub players: Vec<Player>,
    /// Index into `players`
    pub current_player: usize,
    pub phase: GamePhase,
    /// Setup placements plus one per roll
    pub turn: u32,
    /// Last dice total, 0 before the first roll
    pub roll: u8,
    pub has_started: bool,
    pub winner: Option<String>,
    /// Length the next longest road has to beat
    pub longest_road: u32,
    pub longest_road_player: Option<String>,
    /// Players owing cards after a 7, with the amount owed
    pub waiting_for_discard: BTreeMap<String, u32>,
    /// Settlement the setup road has to touch
    setup_settlement: Option<VertexId>,
    rng: Box<dyn RandomSource>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("players", &self.players)
            .field("current_player", &self.current_player)
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Create a game on a freshly generated board. The game keeps `rng` for
    /// dice, colors and robbery.
    pub fn new(layout: &BoardLayout, mut rng: Box<dyn RandomSource>) -> Self {
        let id = GameId(random_id(rng.as_mut(), GAME_ID_LEN));
        let board = Board::generate(layout, rng.as_mut());

        Self {
            id,
            board,
            players: Vec::new(),
            current_player: 0,
            phase: GamePhase::InitialPlacementSettlement,
            turn: 0,
            roll: 0,
            has_started: false,
            winner: None,
            longest_road: LONGEST_ROAD_START,
            longest_road_player: None,
            waiting_for_discard: BTreeMap::new(),
            setup_settlement: None,
            rng,
        }
    }

    /// Deterministic game, handy for replays
    pub fn seeded(layout: &BoardLayout, seed: u64) -> Self {
        Self::new(layout, Box::new(RngSource::seeded(seed)))
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn current(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Score plus the longest road bonus
    pub fn victory_points(&self, player: &Player) -> u32 {
        player.victory_points(self.longest_road_player.as_deref() == Some(player.name.as_str()))
    }

    // ==================== Lobby ====================

    /// Join a player before the game starts; names must be unique.
    pub fn add_player(&mut self, name: &str) -> Result<&Player, GameError> {
        if self.has_started {
            return Err(GameError::AlreadyStarted);
        }
        if self.player(name).is_some() {
            return Err(GameError::NameTaken(name.to_string()));
        }

        let color = random_color(self.rng.as_mut());
        debug!(game = %self.id, player = name, %color, "player joined");
        self.players.push(Player::new(name, color));
        Ok(&self.players[self.players.len() - 1])
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        if self.has_started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        self.has_started = true;
        info!(game = %self.id, players = self.players.len(), "game started");
        Ok(())
    }

    // ==================== Commands ====================

    /// Apply a command, returning what happened or why it was refused.
    pub fn apply(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
        if !self.has_started {
            return Err(GameError::NotStarted);
        }
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }

        match (self.phase, command) {
            (GamePhase::InitialPlacementSettlement, Command::Build { sender, location }) => {
                self.place_initial_settlement(&sender, &location)
            }
            (GamePhase::InitialPlacementRoad, Command::BuildRoad { sender, edge }) => {
                self.place_initial_road(&sender, &edge)
            }
            (GamePhase::Normal, Command::Build { sender, location }) => {
                self.build_settlement(&sender, &location)
            }
            (GamePhase::Normal, Command::BuildRoad { sender, edge }) => {
                self.build_road(&sender, &edge)
            }
            (GamePhase::Normal, Command::Upgrade { sender, location }) => {
                self.upgrade(&sender, &location)
            }
            (GamePhase::Normal, Command::RollDice { sender }) => self.roll_dice(&sender),
            (GamePhase::DiscardResources, Command::Discard { sender, resources }) => {
                self.discard(&sender, &resources)
            }
            (GamePhase::Robber, Command::Robber { sender, location }) => {
                self.move_robber(&sender, &location)
            }
            (GamePhase::RobberSteal, Command::RobberSteal { sender, location }) => {
                self.steal(&sender, &location)
            }
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Apply a command and report only whether it was accepted.
    pub fn handle_command(&mut self, command: Command) -> bool {
        let description = command.to_string();
        match self.apply(command) {
            Ok(events) => {
                debug!(game = %self.id, command = %description, events = events.len(), "command applied");
                true
            }
            Err(err) => {
                warn!(game = %self.id, command = %description, phase = ?self.phase, %err, "command rejected");
                false
            }
        }
    }

    fn ensure_current(&self, sender: &str) -> Result<usize, GameError> {
        match self.players.get(self.current_player) {
            Some(player) if player.name == sender => Ok(self.current_player),
            _ => Err(GameError::NotYourTurn),
        }
    }

    fn player_index(&self, name: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))
    }

    fn vertex(&self, key: &str) -> Result<VertexId, GameError> {
        self.board
            .vertex_by_key(key)
            .ok_or(GameError::InvalidLocation)
    }

    fn edge(&self, key: &str) -> Result<EdgeId, GameError> {
        self.board.edge_by_key(key).ok_or(GameError::InvalidLocation)
    }

    /// Whether the second setup round is underway
    fn second_setup_round(&self) -> bool {
        let n = self.players.len() as u32;
        n > 1 && self.turn >= n && self.turn < 2 * n
    }

    // ==================== Setup Phase ====================

    fn place_initial_settlement(
        &mut self,
        sender: &str,
        location: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(sender)?;
        let vertex = self.vertex(location)?;
        let spot = self.board.vertex(vertex);
        if spot.building.is_some() {
            return Err(GameError::Occupied);
        }
        if spot.buildable != Buildable::Yes {
            return Err(GameError::InvalidLocation);
        }
        let key = spot.key.clone();

        let settlement = self.players[index]
            .place_free(BuildingType::Settlement, &key)
            .ok_or(GameError::NoPiecesRemaining)?;
        self.board.place_building(vertex, settlement);
        self.board.restrict_adjacent(vertex);
        self.setup_settlement = Some(vertex);
        self.phase = GamePhase::InitialPlacementRoad;

        let mut events = vec![GameEvent::SettlementBuilt {
            player: sender.to_string(),
            location: key,
        }];

        if self.second_setup_round() {
            let mut distributions = Vec::new();
            for material in self.board.materials_around(vertex) {
                self.players[index].resources.add(material, 1);
                distributions.push((sender.to_string(), material, 1));
            }
            if !distributions.is_empty() {
                events.push(GameEvent::ResourcesDistributed { distributions });
            }
        }

        debug!(game = %self.id, player = sender, turn = self.turn, "initial settlement placed");
        Ok(events)
    }

    fn place_initial_road(&mut self, sender: &str, edge: &str) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(sender)?;
        let edge = self.edge(edge)?;
        let settlement = self.setup_settlement.ok_or(GameError::InvalidPhase)?;
        let slot = self.board.edge(edge);
        if slot.road.is_some() {
            return Err(GameError::Occupied);
        }
        if !slot.ends.contains(&settlement) {
            return Err(GameError::NotConnected);
        }
        let key = slot.key.clone();

        let road = self.players[index]
            .place_free(BuildingType::Road, &key)
            .ok_or(GameError::NoPiecesRemaining)?;
        self.board.place_road(edge, road);
        self.setup_settlement = None;
        self.phase = GamePhase::InitialPlacementSettlement;

        let mut events = vec![GameEvent::RoadBuilt {
            player: sender.to_string(),
            location: key,
        }];
        events.extend(self.advance_setup_turn());
        Ok(events)
    }

    /// Snake order: forward, then backward, then normal play starts with the
    /// first player rolling.
    fn advance_setup_turn(&mut self) -> Vec<GameEvent> {
        self.turn += 1;
        let n = self.players.len() as u32;

        if self.turn == 2 * n {
            self.players.reverse();
            self.current_player = 0;
            return self.finish_initial_placement();
        }

        if self.turn == n {
            self.players.reverse();
            self.current_player = 0;
        } else {
            self.current_player = (self.current_player + 1) % self.players.len();
        }
        vec![self.turn_advanced()]
    }

    fn finish_initial_placement(&mut self) -> Vec<GameEvent> {
        self.phase = GamePhase::Normal;
        self.board.invalidate();
        info!(game = %self.id, "initial placement finished");

        let mut events = vec![GameEvent::InitialPlacementFinished, self.turn_advanced()];
        events.extend(self.roll_for_current());
        events
    }

    // ==================== Normal Turn ====================

    fn build_settlement(&mut self, sender: &str, location: &str) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(sender)?;
        let vertex = self.vertex(location)?;
        let spot = self.board.vertex(vertex);
        if spot.building.is_some() {
            return Err(GameError::Occupied);
        }
        if spot.buildable == Buildable::Never {
            return Err(GameError::InvalidLocation);
        }
        if !spot.player_roads.contains(sender) {
            return Err(GameError::NotConnected);
        }
        let key = spot.key.clone();
        self.check_can_build(index, BuildingType::Settlement)?;

        let settlement = self.players[index]
            .build(BuildingType::Settlement, &key)
            .ok_or(GameError::CannotAfford)?;
        self.board.place_building(vertex, settlement);
        self.board.restrict_adjacent(vertex);
        info!(game = %self.id, player = sender, location = %key, "settlement built");

        let mut events = vec![GameEvent::SettlementBuilt {
            player: sender.to_string(),
            location: key,
        }];
        events.extend(self.check_winner());
        Ok(events)
    }

    fn build_road(&mut self, sender: &str, edge: &str) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(sender)?;
        let edge = self.edge(edge)?;
        if self.board.edge(edge).road.is_some() {
            return Err(GameError::Occupied);
        }
        if !self.board.road_connects(edge, sender) {
            return Err(GameError::NotConnected);
        }
        let key = self.board.edge(edge).key.clone();
        self.check_can_build(index, BuildingType::Road)?;

        let road = self.players[index]
            .build(BuildingType::Road, &key)
            .ok_or(GameError::CannotAfford)?;
        self.board.place_road(edge, road);
        info!(game = %self.id, player = sender, location = %key, "road built");

        let mut events = vec![GameEvent::RoadBuilt {
            player: sender.to_string(),
            location: key,
        }];
        events.extend(self.update_longest_road(index));
        events.extend(self.check_winner());
        Ok(events)
    }

    fn upgrade(&mut self, sender: &str, location: &str) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(sender)?;
        let vertex = self.vertex(location)?;
        let spot = self.board.vertex(vertex);
        match &spot.building {
            Some(b) if b.kind == BuildingType::Settlement && b.owner == sender => {}
            _ => return Err(GameError::InvalidLocation),
        }
        let key = spot.key.clone();
        self.check_can_build(index, BuildingType::City)?;

        let city = self.players[index]
            .upgrade(&key)
            .ok_or(GameError::InvalidLocation)?;
        self.board.place_building(vertex, city);
        self.board.restrict_adjacent(vertex);
        info!(game = %self.id, player = sender, location = %key, "city built");

        let mut events = vec![GameEvent::CityBuilt {
            player: sender.to_string(),
            location: key,
        }];
        events.extend(self.check_winner());
        Ok(events)
    }

    fn check_can_build(&self, index: usize, kind: BuildingType) -> Result<(), GameError> {
        let player = &self.players[index];
        if !player.has_piece(kind) {
            return Err(GameError::NoPiecesRemaining);
        }
        if !player.can_afford(kind) {
            return Err(GameError::CannotAfford);
        }
        Ok(())
    }

    fn roll_dice(&mut self, sender: &str) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(sender)?;
        Ok(self.roll_for_current())
    }

    /// Roll for the current player, who has already been validated.
    fn roll_for_current(&mut self) -> Vec<GameEvent> {
        let roll = self.rng.roll_dice();
        let player = self
            .current()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.roll = roll;
        self.turn += 1;
        info!(game = %self.id, player = %player, roll, "dice rolled");

        let mut events = vec![GameEvent::DiceRolled { player, roll }];

        if roll == 7 {
            let owed: BTreeMap<String, u32> = self
                .players
                .iter()
                .filter(|p| p.total_resources() > DISCARD_THRESHOLD)
                .map(|p| (p.name.clone(), p.total_resources() / 2))
                .collect();

            if owed.is_empty() {
                self.phase = GamePhase::Robber;
            } else {
                self.phase = GamePhase::DiscardResources;
                self.waiting_for_discard = owed.clone();
                events.push(GameEvent::DiscardRequired { players: owed });
            }
            return events;
        }

        let distributions = self.board.production(roll);
        for (owner, material, amount) in &distributions {
            if let Some(player) = self.players.iter_mut().find(|p| &p.name == owner) {
                player.resources.add(*material, *amount);
            }
        }
        if !distributions.is_empty() {
            events.push(GameEvent::ResourcesDistributed { distributions });
        }
        events.push(self.advance_turn());
        events
    }

    fn advance_turn(&mut self) -> GameEvent {
        if !self.players.is_empty() {
            self.current_player = (self.current_player + 1) % self.players.len();
        }
        self.turn_advanced()
    }

    fn turn_advanced(&self) -> GameEvent {
        GameEvent::TurnAdvanced {
            player: self
                .current()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        }
    }

    // ==================== Robber ====================

    fn discard(&mut self, sender: &str, hand: &ResourceHand) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(sender)?;
        let expected = *self
            .waiting_for_discard
            .get(sender)
            .ok_or(GameError::NotYourTurn)?;
        let got = hand
            .checked_total()
            .ok_or(GameError::InvalidDiscard { expected, got: u32::MAX })?;
        if got != expected || !self.players[index].resources.can_afford(hand) {
            return Err(GameError::InvalidDiscard { expected, got });
        }

        self.players[index].discard(hand);
        self.waiting_for_discard.remove(sender);
        if self.waiting_for_discard.is_empty() {
            self.phase = GamePhase::Robber;
        }
        debug!(game = %self.id, player = sender, count = got, "cards discarded");

        Ok(vec![GameEvent::CardsDiscarded {
            player: sender.to_string(),
            count: got,
        }])
    }

    fn move_robber(&mut self, sender: &str, location: &str) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(sender)?;
        let coord: TileCoord = location.parse().map_err(|_| GameError::InvalidLocation)?;
        let tile = self.board.tile_at(coord).ok_or(GameError::InvalidLocation)?;
        if self.board.tile(tile).terrain == Terrain::OffMap || tile == self.board.robber_tile() {
            return Err(GameError::InvalidLocation);
        }

        let from = self.board.move_robber(tile);
        let mut events = vec![GameEvent::RobberMoved {
            player: sender.to_string(),
            from: self.board.tile(from).coord,
            to: coord,
        }];

        if self.steal_candidates(sender).is_empty() {
            self.phase = GamePhase::Normal;
            events.push(self.advance_turn());
        } else {
            self.phase = GamePhase::RobberSteal;
        }
        debug!(game = %self.id, player = sender, to = %coord, phase = ?self.phase, "robber moved");
        Ok(events)
    }

    /// Opponents with cards and a building on the robber's tile
    pub fn steal_candidates(&self, thief: &str) -> BTreeSet<String> {
        self.board
            .owners_adjacent_to_tile(self.board.robber_tile())
            .into_iter()
            .filter(|owner| owner != thief)
            .filter(|owner| self.player(owner).is_some_and(|p| p.total_resources() > 0))
            .collect()
    }

    fn steal(&mut self, sender: &str, location: &str) -> Result<Vec<GameEvent>, GameError> {
        let thief = self.ensure_current(sender)?;
        let vertex = self.vertex(location)?;
        let owner = self
            .board
            .vertex(vertex)
            .owner()
            .ok_or(GameError::InvalidStealTarget)?
            .to_string();
        if owner == sender || !self.board.touches_tile(vertex, self.board.robber_tile()) {
            return Err(GameError::InvalidStealTarget);
        }
        let victim = self.player_index(&owner)?;

        let resource = self.players[victim]
            .steal_random_resource(self.rng.as_mut())
            .ok_or(GameError::InvalidStealTarget)?;
        self.players[thief].resources.add(resource, 1);
        self.phase = GamePhase::Normal;
        info!(game = %self.id, thief = sender, victim = %owner, ?resource, "resource stolen");

        Ok(vec![
            GameEvent::ResourceStolen {
                thief: sender.to_string(),
                victim: owner,
                resource,
            },
            self.advance_turn(),
        ])
    }

    // ==================== Scoring ====================

    fn update_longest_road(&mut self, index: usize) -> Option<GameEvent> {
        let player = &self.players[index];
        if player.road_count() < self.longest_road {
            return None;
        }

        let length = self.board.longest_road(&player.name);
        debug!(game = %self.id, player = %player.name, length, record = self.longest_road, "longest road computed");
        if length <= self.longest_road {
            return None;
        }

        let current = player.name.clone();
        let previous = self.longest_road_player.replace(current.clone());
        self.longest_road = length;
        info!(game = %self.id, player = %current, length, "longest road changed");
        Some(GameEvent::LongestRoadChanged {
            previous,
            current,
            length,
        })
    }

    fn check_winner(&mut self) -> Option<GameEvent> {
        let (name, victory_points) = self
            .players
            .iter()
            .map(|p| (p, self.victory_points(p)))
            .find(|(_, vp)| *vp >= VICTORY_POINTS_TO_WIN)
            .map(|(p, vp)| (p.name.clone(), vp))?;

        info!(game = %self.id, player = %name, victory_points, "game won");
        self.winner = Some(name.clone());
        Some(GameEvent::GameWon {
            player: name,
            victory_points,
        })
    }

    // ==================== Hints ====================

    /// Vertex keys where the current player could put a settlement now
    pub fn valid_building_locations(&self) -> Vec<String> {
        match self.phase {
            GamePhase::InitialPlacementSettlement => self
                .board
                .vertices()
                .iter()
                .filter(|v| v.building.is_none() && v.buildable == Buildable::Yes)
                .map(|v| v.key.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            GamePhase::Normal => {
                let Some(player) = self.current() else {
                    return Vec::new();
                };
                self.board
                    .vertices()
                    .iter()
                    .filter(|v| {
                        v.building.is_none()
                            && v.buildable != Buildable::Never
                            && v.player_roads.contains(&player.name)
                    })
                    .map(|v| v.key.clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Edge keys where the current player could put a road now
    pub fn valid_road_locations(&self) -> Vec<String> {
        let edges = self.board.edges().iter().enumerate();
        let keys: BTreeSet<String> = match (self.phase, self.setup_settlement, self.current()) {
            (GamePhase::InitialPlacementRoad, Some(settlement), _) => edges
                .filter(|(_, e)| e.road.is_none() && e.ends.contains(&settlement))
                .map(|(_, e)| e.key.clone())
                .collect(),
            (GamePhase::Normal, _, Some(player)) => edges
                .filter(|(id, e)| e.road.is_none() && self.board.road_connects(*id, &player.name))
                .map(|(_, e)| e.key.clone())
                .collect(),
            _ => BTreeSet::new(),
        };
        keys.into_iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Dice the test decides; anything else comes from a seeded generator.
    #[derive(Clone, Default)]
    pub(crate) struct Dice(Arc<Mutex<VecDeque<u8>>>);

    impl Dice {
        pub(crate) fn push(&self, roll: u8) {
            self.0.lock().unwrap().push_back(roll);
        }
    }

    struct ScriptedSource {
        dice: Dice,
        fallback: RngSource<StdRng>,
    }

    impl RandomSource for ScriptedSource {
        fn roll_die(&mut self) -> u8 {
            self.fallback.roll_die()
        }

        fn roll_dice(&mut self) -> u8 {
            let scripted = self.dice.0.lock().unwrap().pop_front();
            scripted.unwrap_or_else(|| self.fallback.roll_dice())
        }

        fn pick(&mut self, upper: usize) -> usize {
            self.fallback.pick(upper)
        }

        fn next_u64(&mut self) -> u64 {
            self.fallback.next_u64()
        }
    }

    pub(crate) fn scripted_game(names: &[&str]) -> (Game, Dice) {
        let dice = Dice::default();
        let source = ScriptedSource {
            dice: dice.clone(),
            fallback: RngSource::seeded(9),
        };
        let mut game = Game::new(&BoardLayout::single_hex(), Box::new(source));
        for name in names {
            game.add_player(name).unwrap();
        }
        game.start().unwrap();
        (game, dice)
    }

    fn first_open_vertex(game: &Game) -> String {
        game.valid_building_locations()[0].clone()
    }

    fn place_setup(game: &mut Game) {
        let sender = game.current().unwrap().name.clone();
        let location = first_open_vertex(game);
        game.apply(Command::Build {
            sender: sender.clone(),
            location,
        })
        .unwrap();
        let edge = game.valid_road_locations()[0].clone();
        game.apply(Command::BuildRoad { sender, edge }).unwrap();
    }

    #[test]
    fn test_new_game_starts_in_setup() {
        let game = Game::seeded(&BoardLayout::single_hex(), 1);
        assert_eq!(game.phase, GamePhase::InitialPlacementSettlement);
        assert!(!game.has_started);
        assert_eq!(game.longest_road, LONGEST_ROAD_START);
        assert_eq!(game.id().as_str().len(), GAME_ID_LEN);
    }

    #[test]
    fn test_commands_rejected_before_start() {
        let mut game = Game::seeded(&BoardLayout::single_hex(), 1);
        game.add_player("ann").unwrap();
        assert_eq!(
            game.apply(Command::RollDice {
                sender: "ann".into()
            }),
            Err(GameError::NotStarted)
        );
    }

    #[test]
    fn test_lobby_rules() {
        let mut game = Game::seeded(&BoardLayout::single_hex(), 1);
        assert_eq!(game.start(), Err(GameError::NoPlayers));
        game.add_player("ann").unwrap();
        assert_eq!(
            game.add_player("ann").unwrap_err(),
            GameError::NameTaken("ann".into())
        );
        game.start().unwrap();
        assert_eq!(game.start(), Err(GameError::AlreadyStarted));
        assert_eq!(game.add_player("bob").unwrap_err(), GameError::AlreadyStarted);
    }

    #[test]
    fn test_player_colors_are_hex() {
        let (game, _) = scripted_game(&["ann", "bob"]);
        for player in &game.players {
            assert_eq!(player.color.len(), 7);
            assert!(player.color.starts_with('#'));
        }
    }

    #[test]
    fn test_wrong_sender_is_rejected_without_change() {
        let (mut game, _) = scripted_game(&["ann", "bob"]);
        let location = first_open_vertex(&game);
        let result = game.apply(Command::Build {
            sender: "bob".into(),
            location,
        });
        assert_eq!(result, Err(GameError::NotYourTurn));
        assert!(game.board.vertices().iter().all(|v| v.building.is_none()));
        assert_eq!(game.phase, GamePhase::InitialPlacementSettlement);
    }

    #[test]
    fn test_command_in_wrong_phase() {
        let (mut game, _) = scripted_game(&["ann"]);
        assert_eq!(
            game.apply(Command::RollDice {
                sender: "ann".into()
            }),
            Err(GameError::InvalidPhase)
        );
        assert!(!game.handle_command(Command::RollDice {
            sender: "ann".into()
        }));
    }

    #[test]
    fn test_setup_road_must_touch_settlement() {
        let (mut game, _) = scripted_game(&["ann", "bob"]);
        let location = first_open_vertex(&game);
        game.apply(Command::Build {
            sender: "ann".into(),
            location: location.clone(),
        })
        .unwrap();

        let vertex = game.board.vertex_by_key(&location).unwrap();
        let far = game
            .board
            .edges()
            .iter()
            .find(|e| !e.ends.contains(&vertex))
            .unwrap()
            .key
            .clone();
        assert_eq!(
            game.apply(Command::BuildRoad {
                sender: "ann".into(),
                edge: far
            }),
            Err(GameError::NotConnected)
        );
    }

    #[test]
    fn test_single_player_setup_gets_no_grant() {
        let (mut game, dice) = scripted_game(&["solo"]);
        dice.push(2);
        place_setup(&mut game);
        assert_eq!(game.turn, 1);
        assert_eq!(game.phase, GamePhase::InitialPlacementSettlement);
        place_setup(&mut game);

        assert_eq!(game.phase, GamePhase::Normal);
        // turn 2 after setup, plus the automatic roll
        assert_eq!(game.turn, 3);
        assert_eq!(game.roll, 2);
        let player = &game.players[0];
        assert_eq!(player.score, 2);
        let produced: u32 = game
            .board
            .production(2)
            .iter()
            .map(|(_, _, amount)| amount)
            .sum();
        assert_eq!(player.total_resources(), produced);
    }

    #[test]
    fn test_seven_without_big_hands_goes_to_robber() {
        let (mut game, dice) = scripted_game(&["ann", "bob"]);
        dice.push(7);
        for _ in 0..4 {
            place_setup(&mut game);
        }
        assert_eq!(game.roll, 7);
        assert_eq!(game.phase, GamePhase::Robber);
        assert!(game.waiting_for_discard.is_empty());
        // the roller stays active
        assert_eq!(game.current().unwrap().name, "ann");
    }

    #[test]
    fn test_robber_cannot_stay_or_leave_map() {
        let (mut game, dice) = scripted_game(&["ann", "bob"]);
        dice.push(7);
        for _ in 0..4 {
            place_setup(&mut game);
        }
        let here = game.board.tile(game.board.robber_tile()).coord.to_string();
        for location in [here.as_str(), "0,0", "9,9", "nowhere"] {
            assert_eq!(
                game.apply(Command::Robber {
                    sender: "ann".into(),
                    location: location.into()
                }),
                Err(GameError::InvalidLocation)
            );
        }
    }

    #[test]
    fn test_game_over_rejects_commands() {
        let (mut game, _) = scripted_game(&["ann"]);
        game.winner = Some("ann".into());
        assert_eq!(
            game.apply(Command::RollDice {
                sender: "ann".into()
            }),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_winner_detected_on_build() {
        let (mut game, dice) = scripted_game(&["ann"]);
        dice.push(2);
        place_setup(&mut game);
        place_setup(&mut game);

        let player = &mut game.players[0];
        player.score = VICTORY_POINTS_TO_WIN - 1;
        player.resources = ResourceHand::with_amounts(10, 10, 10, 10, 10);
        let location = game.players[0].buildings[0].location.clone();

        let events = game
            .apply(Command::Upgrade {
                sender: "ann".into(),
                location,
            })
            .unwrap();
        assert_eq!(game.winner.as_deref(), Some("ann"));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameWon { victory_points: 10, .. })));
    }
}
