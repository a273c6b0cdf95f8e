//! Serializable view of a game for clients.
//!
//! Ordered maps keep the JSON stable for a given state, so two snapshots of
//! the same game compare equal byte for byte.

use crate::board::Buildable;
use crate::game::{Game, GamePhase};
use crate::player::{costs, Building, BuildingLimits, BuildingType, ResourceHand};
use serde::Serialize;
use std::collections::BTreeMap;

/// One cell of the board grid; off-map cells serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileView {
    pub material: &'static str,
    pub roll: Option<u8>,
    pub has_robber: bool,
}

/// A vertex shows its building if it has one, otherwise whether it is buildable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeView {
    Building(Building),
    Buildable(Buildable),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingView {
    #[serde(rename = "type")]
    pub kind: BuildingType,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub color: String,
    pub resources: ResourceHand,
    pub buildings: Vec<BuildingView>,
    pub building_limits: BuildingLimits,
    pub score: u32,
    pub victory_points: u32,
}

/// Everything a client needs to draw the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: String,
    pub turn: u32,
    pub current_game_state: GamePhase,
    pub has_started: bool,
    pub current_player: Option<String>,
    pub board: Vec<Vec<Option<TileView>>>,
    pub nodes: BTreeMap<String, NodeView>,
    /// Adjacency list keyed by vertex
    pub edges: BTreeMap<String, Vec<String>>,
    /// Road owner by edge key
    pub roads: BTreeMap<String, String>,
    pub valid_building_locations: Vec<String>,
    pub valid_road_locations: Vec<String>,
    pub roll: u8,
    pub players: Vec<PlayerView>,
    pub cost_dict: BTreeMap<BuildingType, ResourceHand>,
    pub winner: Option<String>,
    pub longest_road: u32,
    pub longest_road_player: Option<String>,
    pub waiting_for_discard: BTreeMap<String, u32>,
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        let board = &self.board;

        let grid = (0..board.rows())
            .map(|row| {
                board.tiles()[row * board.cols()..(row + 1) * board.cols()]
                    .iter()
                    .map(|tile| {
                        tile.terrain.label().map(|material| TileView {
                            material,
                            roll: tile.roll,
                            has_robber: tile.has_robber,
                        })
                    })
                    .collect()
            })
            .collect();

        let nodes = board
            .vertices()
            .iter()
            .map(|v| {
                let view = match &v.building {
                    Some(building) => NodeView::Building(building.clone()),
                    None => NodeView::Buildable(v.buildable),
                };
                (v.key.clone(), view)
            })
            .collect();

        let edges = board
            .vertices()
            .iter()
            .map(|v| {
                let mut adjacent: Vec<String> = v
                    .adjacent
                    .iter()
                    .map(|&n| board.vertex(n).key.clone())
                    .collect();
                adjacent.sort();
                (v.key.clone(), adjacent)
            })
            .collect();

        let roads = board
            .edges()
            .iter()
            .filter_map(|e| e.road.as_ref().map(|r| (e.key.clone(), r.owner.clone())))
            .collect();

        let players = self
            .players
            .iter()
            .map(|p| PlayerView {
                name: p.name.clone(),
                color: p.color.clone(),
                resources: p.resources.clone(),
                buildings: p
                    .buildings
                    .iter()
                    .map(|b| BuildingView {
                        kind: b.kind,
                        location: b.location.clone(),
                    })
                    .collect(),
                building_limits: p.building_limits.clone(),
                score: p.score,
                victory_points: self.victory_points(p),
            })
            .collect();

        let cost_dict = [BuildingType::Settlement, BuildingType::City, BuildingType::Road]
            .into_iter()
            .map(|kind| (kind, costs::for_kind(kind)))
            .collect();

        GameSnapshot {
            id: self.id().to_string(),
            turn: self.turn,
            current_game_state: self.phase,
            has_started: self.has_started,
            current_player: self.current().map(|p| p.name.clone()),
            board: grid,
            nodes,
            edges,
            roads,
            valid_building_locations: self.valid_building_locations(),
            valid_road_locations: self.valid_road_locations(),
            roll: self.roll,
            players,
            cost_dict,
            winner: self.winner.clone(),
            longest_road: self.longest_road,
            longest_road_player: self.longest_road_player.clone(),
            waiting_for_discard: self.waiting_for_discard.clone(),
        }
    }
}
