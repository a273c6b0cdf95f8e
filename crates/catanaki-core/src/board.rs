//! Game board representation: tiles, vertices and edges.
//!
//! This module contains:
//! - Materials and tile terrain
//! - The placeholder layout the board is generated from
//! - The board graph (tile grid, deduplicated vertex arena, edge arena)
//! - Placement bookkeeping and production queries
//!
//! Vertices and edges are stored in arenas and addressed by index. Tiles
//! refer to their vertices by index and vertices refer back to their tiles,
//! so nothing owns anything cyclically.

use crate::hex::{edge_key, split_edge_key, TileCoord, VertexPoint};
use crate::player::{Building, BuildingType};
use crate::rng::RandomSource;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;

/// Index of a tile in the row-major tile grid
pub type TileId = usize;

/// Index of a vertex in the vertex arena
pub type VertexId = usize;

/// Index of an edge in the edge arena
pub type EdgeId = usize;

/// Spendable materials produced by land tiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, serde::Deserialize,
)]
pub enum Material {
    Wood,
    Stone,
    Wheat,
    Sheep,
    Brick,
}

impl Material {
    /// All materials, in the order tiles draw from
    pub const ALL: [Material; 5] = [
        Material::Wood,
        Material::Stone,
        Material::Wheat,
        Material::Sheep,
        Material::Brick,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Wood => "Wood",
            Material::Stone => "Stone",
            Material::Wheat => "Wheat",
            Material::Sheep => "Sheep",
            Material::Brick => "Brick",
        }
    }
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    /// Outside the playable area
    OffMap,
    /// Produces a material when its roll comes up
    Land(Material),
    /// Produces nothing; the robber starts here
    Desert,
}

impl Terrain {
    pub fn material(&self) -> Option<Material> {
        match self {
            Terrain::Land(m) => Some(*m),
            _ => None,
        }
    }

    /// Whether this cell is part of the playable map
    pub fn is_land(&self) -> bool {
        !matches!(self, Terrain::OffMap)
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Terrain::OffMap => None,
            Terrain::Land(m) => Some(m.name()),
            Terrain::Desert => Some("Desert"),
        }
    }
}

/// A single hex tile
#[derive(Debug, Clone)]
pub struct Tile {
    /// Position in the grid
    pub coord: TileCoord,
    pub terrain: Terrain,
    /// Roll number that triggers production (2-12, never 7). `None` for the
    /// desert and off-map cells.
    pub roll: Option<u8>,
    pub has_robber: bool,
    /// Vertices on this tile's corners
    pub vertices: Vec<VertexId>,
}

impl Tile {
    fn off_map(coord: TileCoord) -> Self {
        Self {
            coord,
            terrain: Terrain::OffMap,
            roll: None,
            has_robber: false,
            vertices: Vec::new(),
        }
    }

    fn land(coord: TileCoord, material: Material, roll: u8) -> Self {
        Self {
            coord,
            terrain: Terrain::Land(material),
            roll: Some(roll),
            has_robber: false,
            vertices: Vec::new(),
        }
    }

    fn desert(coord: TileCoord) -> Self {
        Self {
            coord,
            terrain: Terrain::Desert,
            roll: None,
            has_robber: true,
            vertices: Vec::new(),
        }
    }
}

/// Whether a settlement may go on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buildable {
    /// Free to build (initial placement)
    Yes,
    /// Only once the player has a road touching it
    NoAdjacent,
    /// Occupied or next to a settlement, for the rest of the game
    Never,
}

/// Serialized the way clients have always read it: `true`, `false` or `"never"`.
impl Serialize for Buildable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Buildable::Yes => serializer.serialize_bool(true),
            Buildable::NoAdjacent => serializer.serialize_bool(false),
            Buildable::Never => serializer.serialize_str("never"),
        }
    }
}

/// A corner shared by up to three tiles
#[derive(Debug, Clone)]
pub struct Vertex {
    pub point: VertexPoint,
    /// Canonical text key (`"y.yy,x.xx"`)
    pub key: String,
    pub tiles: Vec<TileId>,
    /// Neighbours reachable along an edge of a shared tile
    pub adjacent: Vec<VertexId>,
    pub building: Option<Building>,
    pub buildable: Buildable,
    /// Names of players with a road ending here
    pub player_roads: BTreeSet<String>,
}

impl Vertex {
    fn new(point: VertexPoint) -> Self {
        Self {
            point,
            key: point.key(),
            tiles: Vec::new(),
            adjacent: Vec::new(),
            building: None,
            buildable: Buildable::Yes,
            player_roads: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.building.as_ref().map(|b| b.owner.as_str())
    }
}

/// A road slot between two vertices
#[derive(Debug, Clone)]
pub struct Edge {
    /// Canonical key: both vertex keys sorted and joined with `-`
    pub key: String,
    /// Endpoints, ordered like their keys
    pub ends: [VertexId; 2],
    pub road: Option<Building>,
}

/// A cell of the placeholder grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `X`
    OffMap,
    /// `#`: random material and roll
    Land,
    /// `D`: the desert
    Desert,
}

/// Errors in a placeholder grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown symbol `{symbol}` at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },

    #[error("layout must contain exactly one desert, found {0}")]
    DesertCount(usize),
}

/// The rectangular grid of placeholders a board is generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    cells: Vec<Vec<Placeholder>>,
}

impl BoardLayout {
    /// Parse rows of `X` (off map), `#` (land) and `D` (desert).
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let mut cells = Vec::with_capacity(rows.len());
        let mut deserts = 0;

        for (row, line) in rows.iter().enumerate() {
            let mut parsed = Vec::new();
            for (col, symbol) in line.as_ref().chars().enumerate() {
                let cell = match symbol {
                    'X' => Placeholder::OffMap,
                    '#' => Placeholder::Land,
                    'D' => {
                        deserts += 1;
                        Placeholder::Desert
                    }
                    _ => return Err(LayoutError::UnknownSymbol { row, col, symbol }),
                };
                parsed.push(cell);
            }
            cells.push(parsed);
        }

        let width = cells.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }
        if let Some((row, found)) = cells
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(LayoutError::Ragged {
                row,
                expected: width,
                found,
            });
        }
        if deserts != 1 {
            return Err(LayoutError::DesertCount(deserts));
        }

        Ok(Self { cells })
    }

    /// The default map: an irregular grid of 17 land tiles and a desert.
    pub fn standard() -> Self {
        Self::parse(&[
            "XXXXXXXX",
            "X#XXX#XX",
            "X#####XX",
            "X#XXX#XX",
            "X#DX##XX",
            "X##XX###",
            "XXXXXXXX",
        ])
        .expect("built-in layout is valid")
    }

    /// A single hexagon of seven tiles around a central desert.
    pub fn single_hex() -> Self {
        Self::parse(&["X##X", "#D#X", "X##X"]).expect("built-in layout is valid")
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, coord: TileCoord) -> Option<Placeholder> {
        self.cells.get(coord.row)?.get(coord.col).copied()
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Every grid cell, row-major
    tiles: Vec<Tile>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    vertex_index: HashMap<VertexPoint, VertexId>,
    /// Keyed by the endpoint pair, smaller id first
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
    robber: TileId,
}

impl Board {
    /// Generate a board from a layout, drawing materials and rolls from `rng`.
    pub fn generate(layout: &BoardLayout, rng: &mut dyn RandomSource) -> Self {
        let (rows, cols) = (layout.rows(), layout.cols());
        let mut tiles = Vec::with_capacity(rows * cols);
        let mut robber = 0;

        for row in 0..rows {
            for col in 0..cols {
                let coord = TileCoord::new(row, col);
                let tile = match layout.cell(coord) {
                    Some(Placeholder::Land) => {
                        let material = Material::ALL[rng.pick(Material::ALL.len())];
                        Tile::land(coord, material, draw_roll(rng))
                    }
                    Some(Placeholder::Desert) => {
                        robber = tiles.len();
                        Tile::desert(coord)
                    }
                    Some(Placeholder::OffMap) | None => Tile::off_map(coord),
                };
                tiles.push(tile);
            }
        }

        let mut board = Self {
            rows,
            cols,
            tiles,
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_index: HashMap::new(),
            edge_index: HashMap::new(),
            robber,
        };
        board.create_vertices();
        board.create_edges();

        debug!(
            tiles = board.land_tiles().count(),
            vertices = board.vertices.len(),
            edges = board.edges.len(),
            "board generated"
        );
        board
    }

    fn create_vertices(&mut self) {
        for tile_id in 0..self.tiles.len() {
            if !self.tiles[tile_id].terrain.is_land() {
                continue;
            }
            for corner in self.tiles[tile_id].coord.corners() {
                let vertex_id = match self.vertex_index.get(&corner) {
                    Some(&id) => id,
                    None => {
                        let id = self.vertices.len();
                        self.vertices.push(Vertex::new(corner));
                        self.vertex_index.insert(corner, id);
                        id
                    }
                };

                let vertex = &mut self.vertices[vertex_id];
                if !vertex.tiles.contains(&tile_id) {
                    vertex.tiles.push(tile_id);
                }
                let tile = &mut self.tiles[tile_id];
                if !tile.vertices.contains(&vertex_id) {
                    tile.vertices.push(vertex_id);
                }
            }
        }
    }

    fn create_edges(&mut self) {
        for vertex_id in 0..self.vertices.len() {
            let point = self.vertices[vertex_id].point;
            for neighbor in point.neighbors() {
                let Some(&other) = self.vertex_index.get(&neighbor) else {
                    continue;
                };

                // Corners of two separate patches can be geometric neighbours
                // without a tile between them; those never become adjacent.
                if self.shares_tile(vertex_id, other)
                    && !self.vertices[vertex_id].adjacent.contains(&other)
                {
                    self.vertices[vertex_id].adjacent.push(other);
                }

                self.register_edge(vertex_id, other);
            }
        }
    }

    /// Insert the edge between two vertices unless it already exists.
    fn register_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let pair = (a.min(b), a.max(b));
        if let Some(&id) = self.edge_index.get(&pair) {
            return id;
        }

        let (pa, pb) = (self.vertices[a].point, self.vertices[b].point);
        let ends = if self.vertices[a].key <= self.vertices[b].key {
            [a, b]
        } else {
            [b, a]
        };
        let id = self.edges.len();
        self.edges.push(Edge {
            key: edge_key(&pa, &pb),
            ends,
            road: None,
        });
        self.edge_index.insert(pair, id);
        id
    }

    // ==================== Queries ====================

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// All grid cells, including off-map ones
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn land_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.terrain.is_land())
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    pub fn tile_at(&self, coord: TileCoord) -> Option<TileId> {
        (coord.row < self.rows && coord.col < self.cols).then(|| coord.row * self.cols + coord.col)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub fn vertex_at(&self, point: VertexPoint) -> Option<VertexId> {
        self.vertex_index.get(&point).copied()
    }

    /// Look up a vertex by its text key; any spelling that rounds to the
    /// same point matches.
    pub fn vertex_by_key(&self, key: &str) -> Option<VertexId> {
        self.vertex_at(key.parse().ok()?)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&(a.min(b), a.max(b))).copied()
    }

    /// Look up an edge by key; the endpoints may be given in either order.
    pub fn edge_by_key(&self, key: &str) -> Option<EdgeId> {
        let (a, b) = split_edge_key(key).ok()?;
        self.edge_between(self.vertex_at(a)?, self.vertex_at(b)?)
    }

    /// Tile currently holding the robber
    pub fn robber_tile(&self) -> TileId {
        self.robber
    }

    /// Whether two vertices lie on a common tile
    pub fn shares_tile(&self, a: VertexId, b: VertexId) -> bool {
        let other = &self.vertices[b].tiles;
        self.vertices[a].tiles.iter().any(|t| other.contains(t))
    }

    /// Whether a vertex is one of a tile's corners
    pub fn touches_tile(&self, vertex: VertexId, tile: TileId) -> bool {
        self.vertices[vertex].tiles.contains(&tile)
    }

    /// Owners of buildings on the corners of a tile
    pub fn owners_adjacent_to_tile(&self, tile: TileId) -> BTreeSet<String> {
        self.tiles[tile]
            .vertices
            .iter()
            .filter_map(|&v| self.vertices[v].owner().map(str::to_string))
            .collect()
    }

    /// Whether a road on `edge` would join `player`'s network: one endpoint
    /// carries their building, or carries their road and no opponent building.
    pub fn road_connects(&self, edge: EdgeId, player: &str) -> bool {
        self.edges[edge].ends.iter().any(|&end| {
            let vertex = &self.vertices[end];
            match vertex.owner() {
                Some(owner) => owner == player,
                None => vertex.player_roads.contains(player),
            }
        })
    }

    /// Materials of the land tiles around a vertex, one entry per tile
    pub fn materials_around(&self, vertex: VertexId) -> Vec<Material> {
        self.vertices[vertex]
            .tiles
            .iter()
            .filter_map(|&t| self.tiles[t].terrain.material())
            .collect()
    }

    /// Resources produced by a roll: `(owner, material, amount)`, aggregated
    /// per owner and material. The robber's tile produces nothing.
    pub fn production(&self, roll: u8) -> Vec<(String, Material, u32)> {
        let mut totals: BTreeMap<(String, Material), u32> = BTreeMap::new();

        for tile in &self.tiles {
            if tile.roll != Some(roll) || tile.has_robber {
                continue;
            }
            let Some(material) = tile.terrain.material() else {
                continue;
            };

            for &vertex in &tile.vertices {
                let Some(building) = &self.vertices[vertex].building else {
                    continue;
                };
                let amount = match building.kind {
                    BuildingType::Settlement => 1,
                    BuildingType::City => 2,
                    BuildingType::Road => 0,
                };
                if amount > 0 {
                    *totals
                        .entry((building.owner.clone(), material))
                        .or_insert(0) += amount;
                }
            }
        }

        totals
            .into_iter()
            .map(|((owner, material), amount)| (owner, material, amount))
            .collect()
    }

    // ==================== Mutation Methods ====================

    /// Put a settlement or city on a vertex (validation already done)
    pub fn place_building(&mut self, vertex: VertexId, building: Building) {
        self.vertices[vertex].building = Some(building);
    }

    /// Put a road on an edge and record it on both endpoints
    pub fn place_road(&mut self, edge: EdgeId, road: Building) {
        for end in self.edges[edge].ends {
            self.vertices[end].player_roads.insert(road.owner.clone());
        }
        self.edges[edge].road = Some(road);
    }

    /// Block a vertex and its neighbours for the rest of the game
    pub fn restrict_adjacent(&mut self, vertex: VertexId) {
        self.vertices[vertex].buildable = Buildable::Never;
        for i in 0..self.vertices[vertex].adjacent.len() {
            let neighbor = self.vertices[vertex].adjacent[i];
            self.vertices[neighbor].buildable = Buildable::Never;
        }
    }

    /// End of initial placement: open vertices now need a road to build on.
    pub fn invalidate(&mut self) {
        for vertex in &mut self.vertices {
            if vertex.buildable != Buildable::Never {
                vertex.buildable = Buildable::NoAdjacent;
            }
        }
    }

    /// Move the robber, returning the tile it left
    pub fn move_robber(&mut self, to: TileId) -> TileId {
        let from = self.robber;
        self.tiles[from].has_robber = false;
        self.tiles[to].has_robber = true;
        self.robber = to;
        from
    }
}

/// Sum of two dice, re-rolled while it is 7.
fn draw_roll(rng: &mut dyn RandomSource) -> u8 {
    loop {
        let roll = rng.roll_dice();
        if roll != 7 {
            return roll;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngSource;

    fn board(layout: &BoardLayout) -> Board {
        Board::generate(layout, &mut RngSource::seeded(11))
    }

    #[test]
    fn test_parse_rejects_bad_layouts() {
        assert_eq!(BoardLayout::parse::<&str>(&[]), Err(LayoutError::Empty));
        assert_eq!(
            BoardLayout::parse(&["X#D", "X#"]),
            Err(LayoutError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            BoardLayout::parse(&["X?D"]),
            Err(LayoutError::UnknownSymbol { symbol: '?', .. })
        ));
        assert_eq!(BoardLayout::parse(&["X##"]), Err(LayoutError::DesertCount(0)));
        assert_eq!(BoardLayout::parse(&["XDD"]), Err(LayoutError::DesertCount(2)));
    }

    #[test]
    fn test_single_hex_counts() {
        let board = board(&BoardLayout::single_hex());
        assert_eq!(board.land_tiles().count(), 7);
        // a ring of seven hexes has 24 corners and 30 sides
        assert_eq!(board.vertices().len(), 24);
        assert_eq!(board.edges().len(), 30);
    }

    #[test]
    fn test_robber_starts_on_desert() {
        let board = board(&BoardLayout::single_hex());
        let tile = board.tile(board.robber_tile());
        assert_eq!(tile.terrain, Terrain::Desert);
        assert!(tile.has_robber);
        assert_eq!(tile.coord, TileCoord::new(1, 1));
        assert_eq!(board.tiles().iter().filter(|t| t.has_robber).count(), 1);
    }

    #[test]
    fn test_no_tile_rolls_seven() {
        for seed in 0..20 {
            let board = Board::generate(&BoardLayout::standard(), &mut RngSource::seeded(seed));
            for tile in board.land_tiles() {
                match tile.terrain {
                    Terrain::Desert => assert_eq!(tile.roll, None),
                    _ => {
                        let roll = tile.roll.unwrap();
                        assert!((2..=12).contains(&roll) && roll != 7);
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_land_tile_has_six_vertices() {
        let board = board(&BoardLayout::standard());
        for tile in board.land_tiles() {
            assert_eq!(tile.vertices.len(), 6);
            for &v in &tile.vertices {
                assert!(board.vertex(v).tiles.contains(&board.tile_at(tile.coord).unwrap()));
            }
        }
    }

    #[test]
    fn test_adjacency_requires_shared_tile() {
        let board = board(&BoardLayout::standard());
        for (id, vertex) in board.vertices().iter().enumerate() {
            for &other in &vertex.adjacent {
                assert!(board.shares_tile(id, other));
            }
        }
    }

    #[test]
    fn test_patch_boundaries_have_edges_without_adjacency() {
        // geometric neighbours always get an edge slot, adjacency only
        // when they share a tile
        let board = board(&BoardLayout::standard());
        let phantom = board
            .edges()
            .iter()
            .filter(|e| !board.shares_tile(e.ends[0], e.ends[1]))
            .count();
        let adjacent_pairs: usize =
            board.vertices().iter().map(|v| v.adjacent.len()).sum::<usize>() / 2;
        assert_eq!(board.edges().len(), adjacent_pairs + phantom);
    }

    #[test]
    fn test_edge_lookup_either_order() {
        let board = board(&BoardLayout::single_hex());
        let edge = board.edge(0);
        let (a, b) = (&board.vertex(edge.ends[0]).key, &board.vertex(edge.ends[1]).key);
        assert_eq!(board.edge_by_key(&format!("{}-{}", a, b)), Some(0));
        assert_eq!(board.edge_by_key(&format!("{}-{}", b, a)), Some(0));
        assert_eq!(board.edge_by_key("9.00,9.00-9.50,9.00"), None);
    }

    #[test]
    fn test_restrict_survives_invalidate() {
        let mut board = board(&BoardLayout::single_hex());
        board.restrict_adjacent(0);
        board.invalidate();
        assert_eq!(board.vertex(0).buildable, Buildable::Never);
        for &n in &board.vertex(0).adjacent.clone() {
            assert_eq!(board.vertex(n).buildable, Buildable::Never);
        }
        let untouched = board
            .vertices()
            .iter()
            .filter(|v| v.buildable == Buildable::NoAdjacent)
            .count();
        assert_eq!(untouched, 24 - 1 - board.vertex(0).adjacent.len());
    }

    #[test]
    fn test_robber_tile_produces_nothing() {
        let mut board = board(&BoardLayout::single_hex());
        let tile_id = board
            .tiles()
            .iter()
            .position(|t| t.roll.is_some())
            .unwrap();
        let roll = board.tile(tile_id).roll.unwrap();
        let vertex = board.tile(tile_id).vertices[0];
        board.place_building(
            vertex,
            Building::new(BuildingType::Settlement, board.vertex(vertex).key.clone(), "ann"),
        );

        assert!(board
            .production(roll)
            .iter()
            .any(|(owner, _, amount)| owner == "ann" && *amount >= 1));

        board.move_robber(tile_id);
        let material = board.tile(tile_id).terrain.material().unwrap();
        let from_tile: u32 = board
            .production(roll)
            .iter()
            .filter(|(owner, m, _)| owner == "ann" && *m == material)
            .map(|(_, _, a)| *a)
            .sum();
        // another tile with the same roll and material could still touch the vertex
        let others = board
            .vertex(vertex)
            .tiles
            .iter()
            .filter(|&&t| {
                t != tile_id
                    && board.tile(t).roll == Some(roll)
                    && board.tile(t).terrain.material() == Some(material)
            })
            .count() as u32;
        assert_eq!(from_tile, others);
    }

    #[test]
    fn test_city_produces_double() {
        let mut board = board(&BoardLayout::single_hex());
        let tile_id = board
            .tiles()
            .iter()
            .position(|t| t.roll.is_some())
            .unwrap();
        let roll = board.tile(tile_id).roll.unwrap();
        let vertex = board.tile(tile_id).vertices[0];
        let key = board.vertex(vertex).key.clone();

        board.place_building(vertex, Building::new(BuildingType::Settlement, key.clone(), "ann"));
        let settlement: u32 = board.production(roll).iter().map(|(_, _, a)| *a).sum();
        board.place_building(vertex, Building::new(BuildingType::City, key, "ann"));
        let city: u32 = board.production(roll).iter().map(|(_, _, a)| *a).sum();
        assert_eq!(city, settlement * 2);
    }
}
