//! Catanaki - rules engine for a Catan-like hex board game
//!
//! This crate provides the core game logic for Catanaki, including:
//! - Offset hex coordinates for tiles, vertices and edge keys
//! - Board generation with a deduplicated vertex/edge graph
//! - Player economy: resources, costs, building limits
//! - Game state machine with snake-order setup, robber and discards
//! - Longest road analysis
//! - A JSON-ready snapshot and an in-process game registry
//!
//! # Architecture
//!
//! The engine does no I/O. A transport (see `catanaki-server`) feeds it
//! [`Command`]s and broadcasts [`GameSnapshot`]s. All randomness goes
//! through [`RandomSource`] so games can be replayed from a seed.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for tiles, vertices and edges
//! - [`board`]: Board layout, generation and placement bookkeeping
//! - [`player`]: Player state and resources
//! - [`game`]: Game state machine
//! - [`roads`]: Longest road calculation
//! - [`snapshot`]: Client view of a game
//! - [`registry`]: Games by id

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod registry;
pub mod rng;
pub mod roads;
pub mod snapshot;

// Re-export commonly used types
pub use actions::{Command, GameEvent};
pub use board::{Board, BoardLayout, Buildable, LayoutError, Material, Terrain, Tile, Vertex};
pub use game::{Game, GameError, GameId, GamePhase};
pub use hex::{CoordError, TileCoord, VertexPoint};
pub use player::{costs, Building, BuildingLimits, BuildingType, Player, ResourceHand};
pub use registry::{GameRegistry, PlayerHandle};
pub use rng::{RandomSource, RngSource};
pub use snapshot::GameSnapshot;
