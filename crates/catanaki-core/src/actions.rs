//! Commands players send and the events they produce.
//!
//! Commands arrive as JSON from clients, so their shape is fixed: an object
//! tagged by `type` with the sender's name and the type-specific fields.

use crate::board::Material;
use crate::hex::TileCoord;
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Everything a player can ask the game to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    // ==================== Building ====================
    /// Place a settlement on a vertex key
    Build { sender: String, location: String },
    /// Place a road on an edge key
    BuildRoad { sender: String, edge: String },
    /// Turn one of the sender's settlements into a city
    Upgrade { sender: String, location: String },

    // ==================== Turn ====================
    RollDice { sender: String },

    // ==================== Robber ====================
    /// Move the robber to a tile, `"row,col"`
    Robber { sender: String, location: String },
    /// Steal from the owner of the building on a vertex key
    RobberSteal { sender: String, location: String },
    /// Give up cards after a 7
    Discard {
        sender: String,
        #[serde(default)]
        resources: ResourceHand,
    },
}

impl Command {
    /// Name of the player who sent the command
    pub fn sender(&self) -> &str {
        match self {
            Command::Build { sender, .. }
            | Command::BuildRoad { sender, .. }
            | Command::Upgrade { sender, .. }
            | Command::RollDice { sender }
            | Command::Robber { sender, .. }
            | Command::RobberSteal { sender, .. }
            | Command::Discard { sender, .. } => sender,
        }
    }

    /// Wire name of the command type
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::BuildRoad { .. } => "buildRoad",
            Command::Upgrade { .. } => "upgrade",
            Command::RollDice { .. } => "rollDice",
            Command::Robber { .. } => "robber",
            Command::RobberSteal { .. } => "robberSteal",
            Command::Discard { .. } => "discard",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.kind(), self.sender())
    }
}

/// Events that occur as a result of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled { player: String, roll: u8 },

    /// Resources were handed out, `(player, material, amount)`
    ResourcesDistributed {
        distributions: Vec<(String, Material, u32)>,
    },

    /// A settlement was built
    SettlementBuilt { player: String, location: String },

    /// A settlement was upgraded to a city
    CityBuilt { player: String, location: String },

    /// A road was built
    RoadBuilt { player: String, location: String },

    /// A 7 was rolled and these players owe cards
    DiscardRequired { players: BTreeMap<String, u32> },

    /// Player had to discard cards
    CardsDiscarded { player: String, count: u32 },

    /// The robber was moved
    RobberMoved {
        player: String,
        from: TileCoord,
        to: TileCoord,
    },

    /// A resource was stolen
    ResourceStolen {
        thief: String,
        victim: String,
        resource: Material,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<String>,
        current: String,
        length: u32,
    },

    /// Snake draft is over, normal turns begin
    InitialPlacementFinished,

    /// Next player is up
    TurnAdvanced { player: String },

    /// A player won the game
    GameWon { player: String, victory_points: u32 },
}
