//! Player state and resource management.
//!
//! This module contains:
//! - Buildings and building kinds
//! - ResourceHand for managing resource counts
//! - Building costs and per-player piece limits
//! - Player struct with the construction and robbery rules

use crate::board::Material;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// Settlements a player may own at once
pub const SETTLEMENT_LIMIT: u32 = 4;
/// Cities a player may own at once
pub const CITY_LIMIT: u32 = 4;
/// Roads are effectively unlimited
pub const ROAD_LIMIT: u32 = 999;

/// Kinds of pieces a player can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingType {
    Settlement,
    City,
    Road,
}

impl BuildingType {
    /// Score awarded when the piece is placed
    pub fn score(&self) -> u32 {
        match self {
            BuildingType::Settlement | BuildingType::City => 1,
            BuildingType::Road => 0,
        }
    }
}

/// A placed piece. Settlements and cities sit on a vertex key, roads on an
/// edge key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "type")]
    pub kind: BuildingType,
    pub location: String,
    pub owner: String,
    pub upgradeable: bool,
}

impl Building {
    pub fn new(kind: BuildingType, location: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            owner: owner.into(),
            upgradeable: kind == BuildingType::Settlement,
        }
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceHand {
    pub wood: u32,
    pub stone: u32,
    pub wheat: u32,
    pub sheep: u32,
    pub brick: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, stone: u32, wheat: u32, sheep: u32, brick: u32) -> Self {
        Self {
            wood,
            stone,
            wheat,
            sheep,
            brick,
        }
    }

    /// Create a hand with a single resource
    pub fn single(material: Material, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(material, amount);
        hand
    }

    /// Total number of resource cards, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.checked_total().unwrap_or(u32::MAX)
    }

    /// Total number of resource cards, or `None` if it does not fit a `u32`
    pub fn checked_total(&self) -> Option<u32> {
        self.iter()
            .try_fold(0u32, |sum, (_, amount)| sum.checked_add(amount))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, material: Material) -> u32 {
        match material {
            Material::Wood => self.wood,
            Material::Stone => self.stone,
            Material::Wheat => self.wheat,
            Material::Sheep => self.sheep,
            Material::Brick => self.brick,
        }
    }

    fn slot(&mut self, material: Material) -> &mut u32 {
        match material {
            Material::Wood => &mut self.wood,
            Material::Stone => &mut self.stone,
            Material::Wheat => &mut self.wheat,
            Material::Sheep => &mut self.sheep,
            Material::Brick => &mut self.brick,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, material: Material, count: u32) {
        *self.slot(material) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, material: Material, amount: u32) {
        *self.slot(material) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for (material, amount) in other.iter() {
            self.add(material, amount);
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Material::ALL.iter().all(|&m| self.get(m) >= cost.get(m))
    }

    /// Try to subtract, returning false (and leaving the hand alone) if
    /// insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (material, amount) in cost.iter() {
            *self.slot(material) -= amount;
        }
        true
    }

    /// Remove one card of a random kind; every kind the hand holds is
    /// equally likely regardless of how many cards of it there are.
    pub fn steal_random(&mut self, rng: &mut dyn RandomSource) -> Option<Material> {
        let available: Vec<Material> = Material::ALL
            .iter()
            .copied()
            .filter(|&m| self.get(m) > 0)
            .collect();
        if available.is_empty() {
            return None;
        }

        let material = available[rng.pick(available.len())];
        *self.slot(material) -= 1;
        Some(material)
    }

    /// Non-zero entries, in material order
    pub fn iter(&self) -> impl Iterator<Item = (Material, u32)> + '_ {
        Material::ALL
            .iter()
            .map(move |&m| (m, self.get(m)))
            .filter(|&(_, amount)| amount > 0)
    }
}

/// Building costs
pub mod costs {
    use super::{BuildingType, ResourceHand};

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 0, 1)
    }

    /// Cost to build a settlement: 1 wood, 1 wheat, 1 sheep, 1 brick
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 1, 1, 1)
    }

    /// Cost to upgrade to city: 3 stone, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 3, 2, 0, 0)
    }

    pub fn for_kind(kind: BuildingType) -> ResourceHand {
        match kind {
            BuildingType::Settlement => settlement(),
            BuildingType::City => city(),
            BuildingType::Road => road(),
        }
    }
}

/// Pieces a player still has in stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildingLimits {
    pub settlement: u32,
    pub city: u32,
    pub road: u32,
}

impl Default for BuildingLimits {
    fn default() -> Self {
        Self {
            settlement: SETTLEMENT_LIMIT,
            city: CITY_LIMIT,
            road: ROAD_LIMIT,
        }
    }
}

impl BuildingLimits {
    pub fn get(&self, kind: BuildingType) -> u32 {
        match kind {
            BuildingType::Settlement => self.settlement,
            BuildingType::City => self.city,
            BuildingType::Road => self.road,
        }
    }

    fn take(&mut self, kind: BuildingType) -> bool {
        let slot = match kind {
            BuildingType::Settlement => &mut self.settlement,
            BuildingType::City => &mut self.city,
            BuildingType::Road => &mut self.road,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name, unique within a game
    pub name: String,
    /// `#rrggbb`
    pub color: String,
    pub resources: ResourceHand,
    pub building_limits: BuildingLimits,
    /// Pieces on the board, in placement order
    pub buildings: Vec<Building>,
    /// Points from settlements and cities
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            resources: ResourceHand::new(),
            building_limits: BuildingLimits::default(),
            buildings: Vec::new(),
            score: 0,
        }
    }

    pub fn total_resources(&self) -> u32 {
        self.resources.total()
    }

    /// Whether the hand covers the cost of `kind`
    pub fn can_afford(&self, kind: BuildingType) -> bool {
        self.resources.can_afford(&costs::for_kind(kind))
    }

    /// Whether a piece of `kind` is still in stock
    pub fn has_piece(&self, kind: BuildingType) -> bool {
        self.building_limits.get(kind) > 0
    }

    /// Pay for and record a new piece. Returns `None` without touching
    /// anything if the player cannot afford it or is out of pieces.
    pub fn build(&mut self, kind: BuildingType, location: &str) -> Option<Building> {
        if !self.can_afford(kind) || !self.has_piece(kind) {
            return None;
        }
        self.resources.try_subtract(&costs::for_kind(kind));
        self.record(kind, location)
    }

    /// Initial placement: no cost, but stock and score rules still apply.
    pub fn place_free(&mut self, kind: BuildingType, location: &str) -> Option<Building> {
        if !self.has_piece(kind) {
            return None;
        }
        self.record(kind, location)
    }

    fn record(&mut self, kind: BuildingType, location: &str) -> Option<Building> {
        if !self.building_limits.take(kind) {
            return None;
        }
        let building = Building::new(kind, location, self.name.clone());
        self.buildings.push(building.clone());
        self.score += kind.score();
        Some(building)
    }

    /// Turn the settlement at `location` into a city. The settlement entry is
    /// replaced so the vertex only appears once in `buildings`.
    pub fn upgrade(&mut self, location: &str) -> Option<Building> {
        let index = self
            .buildings
            .iter()
            .position(|b| b.kind == BuildingType::Settlement && b.location == location)?;
        if !self.can_afford(BuildingType::City) || !self.has_piece(BuildingType::City) {
            return None;
        }

        self.resources.try_subtract(&costs::city());
        self.building_limits.take(BuildingType::City);
        let city = Building::new(BuildingType::City, location, self.name.clone());
        self.buildings[index] = city.clone();
        self.score += BuildingType::City.score();
        Some(city)
    }

    /// Give up exactly the cards in `hand`; false if any are missing.
    pub fn discard(&mut self, hand: &ResourceHand) -> bool {
        self.resources.try_subtract(hand)
    }

    pub fn steal_random_resource(&mut self, rng: &mut dyn RandomSource) -> Option<Material> {
        self.resources.steal_random(rng)
    }

    pub fn roads(&self) -> impl Iterator<Item = &Building> {
        self.buildings
            .iter()
            .filter(|b| b.kind == BuildingType::Road)
    }

    pub fn road_count(&self) -> u32 {
        self.roads().count() as u32
    }

    /// Score plus the longest road bonus when held
    pub fn victory_points(&self, has_longest_road: bool) -> u32 {
        if has_longest_road {
            self.score + crate::game::LONGEST_ROAD_BONUS
        } else {
            self.score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngSource;

    fn rich_player() -> Player {
        let mut player = Player::new("ann", "#112233");
        player.resources = ResourceHand::with_amounts(5, 5, 5, 5, 5);
        player
    }

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
    }

    #[test]
    fn test_resource_hand_total_overflow() {
        let hand = ResourceHand::with_amounts(u32::MAX, 5, 0, 0, 0);
        assert_eq!(hand.checked_total(), None);
        assert_eq!(hand.total(), u32::MAX);
        assert_eq!(ResourceHand::with_amounts(1, 2, 0, 0, 0).checked_total(), Some(3));
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::with_amounts(2, 2, 2, 2, 2);
        assert!(hand.can_afford(&costs::settlement()));
        assert!(!hand.can_afford(&costs::city()));
    }

    #[test]
    fn test_try_subtract_leaves_hand_on_failure() {
        let mut hand = ResourceHand::with_amounts(1, 0, 0, 0, 0);
        assert!(!hand.try_subtract(&costs::road()));
        assert_eq!(hand, ResourceHand::with_amounts(1, 0, 0, 0, 0));
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
        assert_eq!(costs::city().stone, 3);
    }

    #[test]
    fn test_hand_serializes_pascal_case() {
        let hand = ResourceHand::single(Material::Wheat, 2);
        let json = serde_json::to_value(&hand).unwrap();
        assert_eq!(json["Wheat"], 2);
        let parsed: ResourceHand = serde_json::from_str(r#"{"Stone": 1}"#).unwrap();
        assert_eq!(parsed, ResourceHand::single(Material::Stone, 1));
    }

    #[test]
    fn test_build_settlement() {
        let mut player = rich_player();
        let building = player.build(BuildingType::Settlement, "0.50,1.00").unwrap();

        assert!(building.upgradeable);
        assert_eq!(player.score, 1);
        assert_eq!(player.building_limits.settlement, SETTLEMENT_LIMIT - 1);
        assert_eq!(player.resources, ResourceHand::with_amounts(4, 5, 4, 4, 4));
    }

    #[test]
    fn test_build_fails_without_resources() {
        let mut player = Player::new("bob", "#000000");
        assert_eq!(player.build(BuildingType::Road, "a-b"), None);
        assert!(player.buildings.is_empty());
        assert_eq!(player.building_limits, BuildingLimits::default());
    }

    #[test]
    fn test_build_fails_when_out_of_pieces() {
        let mut player = rich_player();
        player.building_limits.settlement = 0;
        assert_eq!(player.build(BuildingType::Settlement, "0.50,1.00"), None);
        assert_eq!(player.total_resources(), 25);
    }

    #[test]
    fn test_road_scores_nothing() {
        let mut player = rich_player();
        player.build(BuildingType::Road, "a-b").unwrap();
        assert_eq!(player.score, 0);
        assert_eq!(player.road_count(), 1);
    }

    #[test]
    fn test_place_free_costs_nothing() {
        let mut player = Player::new("ann", "#112233");
        player.place_free(BuildingType::Settlement, "0.50,1.00").unwrap();
        player.place_free(BuildingType::Road, "a-b").unwrap();
        assert_eq!(player.score, 1);
        assert_eq!(player.building_limits.road, ROAD_LIMIT - 1);
    }

    #[test]
    fn test_upgrade_replaces_settlement() {
        let mut player = rich_player();
        player.build(BuildingType::Settlement, "0.50,1.00").unwrap();
        let city = player.upgrade("0.50,1.00").unwrap();

        assert_eq!(city.kind, BuildingType::City);
        assert!(!city.upgradeable);
        assert_eq!(player.score, 2);
        assert_eq!(player.buildings.len(), 1);
        assert_eq!(player.building_limits.city, CITY_LIMIT - 1);
        // the settlement piece is not returned
        assert_eq!(player.building_limits.settlement, SETTLEMENT_LIMIT - 1);
    }

    #[test]
    fn test_upgrade_requires_own_settlement() {
        let mut player = rich_player();
        assert_eq!(player.upgrade("0.50,1.00"), None);
        assert_eq!(player.total_resources(), 25);
    }

    #[test]
    fn test_steal_random() {
        let mut hand = ResourceHand::with_amounts(0, 0, 1, 0, 0);
        let mut rng = RngSource::seeded(5);

        let stolen = hand.steal_random(&mut rng);
        assert_eq!(stolen, Some(Material::Wheat));
        assert!(hand.is_empty());
        assert_eq!(hand.steal_random(&mut rng), None);
    }

    #[test]
    fn test_discard_exact_cards() {
        let mut player = rich_player();
        assert!(player.discard(&ResourceHand::single(Material::Wood, 5)));
        assert!(!player.discard(&ResourceHand::single(Material::Wood, 1)));
        assert_eq!(player.total_resources(), 20);
    }

    #[test]
    fn test_victory_points_include_bonus() {
        let mut player = rich_player();
        player.build(BuildingType::Settlement, "0.50,1.00").unwrap();
        assert_eq!(player.victory_points(false), 1);
        assert_eq!(player.victory_points(true), 3);
    }
}
