//! Coordinate system for the offset hex grid.
//!
//! This module provides the coordinate types the board graph is built from:
//! - `TileCoord`: a cell of the rectangular placeholder grid (row, column)
//! - `VertexPoint`: a corner where settlements and cities are placed
//! - edge keys: the canonical text form of a road slot between two corners
//!
//! Rows are laid out with odd rows shifted half a tile to the right and each
//! row moved up by a quarter tile, so neighbouring tiles share corners. Corner
//! positions are multiples of a quarter unit; we store them as integer
//! hundredths, which is the same as rounding to two decimals and keeps map
//! keys exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing coordinates sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("malformed tile location `{0}`, expected `row,col`")]
    Tile(String),

    #[error("malformed vertex key `{0}`, expected `y,x`")]
    Vertex(String),

    #[error("malformed edge key `{0}`, expected `y,x-y,x`")]
    Edge(String),
}

/// Position of a cell in the placeholder grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TileCoord {
    pub row: usize,
    pub col: usize,
}

impl TileCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The six corners of this tile.
    ///
    /// Order: top, bottom, upper-right, upper-left, lower-left, lower-right
    /// (with y growing downwards as rows do).
    pub fn corners(&self) -> [VertexPoint; 6] {
        let row = self.row as i32;
        let col = self.col as i32;
        let horizontal = if row % 2 == 0 { 0 } else { 50 };
        // row * 100 plus the vertical offset of -25 per row
        let y = row * 75;
        let x = col * 100 + horizontal;

        [
            VertexPoint::new(y + 50, x),
            VertexPoint::new(y - 50, x),
            VertexPoint::new(y - 25, x + 50),
            VertexPoint::new(y - 25, x - 50),
            VertexPoint::new(y + 25, x - 50),
            VertexPoint::new(y + 25, x + 50),
        ]
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for TileCoord {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CoordError::Tile(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(err)?;
        Ok(Self {
            row: row.trim().parse().map_err(|_| err())?,
            col: col.trim().parse().map_err(|_| err())?,
        })
    }
}

/// A corner position in hundredths of a tile unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct VertexPoint {
    /// Vertical position (grows with the row index)
    pub y: i32,
    /// Horizontal position (grows with the column index)
    pub x: i32,
}

impl VertexPoint {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Build a point from fractional tile units, rounding to two decimals.
    pub fn from_units(y: f64, x: f64) -> Self {
        Self {
            y: (y * 100.0).round() as i32,
            x: (x * 100.0).round() as i32,
        }
    }

    /// The six geometric neighbours of a corner.
    ///
    /// Not every neighbour exists on a given board, and an existing one is
    /// only a real road partner if both corners share a tile; the board
    /// builder applies that filter.
    pub fn neighbors(&self) -> [VertexPoint; 6] {
        [
            VertexPoint::new(self.y + 50, self.x),
            VertexPoint::new(self.y - 50, self.x),
            VertexPoint::new(self.y - 25, self.x + 50),
            VertexPoint::new(self.y - 25, self.x - 50),
            VertexPoint::new(self.y + 25, self.x - 50),
            VertexPoint::new(self.y + 25, self.x + 50),
        ]
    }

    /// Canonical text key, e.g. `"0.75,1.50"`.
    pub fn key(&self) -> String {
        format!("{},{}", fixed2(self.y), fixed2(self.x))
    }
}

impl fmt::Display for VertexPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for VertexPoint {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CoordError::Vertex(s.to_string());
        let (y, x) = s.split_once(',').ok_or_else(err)?;
        let y: f64 = y.trim().parse().map_err(|_| err())?;
        let x: f64 = x.trim().parse().map_err(|_| err())?;
        if !y.is_finite() || !x.is_finite() {
            return Err(err());
        }
        Ok(Self::from_units(y, x))
    }
}

/// Format hundredths with exactly two decimals (`-50` -> `"-0.50"`).
fn fixed2(hundredths: i32) -> String {
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Canonical key of the edge between two corners: both vertex keys, sorted
/// lexicographically and joined with `-`.
pub fn edge_key(a: &VertexPoint, b: &VertexPoint) -> String {
    let (a, b) = (a.key(), b.key());
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

/// Split an edge key back into its two corners.
///
/// The separator is the first `-` that directly follows a digit, so keys with
/// negative coordinates (`"-0.50,1.00--0.25,1.50"`) still parse.
pub fn split_edge_key(key: &str) -> Result<(VertexPoint, VertexPoint), CoordError> {
    let err = || CoordError::Edge(key.to_string());
    let bytes = key.as_bytes();
    let split = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && bytes[i - 1].is_ascii_digit())
        .ok_or_else(err)?;
    let a = key[..split].parse().map_err(|_| err())?;
    let b = key[split + 1..].parse().map_err(|_| err())?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_even_row() {
        let corners = TileCoord::new(0, 1).corners();
        assert_eq!(corners[0], VertexPoint::new(50, 100));
        assert_eq!(corners[1], VertexPoint::new(-50, 100));
        assert_eq!(corners[2], VertexPoint::new(-25, 150));
    }

    #[test]
    fn test_corners_odd_row_shifted() {
        let corners = TileCoord::new(1, 1).corners();
        // center is at (0.75, 1.5)
        assert_eq!(corners[0], VertexPoint::new(125, 150));
        assert_eq!(corners[1], VertexPoint::new(25, 150));
    }

    #[test]
    fn test_adjacent_rows_share_corners() {
        let upper = TileCoord::new(0, 1).corners();
        let lower = TileCoord::new(1, 1).corners();
        let shared = upper.iter().filter(|c| lower.contains(c)).count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn test_corner_neighbors_are_mutual() {
        let point = VertexPoint::new(25, 150);
        for neighbor in point.neighbors() {
            assert!(neighbor.neighbors().contains(&point));
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(VertexPoint::new(125, 150).key(), "1.25,1.50");
        assert_eq!(VertexPoint::new(-50, 100).key(), "-0.50,1.00");
        assert_eq!(VertexPoint::new(-25, 0).key(), "-0.25,0.00");
    }

    #[test]
    fn test_key_roundtrip() {
        let point = VertexPoint::new(-25, 350);
        assert_eq!(point.key().parse::<VertexPoint>().unwrap(), point);
    }

    #[test]
    fn test_edge_key_is_sorted() {
        let a = VertexPoint::new(125, 150);
        let b = VertexPoint::new(100, 100);
        assert_eq!(edge_key(&a, &b), "1.00,1.00-1.25,1.50");
        assert_eq!(edge_key(&a, &b), edge_key(&b, &a));
    }

    #[test]
    fn test_split_edge_key_with_negative() {
        let a = VertexPoint::new(-50, 100);
        let b = VertexPoint::new(-25, 150);
        let key = edge_key(&a, &b);
        let (x, y) = split_edge_key(&key).unwrap();
        assert!([x, y].contains(&a) && [x, y].contains(&b));
    }

    #[test]
    fn test_split_edge_key_rejects_garbage() {
        assert!(split_edge_key("nonsense").is_err());
        assert!(split_edge_key("1.00,1.00").is_err());
    }

    #[test]
    fn test_tile_coord_parse() {
        assert_eq!("4,2".parse::<TileCoord>().unwrap(), TileCoord::new(4, 2));
        assert!("4".parse::<TileCoord>().is_err());
        assert!("-1,2".parse::<TileCoord>().is_err());
    }
}
