//! Longest road calculation.
//!
//! A player's road length is the longest simple path (no vertex repeated)
//! through their own road edges. A vertex holding an opponent's building
//! cuts the network: a path may end there but not pass through. Only edges
//! between vertices on a common tile are walked.

use crate::board::{Board, VertexId};
use std::collections::{HashMap, HashSet};

impl Board {
    /// Length of `player`'s longest continuous road.
    pub fn longest_road(&self, player: &str) -> u32 {
        let mut adjacency: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
        for edge in self.edges() {
            let [a, b] = edge.ends;
            // roads on edges whose ends share no tile never join a path
            if edge.road.as_ref().is_some_and(|r| r.owner == player) && self.shares_tile(a, b) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }

        let mut visited = HashSet::new();
        adjacency
            .keys()
            .map(|&start| {
                visited.insert(start);
                let length = self.extend_path(player, start, &adjacency, &mut visited);
                visited.remove(&start);
                length
            })
            .max()
            .unwrap_or(0)
    }

    /// Longest continuation from `at` that avoids `visited`.
    fn extend_path(
        &self,
        player: &str,
        at: VertexId,
        adjacency: &HashMap<VertexId, Vec<VertexId>>,
        visited: &mut HashSet<VertexId>,
    ) -> u32 {
        let Some(neighbors) = adjacency.get(&at) else {
            return 0;
        };

        let mut best = 0;
        for &next in neighbors {
            if visited.contains(&next) {
                continue;
            }
            let length = if self.blocks_road(next, player) {
                1
            } else {
                visited.insert(next);
                let length = 1 + self.extend_path(player, next, adjacency, visited);
                visited.remove(&next);
                length
            };
            best = best.max(length);
        }
        best
    }

    fn blocks_road(&self, vertex: VertexId, player: &str) -> bool {
        self.vertex(vertex).owner().is_some_and(|owner| owner != player)
    }
}
