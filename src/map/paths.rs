//! # Path Routing
//!
//! Connects building entrances with a walkway network. Each connectable
//! structure contributes one connection tile (the free tile nearest its
//! entrance); the router orders those tiles into a short open tour
//! (nearest-neighbor seeded, 2-opt refined, Manhattan metric), walks each
//! consecutive pair with BFS around building footprints, marks the route
//! tiles, and paints the walkway onto the terrain splat map. Buildings are
//! finally turned to face the path that reaches them.

use crate::map::grid::{TileGrid, TileId, WorldPos};
use crate::map::structures::PlacedStructure;
use crate::map::terrain::Terrain;
use log::{debug, info, warn};
use pathfinding::prelude::bfs;

/// Stroke radius for the short building-to-path connectors.
const BUILDING_STROKE_RADIUS: f32 = 0.7;
/// Stroke radius for the walkway network itself.
const PATH_STROKE_RADIUS: f32 = 2.0;

/// Routes and paints the walkway network.
pub struct PathRouter;

impl PathRouter {
    /// Runs the routing pass.
    ///
    /// With fewer than two connectable structures the pass is a silent
    /// no-op. Pairs the BFS cannot connect (entrances sealed in by other
    /// footprints) are skipped, leaving a gap rather than failing the
    /// whole pass. Returns the number of tiles marked as path.
    pub fn route(
        grid: &mut TileGrid,
        structures: &mut [PlacedStructure],
        terrain: &mut Terrain,
    ) -> usize {
        let connections = Self::connection_tiles(grid, structures);
        if connections.len() < 2 {
            return 0;
        }

        let centers: Vec<WorldPos> = connections
            .iter()
            .map(|&(_, tile)| grid.tile(tile).center)
            .collect();
        let matrix = manhattan_matrix(&centers);
        let tour = two_opt(&matrix, nearest_neighbor(&matrix));
        debug!(
            "routing {} connection tiles, tour length {:.1}",
            tour.len(),
            tour_length(&matrix, &tour)
        );

        let mut route: Vec<TileId> = Vec::new();
        for pair in tour.windows(2) {
            let from = connections[pair[0]].1;
            let to = connections[pair[1]].1;
            match Self::bfs_segment(grid, from, to) {
                Some(mut segment) => {
                    // The joint tile is shared with the previous segment.
                    if route.last() == segment.first() {
                        segment.remove(0);
                    }
                    route.extend(segment);
                }
                None => warn!("no walkable route between tiles {} and {}", from, to),
            }
        }

        for &tile in &route {
            grid.tile_mut(tile).is_path = true;
        }

        Self::paint_and_orient(grid, structures, terrain);
        info!("path pass marked {} walkway tiles", route.len());
        route.len()
    }

    /// One connection tile per connectable structure: the free tile nearest
    /// the entrance anchor. Structures without an anchor are skipped with a
    /// warning.
    fn connection_tiles(
        grid: &TileGrid,
        structures: &[PlacedStructure],
    ) -> Vec<(usize, TileId)> {
        let mut connections = Vec::new();
        for (id, structure) in structures.iter().enumerate() {
            if !structure.kind.wants_path_connection() {
                continue;
            }
            let Some(anchor) = structure.anchor else {
                warn!("{} has no entrance anchor, skipping connection", structure.name);
                continue;
            };
            let entrance = grid.tile(anchor).front_anchor;
            match grid.nearest_unoccupied(entrance) {
                Some(tile) => connections.push((id, tile)),
                None => warn!("no free tile near {} to connect", structure.name),
            }
        }
        connections
    }

    /// Shortest tile path between two free tiles, stepping through cardinal
    /// neighbors and treating building footprints as impassable.
    fn bfs_segment(grid: &TileGrid, from: TileId, to: TileId) -> Option<Vec<TileId>> {
        bfs(
            &from,
            |&tile| {
                grid.tile(tile)
                    .neighbors
                    .iter()
                    .copied()
                    .filter(|&n| !grid.tile(n).is_part_of_building)
                    .collect::<Vec<_>>()
            },
            |&tile| tile == to,
        )
    }

    /// Paints the walkway and the building connectors by scanning tile
    /// adjacency. Adjacent walkway tiles get the wide stroke; a building
    /// tile bordering a walkway tile gets the narrow connector stroke and
    /// turns its owning structure to face that neighbor. Unreached
    /// buildings stay untouched, and with no walkway tiles at all nothing
    /// is painted.
    fn paint_and_orient(
        grid: &mut TileGrid,
        structures: &mut [PlacedStructure],
        terrain: &mut Terrain,
    ) {
        for id in 0..grid.len() {
            let tile = grid.tile(id);
            let center = tile.center;
            let neighbors = tile.neighbors.clone();

            if tile.is_path {
                for neighbor in neighbors {
                    // Each walkway edge paints once, from its lower id.
                    if neighbor > id && grid.tile(neighbor).is_path {
                        let to = grid.tile(neighbor).center;
                        terrain.paint_stroke(
                            center,
                            to,
                            PATH_STROKE_RADIUS,
                            crate::config::PATH_LAYER,
                        );
                    }
                }
            } else if tile.is_part_of_building {
                let occupant = tile.structure;
                for neighbor in neighbors {
                    if !grid.tile(neighbor).is_path {
                        continue;
                    }
                    let neighbor_center = grid.tile(neighbor).center;
                    terrain.paint_stroke(
                        center,
                        neighbor_center,
                        BUILDING_STROKE_RADIUS,
                        crate::config::PATH_LAYER,
                    );

                    let Some(sid) = occupant else { continue };
                    let structure = &mut structures[sid];
                    structure.yaw = yaw_toward(structure.position, neighbor_center);
                    // The entrance now opens onto the walkway, so the front
                    // anchor moves to the doorway edge.
                    if let Some(anchor) = structure.anchor {
                        grid.tile_mut(anchor).front_anchor = center.midpoint(neighbor_center);
                    }
                }
            }
        }
    }
}

/// Yaw in degrees that makes a structure at `from` face `to`, with 0
/// facing +z and 90 facing +x.
pub fn yaw_toward(from: WorldPos, to: WorldPos) -> f32 {
    (to.x - from.x).atan2(to.z - from.z).to_degrees()
}

/// Pairwise Manhattan distance matrix over a list of points.
pub fn manhattan_matrix(points: &[WorldPos]) -> Vec<Vec<f32>> {
    points
        .iter()
        .map(|&a| points.iter().map(|&b| a.manhattan_distance(b)).collect())
        .collect()
}

/// Greedy open tour: start at index 0, always hop to the nearest unvisited
/// point.
pub fn nearest_neighbor(matrix: &[Vec<f32>]) -> Vec<usize> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    let mut tour = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut current = 0;
    visited[0] = true;
    tour.push(0);

    for _ in 1..n {
        let next = (0..n)
            .filter(|&i| !visited[i])
            .min_by(|&a, &b| matrix[current][a].total_cmp(&matrix[current][b]));
        if let Some(next) = next {
            visited[next] = true;
            tour.push(next);
            current = next;
        }
    }
    tour
}

/// 2-opt refinement of an open tour: reverses segments whose reversal
/// strictly shortens the tour, repeating until a full sweep makes no
/// improvement. Never lengthens the input tour.
pub fn two_opt(matrix: &[Vec<f32>], mut tour: Vec<usize>) -> Vec<usize> {
    let n = tour.len();
    if n < 3 {
        return tour;
    }

    let mut improved = true;
    while improved {
        improved = false;
        for i in 1..n - 1 {
            for j in i + 1..n {
                let removed = matrix[tour[i - 1]][tour[i]]
                    + if j + 1 < n {
                        matrix[tour[j]][tour[j + 1]]
                    } else {
                        0.0
                    };
                let added = matrix[tour[i - 1]][tour[j]]
                    + if j + 1 < n {
                        matrix[tour[i]][tour[j + 1]]
                    } else {
                        0.0
                    };
                if added + 1e-6 < removed {
                    tour[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }
    tour
}

/// Total length of an open tour under a distance matrix.
pub fn tour_length(matrix: &[Vec<f32>], tour: &[usize]) -> f32 {
    tour.windows(2).map(|w| matrix[w[0]][w[1]]).sum()
}
