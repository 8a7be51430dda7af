//! # Tile Grid
//!
//! The foundational data structure of map generation: a flat arena of tiles
//! with precomputed world-space geometry and cardinal neighbor links.
//!
//! Tiles are addressed by index (`TileId`) rather than reference, so placers
//! and the path router can mutate occupancy flags freely while structures
//! record which tiles they own.

use crate::map::StructureId;
use serde::{Deserialize, Serialize};

/// Index of a tile within the grid arena.
pub type TileId = usize;

/// Integer grid coordinates of a tile.
///
/// # Examples
///
/// ```
/// use hamlet::GridPos;
///
/// let pos = GridPos::new(3, 7);
/// assert_eq!(pos.x, 3);
/// assert_eq!(pos.z, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub z: usize,
}

impl GridPos {
    /// Creates a new grid position.
    pub fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

/// A 2D point in world space on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub z: f32,
}

impl WorldPos {
    /// Creates a new world position.
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance to another point.
    ///
    /// # Examples
    ///
    /// ```
    /// use hamlet::WorldPos;
    ///
    /// let a = WorldPos::new(0.0, 0.0);
    /// let b = WorldPos::new(3.0, 4.0);
    /// assert_eq!(a.manhattan_distance(b), 7.0);
    /// ```
    pub fn manhattan_distance(self, other: WorldPos) -> f32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_squared(self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: WorldPos) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(self, other: WorldPos, t: f32) -> WorldPos {
        WorldPos::new(
            self.x + (other.x - self.x) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Midpoint between two points.
    pub fn midpoint(self, other: WorldPos) -> WorldPos {
        self.lerp(other, 0.5)
    }
}

/// A single map tile with spatial and occupancy metadata.
///
/// Created once at grid initialization, mutated by every placer pass, and
/// discarded only when the whole grid regenerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Grid coordinates of this tile.
    pub grid_pos: GridPos,
    /// World-space center of the tile.
    pub center: WorldPos,
    /// World-space anchor on the tile's front edge, used for building-facing
    /// path connections. Updated by the path router once a building is
    /// re-oriented toward its walkway.
    pub front_anchor: WorldPos,
    /// Cardinal neighbor tile ids (west, south, east, north order; edge
    /// tiles have fewer).
    pub neighbors: Vec<TileId>,
    /// Whether this tile is the anchor tile of a placed building.
    pub is_building_anchor: bool,
    /// Whether this tile lies within any structure footprint.
    pub is_part_of_building: bool,
    /// Whether this tile belongs to the painted walkway network.
    pub is_path: bool,
    /// Whether a decoration occupies this tile.
    pub is_decoration: bool,
    /// Whether the narrative clue sits on this tile.
    pub is_clue: bool,
    /// The structure occupying this tile, if any. The tile records occupancy
    /// only; ownership lives with the placement list.
    pub structure: Option<StructureId>,
}

impl Tile {
    fn new(grid_pos: GridPos, center: WorldPos, front_anchor: WorldPos) -> Self {
        Self {
            grid_pos,
            center,
            front_anchor,
            neighbors: Vec::new(),
            is_building_anchor: false,
            is_part_of_building: false,
            is_path: false,
            is_decoration: false,
            is_clue: false,
            structure: None,
        }
    }

    /// Whether any structure, path, or decoration occupies this tile.
    pub fn is_free(&self) -> bool {
        !self.is_part_of_building && !self.is_path && !self.is_decoration && !self.is_clue
    }
}

/// The full tile grid: a flat arena indexed by `TileId`.
///
/// # Examples
///
/// ```
/// use hamlet::{TileGrid, WorldPos};
///
/// let grid = TileGrid::new(10, 8, 10.0, WorldPos::new(0.0, 0.0));
/// assert_eq!(grid.len(), 80);
/// assert_eq!(grid.tile_at(0, 0).neighbors.len(), 2); // corner
/// assert_eq!(grid.tile_at(5, 4).neighbors.len(), 4); // interior
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    /// Width of the grid in tiles.
    pub width: usize,
    /// Length of the grid in tiles.
    pub length: usize,
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// World-space center of the map.
    pub origin: WorldPos,
}

impl TileGrid {
    /// Builds a fresh grid, computing every tile's world geometry and
    /// caching cardinal neighbor links. Deterministic; callable repeatedly
    /// for full regeneration.
    pub fn new(width: usize, length: usize, tile_size: f32, origin: WorldPos) -> Self {
        let map_width = width as f32 * tile_size;
        let map_length = length as f32 * tile_size;
        let mut tiles = Vec::with_capacity(width * length);

        for x in 0..width {
            for z in 0..length {
                let center = WorldPos::new(
                    origin.x - map_width / 2.0 + x as f32 * tile_size + tile_size / 2.0,
                    origin.z - map_length / 2.0 + z as f32 * tile_size + tile_size / 2.0,
                );
                // Front anchor sits on the +x edge until the path router
                // re-orients the building toward its walkway.
                let front_anchor = WorldPos::new(
                    origin.x - map_width / 2.0 + x as f32 * tile_size + tile_size,
                    origin.z - map_length / 2.0 + z as f32 * tile_size + tile_size / 2.0,
                );
                tiles.push(Tile::new(GridPos::new(x, z), center, front_anchor));
            }
        }

        let mut grid = Self {
            tiles,
            width,
            length,
            tile_size,
            origin,
        };

        for x in 0..width {
            for z in 0..length {
                let mut neighbors = Vec::with_capacity(4);
                if x > 0 {
                    neighbors.push(grid.index_of(x - 1, z));
                }
                if z > 0 {
                    neighbors.push(grid.index_of(x, z - 1));
                }
                if x < width - 1 {
                    neighbors.push(grid.index_of(x + 1, z));
                }
                if z < length - 1 {
                    neighbors.push(grid.index_of(x, z + 1));
                }
                let id = grid.index_of(x, z);
                grid.tiles[id].neighbors = neighbors;
            }
        }

        grid
    }

    /// Total number of tiles in the arena.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the grid holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Map width in world units.
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// Map length in world units.
    pub fn world_length(&self) -> f32 {
        self.length as f32 * self.tile_size
    }

    /// Flat index of the tile at grid coordinates.
    pub fn index_of(&self, x: usize, z: usize) -> TileId {
        x * self.length + z
    }

    /// Grid index of the tile containing a world position, if in bounds.
    pub fn index_at_world(&self, pos: WorldPos) -> Option<TileId> {
        let x = ((pos.x - self.origin.x + self.world_width() / 2.0) / self.tile_size).floor();
        let z = ((pos.z - self.origin.z + self.world_length() / 2.0) / self.tile_size).floor();
        if x < 0.0 || z < 0.0 || x >= self.width as f32 || z >= self.length as f32 {
            return None;
        }
        Some(self.index_of(x as usize, z as usize))
    }

    /// Grid coordinates of the tile containing a world coordinate, without
    /// bounds clamping. Used by footprint assignment, which needs to detect
    /// out-of-bounds footprints rather than hide them.
    pub fn grid_coords_unclamped(&self, pos: WorldPos) -> (i64, i64) {
        let x = ((pos.x - self.origin.x + self.world_width() / 2.0) / self.tile_size).floor();
        let z = ((pos.z - self.origin.z + self.world_length() / 2.0) / self.tile_size).floor();
        (x as i64, z as i64)
    }

    /// Borrow a tile by flat id.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    /// Mutably borrow a tile by flat id.
    pub fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id]
    }

    /// Borrow a tile by grid coordinates.
    pub fn tile_at(&self, x: usize, z: usize) -> &Tile {
        &self.tiles[self.index_of(x, z)]
    }

    /// Iterator over all tiles.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// All tile ids, in arena order.
    pub fn ids(&self) -> Vec<TileId> {
        (0..self.tiles.len()).collect()
    }

    /// Finds the free tile nearest a world position, skipping occupied
    /// tiles. Squared-distance search over the whole arena.
    pub fn nearest_unoccupied(&self, target: WorldPos) -> Option<TileId> {
        let mut best = None;
        let mut best_dist = f32::MAX;
        for (id, tile) in self.tiles.iter().enumerate() {
            if tile.is_part_of_building {
                continue;
            }
            let dist = tile.center.distance_squared(target);
            if dist < best_dist {
                best_dist = dist;
                best = Some(id);
            }
        }
        best
    }

    /// Like [`nearest_unoccupied`](Self::nearest_unoccupied) but also skips
    /// path and decoration tiles. Used for clue placement.
    pub fn nearest_free(&self, target: WorldPos) -> Option<TileId> {
        let mut best = None;
        let mut best_dist = f32::MAX;
        for (id, tile) in self.tiles.iter().enumerate() {
            if tile.is_part_of_building || tile.is_path || tile.is_decoration {
                continue;
            }
            let dist = tile.center.distance_squared(target);
            if dist < best_dist {
                best_dist = dist;
                best = Some(id);
            }
        }
        best
    }

    /// ASCII occupancy dump, one row per z coordinate from far to near.
    /// Useful for eyeballing generated layouts in logs.
    pub fn occupancy_dump(&self) -> String {
        let mut out = String::new();
        for z in (0..self.length).rev() {
            for x in 0..self.width {
                let tile = self.tile_at(x, z);
                let glyph = if tile.is_building_anchor {
                    "[B]"
                } else if tile.is_part_of_building {
                    "[x]"
                } else if tile.is_path {
                    "[.]"
                } else if tile.is_decoration {
                    "[d]"
                } else if tile.is_clue {
                    "[?]"
                } else {
                    "[ ]"
                };
                out.push_str(glyph);
            }
            out.push('\n');
        }
        out
    }
}
