//! # Structures
//!
//! Prototypes and placements. A [`StructurePrototype`] describes a kind of
//! structure and its footprint in world units; a [`PlacedStructure`] is one
//! instance dropped onto the map with a position, a rotation, and the tile
//! ids it occupies.
//!
//! Footprint assignment comes in two flavors: the checked variant used by
//! building and decoration placement, which rejects overlaps and
//! out-of-bounds footprints, and the forceful variant used by the wall
//! builder, which clamps into bounds and overwrites whatever is there.

use crate::map::grid::{TileGrid, TileId, WorldPos};
use serde::{Deserialize, Serialize};

/// Index of a placed structure within the placement list.
pub type StructureId = usize;

/// The kind of structure a prototype produces.
///
/// Placers filter catalogs by kind: the wall builder looks for the first
/// `Wall`, `Tower`, and `Gate` prototypes, the building spawner draws from
/// dwelling kinds, and the clue spawner places a single `Clue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    House,
    Church,
    Well,
    Blacksmith,
    Tavern,
    Wall,
    Tower,
    Gate,
    Tree,
    Decoration,
    Clue,
}

impl StructureKind {
    /// Whether this kind participates in path routing as a destination.
    pub fn wants_path_connection(self) -> bool {
        matches!(
            self,
            StructureKind::House
                | StructureKind::Church
                | StructureKind::Well
                | StructureKind::Blacksmith
                | StructureKind::Tavern
                | StructureKind::Gate
        )
    }
}

/// Cardinal placement rotation, in 90 degree steps around the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All four rotations, for random selection.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Yaw angle in degrees.
    pub fn yaw(self) -> f32 {
        match self {
            Rotation::Deg0 => 0.0,
            Rotation::Deg90 => 90.0,
            Rotation::Deg180 => 180.0,
            Rotation::Deg270 => 270.0,
        }
    }

    /// Whether this rotation swaps the footprint's width and depth.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// A reusable structure description: what to place and how big it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructurePrototype {
    /// Prototype name, unique within a catalog.
    pub name: String,
    /// Kind of structure this prototype produces.
    pub kind: StructureKind,
    /// Footprint width in world units (x axis at zero rotation).
    pub width: f32,
    /// Footprint depth in world units (z axis at zero rotation).
    pub depth: f32,
}

impl StructurePrototype {
    /// Creates a prototype.
    ///
    /// # Examples
    ///
    /// ```
    /// use hamlet::{StructureKind, StructurePrototype};
    ///
    /// let proto = StructurePrototype::new("well", StructureKind::Well, 6.0, 6.0);
    /// assert_eq!(proto.kind, StructureKind::Well);
    /// ```
    pub fn new(name: impl Into<String>, kind: StructureKind, width: f32, depth: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            width,
            depth,
        }
    }
}

/// One structure instance placed on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedStructure {
    /// Name of the prototype this was instantiated from.
    pub name: String,
    /// Kind of structure.
    pub kind: StructureKind,
    /// World-space center of the footprint.
    pub position: WorldPos,
    /// Yaw in degrees. Placement sets a cardinal rotation; the path router
    /// later refines it to face the connecting walkway.
    pub yaw: f32,
    /// Footprint width in world units, after rotation.
    pub width: f32,
    /// Footprint depth in world units, after rotation.
    pub depth: f32,
    /// Tile ids covered by the footprint.
    pub footprint: Vec<TileId>,
    /// The anchor tile the path router connects to, if this structure has
    /// one.
    pub anchor: Option<TileId>,
}

impl PlacedStructure {
    /// Instantiates a prototype at a position with a cardinal rotation,
    /// with no tiles assigned yet.
    pub fn from_prototype(
        prototype: &StructurePrototype,
        position: WorldPos,
        rotation: Rotation,
    ) -> Self {
        let (width, depth) = if rotation.swaps_axes() {
            (prototype.depth, prototype.width)
        } else {
            (prototype.width, prototype.depth)
        };
        Self {
            name: prototype.name.clone(),
            kind: prototype.kind,
            position,
            yaw: rotation.yaw(),
            width,
            depth,
            footprint: Vec::new(),
            anchor: None,
        }
    }

    /// World-space bounding box corners of the footprint, (min, max).
    pub fn bounds(&self) -> (WorldPos, WorldPos) {
        let half_w = self.width / 2.0;
        let half_d = self.depth / 2.0;
        (
            WorldPos::new(self.position.x - half_w, self.position.z - half_d),
            WorldPos::new(self.position.x + half_w, self.position.z + half_d),
        )
    }

    /// Claims the footprint's tiles on the grid, checking first.
    ///
    /// Rejects the placement when any covered tile falls outside the grid
    /// or is already part of another structure; the grid is untouched on
    /// rejection. On success every covered tile is marked occupied, the
    /// footprint list is filled, and for anchored kinds the tile closest to
    /// the footprint center becomes the anchor.
    pub fn assign_occupied_tiles(&mut self, id: StructureId, grid: &mut TileGrid) -> bool {
        let (min, max) = self.bounds();
        let (min_x, min_z) = grid.grid_coords_unclamped(min);
        // Pull the max corner inward slightly so a footprint flush with a
        // tile boundary does not claim the next row over.
        let eps = 1e-3;
        let (max_x, max_z) =
            grid.grid_coords_unclamped(WorldPos::new(max.x - eps, max.z - eps));

        if min_x < 0
            || min_z < 0
            || max_x >= grid.width as i64
            || max_z >= grid.length as i64
        {
            return false;
        }

        let mut covered = Vec::new();
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                let tile = grid.index_of(x as usize, z as usize);
                if grid.tile(tile).is_part_of_building {
                    return false;
                }
                covered.push(tile);
            }
        }

        for &tile in &covered {
            let t = grid.tile_mut(tile);
            t.is_part_of_building = true;
            t.structure = Some(id);
        }

        if !matches!(self.kind, StructureKind::Wall | StructureKind::Tower) {
            if let Some(&anchor) = covered.iter().min_by(|&&a, &&b| {
                let da = grid.tile(a).center.distance_squared(self.position);
                let db = grid.tile(b).center.distance_squared(self.position);
                da.total_cmp(&db)
            }) {
                grid.tile_mut(anchor).is_building_anchor = true;
                self.anchor = Some(anchor);
            }
        }

        self.footprint = covered;
        true
    }

    /// Claims the footprint's tiles without collision checks, clamping the
    /// covered rectangle into grid bounds. Wall segments and towers hug the
    /// map edge, so parts of their footprints routinely poke outside.
    pub fn assign_tiles_forcefully(&mut self, id: StructureId, grid: &mut TileGrid) {
        let (min, max) = self.bounds();
        let (min_x, min_z) = grid.grid_coords_unclamped(min);
        let eps = 1e-3;
        let (max_x, max_z) =
            grid.grid_coords_unclamped(WorldPos::new(max.x - eps, max.z - eps));

        let min_x = min_x.clamp(0, grid.width as i64 - 1) as usize;
        let max_x = max_x.clamp(0, grid.width as i64 - 1) as usize;
        let min_z = min_z.clamp(0, grid.length as i64 - 1) as usize;
        let max_z = max_z.clamp(0, grid.length as i64 - 1) as usize;

        let mut covered = Vec::new();
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                let tile = grid.index_of(x, z);
                let t = grid.tile_mut(tile);
                t.is_part_of_building = true;
                t.structure = Some(id);
                covered.push(tile);
            }
        }

        // Of the perimeter pieces only the gate is a path destination.
        if self.kind == StructureKind::Gate {
            if let Some(&anchor) = covered.iter().min_by(|&&a, &&b| {
                let da = grid.tile(a).center.distance_squared(self.position);
                let db = grid.tile(b).center.distance_squared(self.position);
                da.total_cmp(&db)
            }) {
                grid.tile_mut(anchor).is_building_anchor = true;
                self.anchor = Some(anchor);
            }
        }

        self.footprint = covered;
    }
}
