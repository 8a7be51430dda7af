//! # Perimeter Walls
//!
//! Rings the village with walls, corner towers, and a single gate centered
//! on the south edge. Wall pieces hug the map boundary, so their tiles are
//! claimed forcefully (clamped, no collision checks) rather than through
//! the checked placement path buildings use.

use crate::map::grid::{TileGrid, WorldPos};
use crate::map::structures::{PlacedStructure, Rotation, StructureKind, StructurePrototype};
use crate::map::Catalog;
use log::{info, warn};

/// Overlap factor between consecutive wall segments. Segments are placed
/// slightly closer than their own length so small float drift never opens
/// a visible seam.
const SEGMENT_OVERLAP: f32 = 0.97;

/// Builds the perimeter ring around the map.
pub struct WallSpawner;

impl WallSpawner {
    /// Runs the perimeter pass, appending placements to `structures`.
    ///
    /// Needs one prototype each of [`StructureKind::Wall`],
    /// [`StructureKind::Tower`], and [`StructureKind::Gate`] in the
    /// catalog; if any is missing the pass logs a warning and places
    /// nothing. Returns the number of pieces placed.
    pub fn spawn(
        catalog: &Catalog,
        grid: &mut TileGrid,
        structures: &mut Vec<PlacedStructure>,
    ) -> usize {
        let Some(wall) = catalog.first_of_kind(StructureKind::Wall).cloned() else {
            warn!("wall catalog has no wall prototype, skipping perimeter");
            return 0;
        };
        let Some(tower) = catalog.first_of_kind(StructureKind::Tower).cloned() else {
            warn!("wall catalog has no tower prototype, skipping perimeter");
            return 0;
        };
        let Some(gate) = catalog.first_of_kind(StructureKind::Gate).cloned() else {
            warn!("wall catalog has no gate prototype, skipping perimeter");
            return 0;
        };

        let half_w = grid.world_width() / 2.0;
        let half_l = grid.world_length() / 2.0;
        let origin = grid.origin;

        let sw = WorldPos::new(origin.x - half_w, origin.z - half_l);
        let se = WorldPos::new(origin.x + half_w, origin.z - half_l);
        let nw = WorldPos::new(origin.x - half_w, origin.z + half_l);
        let ne = WorldPos::new(origin.x + half_w, origin.z + half_l);

        let mut placed = 0;

        for corner in [sw, se, nw, ne] {
            placed += Self::place_piece(&tower, corner, Rotation::Deg0, grid, structures);
        }

        // Gate sits centered on the south edge, facing outward (-z).
        let gate_pos = WorldPos::new(origin.x, origin.z - half_l);
        placed += Self::place_piece(&gate, gate_pos, Rotation::Deg180, grid, structures);

        // West and east runs travel along z, so their segments turn 90
        // degrees.
        placed += Self::place_run(&wall, sw, nw, Rotation::Deg90, grid, structures);
        placed += Self::place_run(&wall, se, ne, Rotation::Deg90, grid, structures);

        // North run is unbroken; the south run splits around the gate.
        placed += Self::place_run(&wall, nw, ne, Rotation::Deg0, grid, structures);
        let gate_half = gate.width / 2.0;
        let gate_min = WorldPos::new(gate_pos.x - gate_half, gate_pos.z);
        let gate_max = WorldPos::new(gate_pos.x + gate_half, gate_pos.z);
        placed += Self::place_run(&wall, sw, gate_min, Rotation::Deg0, grid, structures);
        placed += Self::place_run(&wall, gate_max, se, Rotation::Deg0, grid, structures);

        info!("perimeter pass placed {} pieces", placed);
        placed
    }

    /// Places one piece at a position with forceful tile assignment.
    fn place_piece(
        prototype: &StructurePrototype,
        position: WorldPos,
        rotation: Rotation,
        grid: &mut TileGrid,
        structures: &mut Vec<PlacedStructure>,
    ) -> usize {
        let mut piece = PlacedStructure::from_prototype(prototype, position, rotation);
        let id = structures.len();
        piece.assign_tiles_forcefully(id, grid);
        structures.push(piece);
        1
    }

    /// Lays wall segments along a straight run from `from` to `to`.
    ///
    /// Segment pitch is the prototype length scaled by the overlap factor;
    /// segments are centered along the run and the run is skipped entirely
    /// when it is shorter than one segment.
    fn place_run(
        wall: &StructurePrototype,
        from: WorldPos,
        to: WorldPos,
        rotation: Rotation,
        grid: &mut TileGrid,
        structures: &mut Vec<PlacedStructure>,
    ) -> usize {
        let run_length = from.distance(to);
        let pitch = wall.width * SEGMENT_OVERLAP;
        if pitch <= 0.0 || run_length < pitch {
            return 0;
        }

        let count = (run_length / pitch).floor() as usize;
        // Split the leftover length across both ends so the seam does not
        // pile up at `to`.
        let lead = (run_length - count as f32 * pitch) / 2.0;
        let mut placed = 0;
        for i in 0..count {
            let offset = lead + pitch * (i as f32 + 0.5);
            let t = offset / run_length;
            let position = from.lerp(to, t);
            placed += Self::place_piece(wall, position, rotation, grid, structures);
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::CatalogEntry;

    fn wall_catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new(
                StructurePrototype::new("wall", StructureKind::Wall, 20.0, 4.0),
                1.0,
                usize::MAX,
            ),
            CatalogEntry::new(
                StructurePrototype::new("tower", StructureKind::Tower, 8.0, 8.0),
                1.0,
                usize::MAX,
            ),
            CatalogEntry::new(
                StructurePrototype::new("gate", StructureKind::Gate, 16.0, 6.0),
                1.0,
                usize::MAX,
            ),
        ])
    }

    fn grid() -> TileGrid {
        TileGrid::new(20, 20, 10.0, WorldPos::new(0.0, 0.0))
    }

    #[test]
    fn test_perimeter_has_towers_gate_and_walls() {
        let mut grid = grid();
        let mut structures = Vec::new();
        let placed = WallSpawner::spawn(&wall_catalog(), &mut grid, &mut structures);

        assert_eq!(placed, structures.len());
        let towers = structures
            .iter()
            .filter(|s| s.kind == StructureKind::Tower)
            .count();
        let gates: Vec<_> = structures
            .iter()
            .filter(|s| s.kind == StructureKind::Gate)
            .collect();
        let walls = structures
            .iter()
            .filter(|s| s.kind == StructureKind::Wall)
            .count();

        assert_eq!(towers, 4);
        assert_eq!(gates.len(), 1);
        assert!(walls > 0);

        // Gate centered on the south edge, facing outward.
        let gate = gates[0];
        assert_eq!(gate.position.x, 0.0);
        assert_eq!(gate.position.z, -100.0);
        assert_eq!(gate.yaw, 180.0);
        assert!(gate.anchor.is_some());
    }

    #[test]
    fn test_missing_gate_prototype_skips_perimeter() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new(
                StructurePrototype::new("wall", StructureKind::Wall, 20.0, 4.0),
                1.0,
                usize::MAX,
            ),
            CatalogEntry::new(
                StructurePrototype::new("tower", StructureKind::Tower, 8.0, 8.0),
                1.0,
                usize::MAX,
            ),
        ]);
        let mut grid = grid();
        let mut structures = Vec::new();

        let placed = WallSpawner::spawn(&catalog, &mut grid, &mut structures);
        assert_eq!(placed, 0);
        assert!(structures.is_empty());
        assert!(grid.iter().all(|t| !t.is_part_of_building));
    }

    #[test]
    fn test_south_run_leaves_room_for_gate() {
        let mut grid = grid();
        let mut structures = Vec::new();
        WallSpawner::spawn(&wall_catalog(), &mut grid, &mut structures);

        let gate = structures
            .iter()
            .find(|s| s.kind == StructureKind::Gate)
            .unwrap();
        let (gate_min, gate_max) = gate.bounds();

        // No south-edge wall segment may reach into the gate's span.
        for wall in structures.iter().filter(|s| s.kind == StructureKind::Wall) {
            if (wall.position.z - gate.position.z).abs() > 1.0 {
                continue;
            }
            let (min, max) = wall.bounds();
            assert!(
                max.x <= gate_min.x + 1e-3 || min.x >= gate_max.x - 1e-3,
                "wall segment at {:?} overlaps the gate span",
                wall.position
            );
        }
    }

    #[test]
    fn test_wall_runs_center_their_slack() {
        let mut grid = grid();
        let mut structures = Vec::new();
        WallSpawner::spawn(&wall_catalog(), &mut grid, &mut structures);

        // The unbroken north run is symmetric about the map center: the
        // leftover length splits evenly between both corners.
        let north: Vec<f32> = structures
            .iter()
            .filter(|s| s.kind == StructureKind::Wall && (s.position.z - 100.0).abs() < 1.0)
            .map(|s| s.position.x)
            .collect();
        assert!(!north.is_empty());
        let min = north.iter().copied().fold(f32::INFINITY, f32::min);
        let max = north.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!((min + max).abs() < 1e-3);
    }

    #[test]
    fn test_wall_tiles_marked_without_anchor() {
        let mut grid = grid();
        let mut structures = Vec::new();
        WallSpawner::spawn(&wall_catalog(), &mut grid, &mut structures);

        for piece in structures
            .iter()
            .filter(|s| matches!(s.kind, StructureKind::Wall | StructureKind::Tower))
        {
            assert!(piece.anchor.is_none());
            assert!(!piece.footprint.is_empty());
            for &tile in &piece.footprint {
                assert!(grid.tile(tile).is_part_of_building);
            }
        }
    }
}
