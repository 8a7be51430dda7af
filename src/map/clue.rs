//! # Clue Placement
//!
//! Drops the single narrative clue next to a chosen building's entrance.
//! The clue marker has to be reachable on foot, so it lands on the nearest
//! tile that is not inside a structure, on a path, or under a decoration.

use crate::map::grid::{TileGrid, TileId};
use crate::map::structures::{PlacedStructure, Rotation, StructureKind};
use crate::map::Catalog;
use log::{info, warn};
use rand::rngs::StdRng;

/// Places the narrative clue near a building entrance.
pub struct ClueSpawner;

impl ClueSpawner {
    /// Places one clue as close as possible to `target`'s entrance.
    ///
    /// The prototype is drawn uniformly from the catalog (the clue is
    /// unique, so weights and capacity do not apply). Returns the clue's
    /// tile id, or `None` when the catalog is empty, the target has no
    /// entrance anchor, or every tile near it is taken.
    pub fn spawn(
        catalog: &Catalog,
        target: &PlacedStructure,
        grid: &mut TileGrid,
        structures: &mut Vec<PlacedStructure>,
        rng: &mut StdRng,
    ) -> Option<TileId> {
        let Some(prototype) = catalog.pick_uniform(rng) else {
            warn!("clue catalog is empty, no clue placed");
            return None;
        };
        if prototype.kind != StructureKind::Clue {
            warn!("clue catalog entry {} is not a clue prototype", prototype.name);
        }

        let Some(anchor) = target.anchor else {
            warn!("clue target {} has no entrance anchor", target.name);
            return None;
        };

        let entrance = grid.tile(anchor).front_anchor;
        let Some(tile) = grid.nearest_free(entrance) else {
            warn!("no free tile near {} for the clue", target.name);
            return None;
        };

        let position = grid.tile(tile).center;
        let mut clue = PlacedStructure::from_prototype(&prototype, position, Rotation::Deg0);
        clue.footprint = vec![tile];

        let id = structures.len();
        let t = grid.tile_mut(tile);
        t.is_clue = true;
        t.structure = Some(id);
        structures.push(clue);

        info!(
            "clue {} placed at ({:.1}, {:.1}) near {}",
            prototype.name, position.x, position.z, target.name
        );
        Some(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::grid::WorldPos;
    use crate::map::structures::StructurePrototype;
    use crate::map::CatalogEntry;
    use rand::SeedableRng;

    fn clue_catalog() -> Catalog {
        Catalog::new(vec![CatalogEntry::new(
            StructurePrototype::new("bloodied-knife", StructureKind::Clue, 1.0, 1.0),
            1.0,
            1,
        )])
    }

    fn placed_house(grid: &mut TileGrid) -> PlacedStructure {
        let proto = StructurePrototype::new("house", StructureKind::House, 12.0, 12.0);
        let center = grid.tile_at(5, 5).center;
        let mut house =
            PlacedStructure::from_prototype(&proto, center, Rotation::Deg0);
        assert!(house.assign_occupied_tiles(0, grid));
        house
    }

    #[test]
    fn test_clue_lands_on_free_tile_near_entrance() {
        let mut grid = TileGrid::new(12, 12, 10.0, WorldPos::new(0.0, 0.0));
        let house = placed_house(&mut grid);
        let mut structures = vec![house.clone()];
        let mut rng = StdRng::seed_from_u64(9);

        let tile = ClueSpawner::spawn(
            &clue_catalog(),
            &house,
            &mut grid,
            &mut structures,
            &mut rng,
        )
        .unwrap();

        let t = grid.tile(tile);
        assert!(t.is_clue);
        assert!(!t.is_part_of_building);

        // Closest free tile to the entrance anchor wins.
        let entrance = grid.tile(house.anchor.unwrap()).front_anchor;
        let chosen_dist = t.center.distance_squared(entrance);
        for other in grid.iter() {
            if other.is_part_of_building || other.is_clue {
                continue;
            }
            assert!(other.center.distance_squared(entrance) >= chosen_dist - 1e-3);
        }
    }

    #[test]
    fn test_target_without_anchor_places_nothing() {
        let mut grid = TileGrid::new(12, 12, 10.0, WorldPos::new(0.0, 0.0));
        let proto = StructurePrototype::new("wall", StructureKind::Wall, 20.0, 4.0);
        let wall = PlacedStructure::from_prototype(
            &proto,
            grid.tile_at(0, 0).center,
            Rotation::Deg0,
        );
        let mut structures = Vec::new();
        let mut rng = StdRng::seed_from_u64(2);

        let tile = ClueSpawner::spawn(
            &clue_catalog(),
            &wall,
            &mut grid,
            &mut structures,
            &mut rng,
        );
        assert!(tile.is_none());
        assert!(structures.is_empty());
    }

    #[test]
    fn test_empty_catalog_places_nothing() {
        let mut grid = TileGrid::new(12, 12, 10.0, WorldPos::new(0.0, 0.0));
        let house = placed_house(&mut grid);
        let mut structures = vec![house.clone()];
        let mut rng = StdRng::seed_from_u64(3);

        let tile = ClueSpawner::spawn(
            &Catalog::default(),
            &house,
            &mut grid,
            &mut structures,
            &mut rng,
        );
        assert!(tile.is_none());
    }
}
