//! # Map Generator
//!
//! Orchestrates the generation passes into a finished village. Generation
//! is blocking and deterministic per seed: terrain reset, grid build,
//! perimeter, buildings, paths, decorations, in that order. The clue is
//! placed separately once the narrative picks its building.

use crate::map::buildings::BuildingSpawner;
use crate::map::clue::ClueSpawner;
use crate::map::decorations::DecorationSpawner;
use crate::map::grid::{TileGrid, TileId, WorldPos};
use crate::map::paths::PathRouter;
use crate::map::structures::{PlacedStructure, StructureId, StructureKind, StructurePrototype};
use crate::map::terrain::Terrain;
use crate::map::walls::WallSpawner;
use crate::map::{Catalog, CatalogEntry, GenerationConfig};
use crate::{HamletError, HamletResult};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A fully generated village: the tile grid, the terrain it sits on, and
/// every placed structure. Read-only during gameplay.
pub struct VillageMap {
    pub grid: TileGrid,
    pub terrain: Terrain,
    pub structures: Vec<PlacedStructure>,
    /// Tile the narrative clue sits on, once placed.
    pub clue_tile: Option<TileId>,
}

impl VillageMap {
    /// Ids of structures that can be visited on foot (anchored,
    /// path-connected kinds).
    pub fn visitable(&self) -> Vec<StructureId> {
        self.structures
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind.wants_path_connection() && s.anchor.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// First placed structure of a kind, if any.
    pub fn first_of_kind(&self, kind: StructureKind) -> Option<(StructureId, &PlacedStructure)> {
        self.structures
            .iter()
            .enumerate()
            .find(|(_, s)| s.kind == kind)
    }
}

/// Runs the full generation pipeline for one configuration.
///
/// # Examples
///
/// ```
/// use hamlet::{GenerationConfig, MapGenerator};
///
/// let generator = MapGenerator::with_default_catalogs(GenerationConfig::for_testing(42));
/// let map = generator.generate_map().unwrap();
/// assert!(!map.structures.is_empty());
/// ```
pub struct MapGenerator {
    config: GenerationConfig,
    building_catalog: Catalog,
    wall_catalog: Catalog,
    decoration_catalog: Catalog,
    clue_catalog: Catalog,
}

impl MapGenerator {
    /// Creates a generator with explicit catalogs.
    pub fn new(
        config: GenerationConfig,
        building_catalog: Catalog,
        wall_catalog: Catalog,
        decoration_catalog: Catalog,
        clue_catalog: Catalog,
    ) -> Self {
        Self {
            config,
            building_catalog,
            wall_catalog,
            decoration_catalog,
            clue_catalog,
        }
    }

    /// Creates a generator with the stock village catalogs.
    pub fn with_default_catalogs(config: GenerationConfig) -> Self {
        let building_catalog = Catalog::new(vec![
            CatalogEntry::new(
                StructurePrototype::new("house", StructureKind::House, 12.0, 12.0),
                0.35,
                20,
            ),
            CatalogEntry::new(
                StructurePrototype::new("tavern", StructureKind::Tavern, 16.0, 12.0),
                0.15,
                2,
            ),
            CatalogEntry::new(
                StructurePrototype::new("church", StructureKind::Church, 18.0, 24.0),
                0.1,
                1,
            ),
            CatalogEntry::new(
                StructurePrototype::new("well", StructureKind::Well, 6.0, 6.0),
                0.1,
                1,
            ),
            CatalogEntry::new(
                StructurePrototype::new("blacksmith", StructureKind::Blacksmith, 14.0, 10.0),
                0.1,
                1,
            ),
        ]);
        let wall_catalog = Catalog::new(vec![
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
                1,
            ),
        ]);
        let decoration_catalog = Catalog::new(vec![
            CatalogEntry::new(
                StructurePrototype::new("oak", StructureKind::Tree, 4.0, 4.0),
                0.08,
                60,
            ),
            CatalogEntry::new(
                StructurePrototype::new("barrel", StructureKind::Decoration, 2.0, 2.0),
                0.04,
                20,
            ),
            CatalogEntry::new(
                StructurePrototype::new("cart", StructureKind::Decoration, 5.0, 3.0),
                0.02,
                6,
            ),
        ]);
        let clue_catalog = Catalog::new(vec![
            CatalogEntry::new(
                StructurePrototype::new("bloodied-knife", StructureKind::Clue, 1.0, 1.0),
                1.0,
                1,
            ),
            CatalogEntry::new(
                StructurePrototype::new("torn-letter", StructureKind::Clue, 1.0, 1.0),
                1.0,
                1,
            ),
        ]);
        Self::new(
            config,
            building_catalog,
            wall_catalog,
            decoration_catalog,
            clue_catalog,
        )
    }

    /// Borrow the generation configuration.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generates a village from scratch.
    ///
    /// Catalogs are cloned per run so the generator can regenerate the same
    /// (or a reseeded) map any number of times.
    pub fn generate_map(&self) -> HamletResult<VillageMap> {
        if self.config.width == 0 || self.config.length == 0 {
            return Err(HamletError::GenerationFailed(
                "map dimensions must be non-zero".to_string(),
            ));
        }

        info!(
            "generating {}x{} village with seed {}",
            self.config.width, self.config.length, self.config.seed
        );

        let origin = WorldPos::new(0.0, 0.0);
        let mut grid = TileGrid::new(
            self.config.width,
            self.config.length,
            self.config.tile_size,
            origin,
        );
        // Terrain::new leaves the splat map cleared to the base layer, so
        // regeneration never inherits old walkway paint.
        let mut terrain = Terrain::new(
            self.config.seed as u32,
            grid.world_width(),
            grid.world_length(),
            origin,
            self.config.height_amplitude,
        );

        let mut rng = self.config.create_rng();
        let mut structures = Vec::new();

        WallSpawner::spawn(&self.wall_catalog, &mut grid, &mut structures);

        let mut building_catalog = self.building_catalog.clone();
        BuildingSpawner::spawn(
            &self.config,
            &mut building_catalog,
            &mut grid,
            &mut structures,
            &mut rng,
        );

        PathRouter::route(&mut grid, &mut structures, &mut terrain);

        let mut decoration_catalog = self.decoration_catalog.clone();
        DecorationSpawner::spawn(&mut decoration_catalog, &mut grid, &mut structures, &mut rng);

        Ok(VillageMap {
            grid,
            terrain,
            structures,
            clue_tile: None,
        })
    }

    /// Places the narrative clue near a chosen structure's entrance.
    ///
    /// Separate from [`generate_map`](Self::generate_map) because the
    /// narrative layer picks the target after the map exists. Returns the
    /// clue's tile, or `None` when placement is impossible.
    pub fn generate_clue(&self, map: &mut VillageMap, target: StructureId) -> Option<TileId> {
        if target >= map.structures.len() {
            return None;
        }
        let target_structure = map.structures[target].clone();
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        let tile = ClueSpawner::spawn(
            &self.clue_catalog,
            &target_structure,
            &mut map.grid,
            &mut map.structures,
            &mut rng,
        );
        map.clue_tile = tile;
        tile
    }
}
