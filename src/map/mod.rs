//! # Map Generation Module
//!
//! Procedural village generation: a deterministic tile grid, weighted
//! structure catalogs, placer passes for buildings, perimeter walls,
//! decorations and the narrative clue, and a path router that connects
//! building entrances and paints the walkway network onto the terrain.
//!
//! Generation is a one-time blocking phase: every pass runs to completion
//! on the calling thread, and the resulting [`VillageMap`] is read-only
//! during gameplay.

pub mod buildings;
pub mod clue;
pub mod decorations;
pub mod generator;
pub mod grid;
pub mod paths;
pub mod structures;
pub mod terrain;
pub mod walls;

pub use buildings::BuildingSpawner;
pub use clue::ClueSpawner;
pub use decorations::DecorationSpawner;
pub use generator::{MapGenerator, VillageMap};
pub use grid::{GridPos, Tile, TileGrid, TileId, WorldPos};
pub use paths::PathRouter;
pub use structures::{PlacedStructure, Rotation, StructureId, StructureKind, StructurePrototype};
pub use terrain::Terrain;
pub use walls::WallSpawner;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for village generation.
///
/// Controls grid dimensions, density tuning, and reproducibility. All
/// placer passes draw from a single `StdRng` seeded from `seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: usize,
    /// Map length in tiles
    pub length: usize,
    /// Tile edge length in world units
    pub tile_size: f32,
    /// Minimum number of tiles left free of buildings along each edge
    pub walls_margin: usize,
    /// Buildings placed unconditionally before density tuning applies
    pub minimum_buildings: usize,
    /// Amplitude of the noise-sampled terrain heights
    pub height_amplitude: f32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use hamlet::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.walls_margin < config.width / 2);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: crate::config::DEFAULT_MAP_WIDTH,
            length: crate::config::DEFAULT_MAP_LENGTH,
            tile_size: crate::config::DEFAULT_TILE_SIZE,
            walls_margin: 10,
            minimum_buildings: crate::config::MINIMUM_BUILDINGS,
            height_amplitude: 2.0,
        }
    }

    /// Configuration for testing with a smaller, flatter map.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 20,
            length: 20,
            tile_size: 10.0,
            walls_margin: 3,
            minimum_buildings: crate::config::MINIMUM_BUILDINGS,
            height_amplitude: 0.0,
        }
    }

    /// Creates the seeded random number generator for a generation run.
    pub fn create_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// One entry of a weighted structure catalog.
///
/// `weight` is relative (entries need not sum to 1). `current` is advanced
/// by the selector each time the entry wins a draw and never decreases,
/// except for the explicit rollback a placer performs when it discards a
/// drawn prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Prototype this entry instantiates.
    pub prototype: StructurePrototype,
    /// Relative selection weight in `[0, 1]`.
    pub weight: f32,
    /// Maximum number of instances this entry may produce.
    pub max_count: usize,
    /// Instances produced so far.
    pub current_count: usize,
}

impl CatalogEntry {
    /// Creates a catalog entry with no instances placed yet.
    pub fn new(prototype: StructurePrototype, weight: f32, max_count: usize) -> Self {
        Self {
            prototype,
            weight,
            max_count,
            current_count: 0,
        }
    }

    /// Whether this entry may still be selected.
    pub fn eligible(&self) -> bool {
        self.current_count < self.max_count
    }
}

/// A weighted catalog of structure prototypes with per-entry capacity.
///
/// # Examples
///
/// ```
/// use hamlet::{Catalog, CatalogEntry, StructureKind, StructurePrototype};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let proto = StructurePrototype::new("house", StructureKind::House, 12.0, 12.0);
/// let mut catalog = Catalog::new(vec![CatalogEntry::new(proto, 0.5, 1)]);
/// let mut rng = StdRng::seed_from_u64(7);
///
/// assert!(catalog.pick(&mut rng).is_some());
/// assert!(catalog.pick(&mut rng).is_none()); // capacity exhausted
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Creates a catalog from a list of entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the entries.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Global acceptance probability used by the density check.
    ///
    /// The first entry's weight doubles as the per-tile acceptance
    /// probability regardless of which entry is eventually drawn. That
    /// coupling is inherited behavior, kept as observed.
    pub fn density(&self) -> f32 {
        self.entries.first().map(|e| e.weight).unwrap_or(0.1)
    }

    /// Draws a prototype by weighted random choice among entries with
    /// remaining capacity, incrementing the winner's count.
    ///
    /// Returns `None` when no entry is eligible or all eligible weights are
    /// zero (a zero-weight catalog never selects).
    pub fn pick(&mut self, rng: &mut StdRng) -> Option<StructurePrototype> {
        let eligible: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].eligible())
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let total_weight: f32 = eligible.iter().map(|&i| self.entries[i].weight).sum();
        if total_weight <= 0.0 {
            return None;
        }

        // Strict comparison so zero-weight entries can never win the draw.
        let draw = rng.gen::<f32>() * total_weight;
        let mut cumulative = 0.0;
        for &i in &eligible {
            cumulative += self.entries[i].weight;
            if draw < cumulative {
                self.entries[i].current_count += 1;
                return Some(self.entries[i].prototype.clone());
            }
        }

        None
    }

    /// Picks uniformly among all entries, ignoring weights and capacity.
    /// Used by the clue spawner, which places exactly one instance.
    pub fn pick_uniform(&self, rng: &mut StdRng) -> Option<StructurePrototype> {
        if self.entries.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.entries.len());
        Some(self.entries[i].prototype.clone())
    }

    /// Rolls back one selection of the entry matching a prototype name.
    /// Called when a placer rejects and discards a drawn prototype, so the
    /// rejected draw does not consume catalog capacity.
    pub fn rollback(&mut self, prototype_name: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.prototype.name == prototype_name)
        {
            entry.current_count = entry.current_count.saturating_sub(1);
        }
    }

    /// First entry whose prototype has the given kind.
    pub fn first_of_kind(&self, kind: StructureKind) -> Option<&StructurePrototype> {
        self.entries
            .iter()
            .map(|e| &e.prototype)
            .find(|p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house(name: &str, weight: f32, max: usize) -> CatalogEntry {
        CatalogEntry::new(
            StructurePrototype::new(name, StructureKind::House, 12.0, 12.0),
            weight,
            max,
        )
    }

    #[test]
    fn test_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert!(config.width > 0 && config.length > 0);
        assert!(config.tile_size > 0.0);
    }

    #[test]
    fn test_pick_never_exceeds_capacity() {
        let mut catalog = Catalog::new(vec![house("a", 1.0, 3)]);
        let mut rng = StdRng::seed_from_u64(1);

        for n in 1..=3 {
            assert!(catalog.pick(&mut rng).is_some());
            assert_eq!(catalog.entries()[0].current_count, n);
        }
        assert!(catalog.pick(&mut rng).is_none());
        assert_eq!(catalog.entries()[0].current_count, 3);
    }

    #[test]
    fn test_pick_single_eligible_entry_counts_every_draw() {
        let mut catalog = Catalog::new(vec![house("a", 0.0, 10), house("b", 0.4, 10)]);
        let mut rng = StdRng::seed_from_u64(2);

        for n in 1..=5 {
            let proto = catalog.pick(&mut rng).unwrap();
            assert_eq!(proto.name, "b");
            assert_eq!(catalog.entries()[1].current_count, n);
        }
        assert_eq!(catalog.entries()[0].current_count, 0);
    }

    #[test]
    fn test_all_zero_weights_never_select() {
        let mut catalog = Catalog::new(vec![house("a", 0.0, 5), house("b", 0.0, 5)]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert!(catalog.pick(&mut rng).is_none());
        }
    }

    #[test]
    fn test_rollback_restores_capacity() {
        let mut catalog = Catalog::new(vec![house("a", 1.0, 1)]);
        let mut rng = StdRng::seed_from_u64(4);

        assert!(catalog.pick(&mut rng).is_some());
        assert!(catalog.pick(&mut rng).is_none());

        catalog.rollback("a");
        assert!(catalog.pick(&mut rng).is_some());
    }

    #[test]
    fn test_density_reads_first_entry() {
        let catalog = Catalog::new(vec![house("a", 0.25, 1), house("b", 0.9, 1)]);
        assert_eq!(catalog.density(), 0.25);
        assert_eq!(Catalog::default().density(), 0.1);
    }

    #[test]
    fn test_first_of_kind() {
        let mut entries = vec![house("a", 0.5, 1)];
        entries.push(CatalogEntry::new(
            StructurePrototype::new("chapel", StructureKind::Church, 20.0, 16.0),
            0.2,
            1,
        ));
        let catalog = Catalog::new(entries);
        assert_eq!(
            catalog.first_of_kind(StructureKind::Church).unwrap().name,
            "chapel"
        );
        assert!(catalog.first_of_kind(StructureKind::Gate).is_none());
    }
}
