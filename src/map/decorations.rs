//! # Decoration Placement
//!
//! Scatters single-tile decorations (trees, carts, barrels) over whatever
//! is left after buildings and paths have claimed their tiles. Runs last so
//! decorations never block a walkway.

use crate::map::grid::{TileGrid, TileId};
use crate::map::structures::{PlacedStructure, Rotation};
use crate::map::Catalog;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Places decorations from a weighted catalog onto free tiles.
pub struct DecorationSpawner;

impl DecorationSpawner {
    /// Runs the decoration pass, appending placements to `structures`.
    ///
    /// Every free tile is a candidate; the catalog's density gates each one
    /// and a weighted draw picks the prototype. Decorations occupy exactly
    /// the tile they land on. Returns the number placed.
    pub fn spawn(
        catalog: &mut Catalog,
        grid: &mut TileGrid,
        structures: &mut Vec<PlacedStructure>,
        rng: &mut StdRng,
    ) -> usize {
        let mut candidates: Vec<TileId> = grid
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_free())
            .map(|(id, _)| id)
            .collect();
        candidates.shuffle(rng);

        let density = catalog.density();
        let mut placed = 0;

        for tile in candidates {
            if !grid.tile(tile).is_free() {
                continue;
            }
            if rng.gen::<f32>() >= density {
                continue;
            }
            let Some(prototype) = catalog.pick(rng) else {
                debug!("decoration catalog exhausted after {} placements", placed);
                break;
            };

            let rotation = *Rotation::ALL.choose(rng).unwrap_or(&Rotation::Deg0);
            let position = grid.tile(tile).center;
            let mut decoration = PlacedStructure::from_prototype(&prototype, position, rotation);
            decoration.footprint = vec![tile];

            let id = structures.len();
            let t = grid.tile_mut(tile);
            t.is_decoration = true;
            t.structure = Some(id);
            structures.push(decoration);
            placed += 1;
        }

        info!("decoration pass placed {} decorations", placed);
        placed
    }
}
