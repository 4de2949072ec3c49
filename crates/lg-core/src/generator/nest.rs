//! Nests: small tiled lairs embedded into other levels

use serde::{Deserialize, Serialize};

use super::LevelGenerator;
use crate::error::{GenResult, check_dimensions};
use crate::geom::{BBox, copy_cell, merge_maps};
use crate::level::{ExtrasKind, Level, LevelExtras, NestExtras};
use crate::map::{CellMap, MarkerKind, Terrain};
use crate::mapgen::{TiledConf, create_tiled};
use crate::template::{GenParams, StartRoom, TileCategory, TileTemplate, nest_catalog};
use crate::{Coord, GameRng};

/// Slots needed before the central hub tile is allowed
const HUB_MIN_SLOTS: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestOptions {
    pub gen_params: GenParams,
    pub room_count: Option<usize>,
    pub wall_type: Terrain,
    pub floor_type: Terrain,
    pub try_to_match_all_exits: bool,
}

impl Default for NestOptions {
    fn default() -> Self {
        Self {
            gen_params: GenParams::default(),
            room_count: None,
            wall_type: Terrain::WallCave,
            floor_type: Terrain::FloorCave,
            try_to_match_all_exits: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NestGenerator;

impl NestGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build a nest the size of `bbox` and copy it into `host` there.
    ///
    /// Returns the loot points in host coordinates.
    pub fn create_and_embed(
        &mut self,
        host: &mut CellMap,
        bbox: BBox,
        options: &NestOptions,
        rng: &mut GameRng,
    ) -> GenResult<Vec<Coord>> {
        let nest = self.create(bbox.width(), bbox.height(), options, rng)?;
        merge_maps(host, nest.map(), bbox.ulx, bbox.uly, copy_cell);
        let loot: Vec<Coord> = nest
            .extras()
            .nest()
            .map(|n| n.loot_points.iter().map(|&(x, y)| (x + bbox.ulx, y + bbox.uly)).collect())
            .unwrap_or_default();
        log::debug!("embedded nest at {:?} with {} loot points", bbox, loot.len());
        Ok(loot)
    }
}

impl LevelGenerator for NestGenerator {
    type Options = NestOptions;
    type Output = Level;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        options: &NestOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        check_dimensions(cols, rows)?;
        let catalog = nest_catalog()?;
        let conf = TiledConf {
            gen_params: options.gen_params,
            room_count: options.room_count,
            start_room: StartRoom::OneGate,
            try_to_match_all_exits: options.try_to_match_all_exits,
            preserve_markers: true,
            ..Default::default()
        };
        let params = options.gen_params.clamped();
        let slots = (cols as usize / params.tile_w()).max(1) * (rows as usize / params.tile_h()).max(1);
        let filter = move |t: &TileTemplate| t.category != TileCategory::Cross || slots >= HUB_MIN_SLOTS;
        let (map, _) = create_tiled(
            &catalog,
            cols,
            rows,
            &conf,
            Some(&filter),
            options.wall_type,
            options.floor_type,
            rng,
        )?;

        let mut level = Level::new(map);
        let loot_points = level.cells_with_marker(MarkerKind::Loot);
        for &(x, y) in &loot_points {
            if let Some(cell) = level.map_mut().get_mut(x, y) {
                cell.remove_marker(MarkerKind::Loot);
                cell.add_marker(MarkerKind::NestLoot);
            }
        }
        let bbox = level.map().bbox();
        level.set_extras(LevelExtras::with_kind(ExtrasKind::Nest(NestExtras {
            bbox: Some(bbox),
            loot_points,
        })));
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loot_markers_become_nest_loot() {
        let mut rng = GameRng::new(41);
        let level = NestGenerator::new()
            .create(21, 21, &NestOptions::default(), &mut rng)
            .unwrap();
        assert!(level.cells_with_marker(MarkerKind::Loot).is_empty());
        let loot = level.cells_with_marker(MarkerKind::NestLoot);
        let extras = level.extras().nest().unwrap();
        assert_eq!(loot.len(), extras.loot_points.len());
        assert!(loot.iter().all(|&(x, y)| level.map().is_passable(x, y)));
    }

    #[test]
    fn test_embed_translates_loot() {
        let mut rng = GameRng::new(42);
        let mut host = CellMap::new(40, 30, Terrain::Floor);
        let bbox = BBox::from_size(10, 8, 14, 14);
        let loot = NestGenerator::new()
            .create_and_embed(&mut host, bbox, &NestOptions::default(), &mut rng)
            .unwrap();
        assert!(loot.iter().all(|&(x, y)| bbox.contains(x, y)));
        assert!(loot.iter().all(|&(x, y)| host.get(x, y).is_some_and(|c| c.has_marker(MarkerKind::NestLoot))));
        assert!(host.iter().any(|c| c.base == Terrain::WallCave));
        assert_eq!(host.base(0, 0), Some(Terrain::Floor));
    }

    #[test]
    fn test_small_nest_fills_its_box() {
        let mut rng = GameRng::new(43);
        let level = NestGenerator::new()
            .create(14, 14, &NestOptions::default(), &mut rng)
            .unwrap();
        assert_eq!(level.map().cols(), 14);
        assert!(level.map().count_passable() > 0);
    }
}
