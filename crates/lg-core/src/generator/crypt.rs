//! Tiled crypts
//!
//! The crypt generator only lays out the tiles and doors. Anything living in
//! the crypt comes from an optional [`ZonePopulator`] supplied by the game.

use serde::{Deserialize, Serialize};

use super::markers;
use crate::error::{GenResult, check_dimensions};
use crate::level::{CryptExtras, ExtrasKind, Level, LevelExtras, Room, RoomCategory};
use crate::map::{MarkerKind, Terrain};
use crate::mapgen::{TiledConf, create_tiled};
use crate::template::{GenParams, StartRoom, TileCategory, crypt_catalog};
use crate::{DEFAULT_PRESERVED_MARKERS, GameRng};

/// Fills a finished zone with game content
pub trait ZonePopulator {
    /// Returns the number of entities placed
    fn populate_zone(&mut self, level: &mut Level, rooms: &[Room], rng: &mut GameRng) -> usize;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptOptions {
    pub room_count: Option<usize>,
    pub gen_params: GenParams,
    pub n_gates: usize,
    pub wall_type: Terrain,
    pub floor_type: Terrain,
    pub remove_markers: bool,
    pub preserve_markers: Vec<MarkerKind>,
}

impl Default for CryptOptions {
    fn default() -> Self {
        Self {
            room_count: None,
            gen_params: GenParams::default(),
            n_gates: 1,
            wall_type: Terrain::WallCrypt,
            floor_type: Terrain::FloorCrypt,
            remove_markers: true,
            preserve_markers: DEFAULT_PRESERVED_MARKERS.to_vec(),
        }
    }
}

#[derive(Default)]
pub struct CryptGenerator {
    populator: Option<Box<dyn ZonePopulator>>,
}

impl CryptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_populator(populator: Box<dyn ZonePopulator>) -> Self {
        Self {
            populator: Some(populator),
        }
    }
}

impl super::LevelGenerator for CryptGenerator {
    type Options = CryptOptions;
    type Output = Level;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &CryptOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        check_dimensions(cols, rows)?;
        let catalog = crypt_catalog()?;
        let conf = TiledConf {
            gen_params: opts.gen_params,
            room_count: opts.room_count,
            start_room: StartRoom::from_gate_count(opts.n_gates),
            try_to_match_all_exits: true,
            preserve_markers: true,
            ..Default::default()
        };
        let (map, tiled) = create_tiled(
            &catalog,
            cols,
            rows,
            &conf,
            None,
            opts.wall_type,
            opts.floor_type,
            rng,
        )?;

        let mut level = Level::new(map);
        let doors = markers::markers_to_doors(&mut level);
        let rooms: Vec<Room> = tiled
            .placed
            .iter()
            .filter(|t| t.category != TileCategory::Filler)
            .map(|t| {
                let category = match t.category {
                    TileCategory::Corridor | TileCategory::Cross => RoomCategory::Corridor,
                    _ => RoomCategory::Room,
                };
                Room::named(category, t.bbox, &t.name)
            })
            .collect();
        log::debug!("crypt with {} rooms and {} doors", rooms.len(), doors.len());

        if let Some(populator) = self.populator.as_mut() {
            let n = populator.populate_zone(&mut level, &rooms, rng);
            log::debug!("zone populator placed {} entities", n);
        }
        level.set_extras(LevelExtras::with_kind(ExtrasKind::Crypt(CryptExtras { rooms })));
        if opts.remove_markers {
            markers::remove_markers(&mut level, &opts.preserve_markers);
        }
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityFactory, ItemConf, TableFactory};
    use crate::generator::LevelGenerator;

    struct OneItemPerRoom(TableFactory);

    impl ZonePopulator for OneItemPerRoom {
        fn populate_zone(&mut self, level: &mut Level, rooms: &[Room], rng: &mut GameRng) -> usize {
            let conf = ItemConf {
                item: &|_| true,
                max_value: 50,
                n_items: 1,
            };
            let mut n = 0;
            for room in rooms {
                let Some((x, y)) = room
                    .bbox
                    .coords()
                    .into_iter()
                    .find(|&(x, y)| level.map().is_passable(x, y))
                else {
                    continue;
                };
                for item in self.0.generate_items(rng, &conf) {
                    n += usize::from(level.add_item(item, x, y));
                }
            }
            n
        }
    }

    #[test]
    fn test_crypt_rooms_and_doors() {
        let mut rng = GameRng::new(81);
        let level = CryptGenerator::new()
            .create(42, 42, &CryptOptions::default(), &mut rng)
            .unwrap();
        let rooms = &level.extras().crypt().unwrap().rooms;
        assert!(!rooms.is_empty());
        assert!(level.cells_with_marker(MarkerKind::Door).is_empty());
        assert!(level.map().iter().any(|c| c.base == Terrain::FloorCrypt));
        assert!(level.items().is_empty());
    }

    #[test]
    fn test_zone_populator_is_called() {
        let mut rng = GameRng::new(82);
        let mut generator = CryptGenerator::with_populator(Box::new(OneItemPerRoom(TableFactory::new())));
        let level = generator
            .create(42, 42, &CryptOptions::default(), &mut rng)
            .unwrap();
        assert!(!level.items().is_empty());
    }
}
