//! Low-level map generation
//!
//! [`create_map`] turns a [`MapStyle`] and a [`MapGenConf`] into a bare
//! [`CellMap`] plus whatever the style learned while building it (rooms,
//! miners, road paths, houses or placed tiles). Nothing here places actors,
//! items or stairs; that is left to the level generators.

mod basic;
mod conf;
mod digger;
mod miner;
mod noise_maps;
mod tiled;
mod town;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{GenError, GenResult, check_dimensions, report};
use crate::geom::BBox;
use crate::level::Room;
use crate::map::CellMap;
use crate::template::{TiledMap, castle_catalog, crypt_catalog, nest_catalog};
use crate::{Coord, GameRng};

pub use basic::{arena, cellular, connect_regions, dead_ends, maze, maze_braided};
pub use conf::{
    CaveConf, CellularConf, DiggerConf, MapGenConf, MazeConf, MinerStart, MountainConf, PatchConf,
    SummitConf, TiledConf, TownConf, WallConf,
};
pub use digger::{ConnectivityTracker, DugBudget, RoomsAux, dig_corridor, generate_corridors, rooms_map};
pub use miner::{Brush, Miner, StopRule, layout_miners, mine};
pub use noise_maps::{
    NoiseField, arctic, carve_road, forest, grow_blob, lake, mountain, mountain_road,
    mountain_terrain, summit, wall_band,
};
pub use tiled::{create_tiled, tiled_to_map};
pub use town::{bsp_leaves, town};

/// Map styles understood by [`create_map`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    Arena,
    Cellular,
    Digger,
    /// Digger with every room at the maximum size
    Uniform,
    Maze,
    MazeBraided,
    Cave,
    Mountain,
    Summit,
    Forest,
    Lake,
    Town,
    Castle,
    Crypt,
    Nest,
    Wall,
    Arctic,
}

/// Style-specific facts gathered while building a map
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapAux {
    #[default]
    None,
    Rooms(RoomsAux),
    Cave { miners: Vec<Miner> },
    Mountain { paths: Vec<Vec<Coord>> },
    Town { houses: Vec<Room>, free: Vec<BBox> },
    Tiles(TiledMap),
}

/// A generated map and its auxiliary data
#[derive(Debug, Clone)]
pub struct MapObj {
    pub map: CellMap,
    pub aux: MapAux,
}

impl MapObj {
    fn bare(map: CellMap) -> Self {
        Self {
            map,
            aux: MapAux::None,
        }
    }

    pub fn rooms(&self) -> Option<&RoomsAux> {
        match &self.aux {
            MapAux::Rooms(r) => Some(r),
            _ => None,
        }
    }

    pub fn tiles(&self) -> Option<&TiledMap> {
        match &self.aux {
            MapAux::Tiles(t) => Some(t),
            _ => None,
        }
    }
}

/// Build a `cols` × `rows` map in `style`
pub fn create_map(
    style: MapStyle,
    cols: i32,
    rows: i32,
    conf: &MapGenConf,
    rng: &mut GameRng,
) -> GenResult<MapObj> {
    check_dimensions(cols, rows)?;
    log::debug!("creating {} map {}x{}", style, cols, rows);
    let (wall, floor) = (conf.wall_type, conf.floor_type);
    let obj = match style {
        MapStyle::Arena => MapObj::bare(arena(cols, rows, wall, floor)),
        MapStyle::Cellular => MapObj::bare(cellular(cols, rows, &conf.cellular, wall, floor, rng)),
        MapStyle::Digger | MapStyle::Uniform => {
            let uniform = style == MapStyle::Uniform;
            let (map, aux) = rooms_map(cols, rows, &conf.digger, uniform, wall, floor, rng);
            MapObj {
                map,
                aux: MapAux::Rooms(aux),
            }
        }
        MapStyle::Maze => MapObj::bare(maze(cols, rows, wall, floor, rng)),
        MapStyle::MazeBraided => MapObj::bare(maze_braided(cols, rows, &conf.maze, wall, floor, rng)),
        MapStyle::Cave => {
            let miners = layout_miners(cols, rows, &conf.cave, rng);
            let (map, miners) = mine(cols, rows, &conf.cave, miners, rng);
            MapObj {
                map,
                aux: MapAux::Cave { miners },
            }
        }
        MapStyle::Mountain => {
            let (map, paths) = mountain(cols, rows, &conf.mountain, rng);
            MapObj {
                map,
                aux: MapAux::Mountain { paths },
            }
        }
        MapStyle::Summit => MapObj::bare(summit(cols, rows, &conf.mountain, &conf.summit, rng)),
        MapStyle::Forest => MapObj::bare(forest(cols, rows, &conf.patches, rng)),
        MapStyle::Lake => MapObj::bare(lake(cols, rows, &conf.patches, rng)),
        MapStyle::Arctic => MapObj::bare(arctic(cols, rows, &conf.patches, rng)),
        MapStyle::Town => {
            let (map, houses, free) = town(cols, rows, &conf.town, rng);
            MapObj {
                map,
                aux: MapAux::Town { houses, free },
            }
        }
        MapStyle::Wall => MapObj::bare(wall_band(cols, rows, &conf.wall, rng)),
        MapStyle::Castle | MapStyle::Crypt | MapStyle::Nest => {
            let catalog = match style {
                MapStyle::Castle => castle_catalog()?,
                MapStyle::Crypt => crypt_catalog()?,
                _ => nest_catalog()?,
            };
            let (map, tiled) = create_tiled(&catalog, cols, rows, &conf.tiled, None, wall, floor, rng)?;
            MapObj {
                map,
                aux: MapAux::Tiles(tiled),
            }
        }
    };
    Ok(obj)
}

/// [`create_map`] with the style given by name
pub fn create_map_by_name(
    style: &str,
    cols: i32,
    rows: i32,
    conf: &MapGenConf,
    rng: &mut GameRng,
) -> GenResult<MapObj> {
    let style: MapStyle = style
        .parse()
        .map_err(|_| report(GenError::UnknownStyle(style.to_string())))?;
    create_map(style, cols, rows, conf, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_style_names() {
        assert_eq!("maze_braided".parse::<MapStyle>().unwrap(), MapStyle::MazeBraided);
        assert_eq!(MapStyle::Arctic.to_string(), "arctic");
        assert!("labyrinth".parse::<MapStyle>().is_err());
    }

    #[test]
    fn test_unknown_style_is_an_error() {
        let mut rng = GameRng::new(1);
        let err = create_map_by_name("labyrinth", 20, 20, &MapGenConf::default(), &mut rng).unwrap_err();
        assert!(matches!(err, GenError::UnknownStyle(s) if s == "labyrinth"));
    }

    #[test]
    fn test_bad_dimensions() {
        let mut rng = GameRng::new(1);
        let err = create_map(MapStyle::Arena, 2, 20, &MapGenConf::default(), &mut rng).unwrap_err();
        assert!(matches!(err, GenError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_every_style_builds() {
        let conf = MapGenConf::default();
        for style in MapStyle::iter() {
            let mut rng = GameRng::new(31);
            let obj = create_map(style, 48, 36, &conf, &mut rng).unwrap();
            assert_eq!((obj.map.cols(), obj.map.rows()), (48, 36), "{}", style);
        }
    }

    #[test]
    fn test_aux_matches_style() {
        let conf = MapGenConf::default();
        let mut rng = GameRng::new(8);
        let digger = create_map(MapStyle::Digger, 60, 40, &conf, &mut rng).unwrap();
        assert!(digger.rooms().is_some_and(|r| !r.rooms.is_empty()));
        let castle = create_map(MapStyle::Castle, 42, 42, &conf, &mut rng).unwrap();
        assert!(castle.tiles().is_some_and(|t| !t.placed.is_empty()));
        let cave = create_map(MapStyle::Cave, 40, 30, &conf, &mut rng).unwrap();
        assert!(matches!(cave.aux, MapAux::Cave { ref miners } if miners.len() == 3));
    }

    #[test]
    fn test_cellular_same_seed_same_map() {
        let conf = MapGenConf::default();
        let a = create_map(MapStyle::Cellular, 30, 30, &conf, &mut GameRng::new(99)).unwrap();
        let b = create_map(MapStyle::Cellular, 30, 30, &conf, &mut GameRng::new(99)).unwrap();
        assert_eq!(a.map.to_ascii(), b.map.to_ascii());
    }
}
