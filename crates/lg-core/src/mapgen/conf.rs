//! Configuration for the low-level map generator

use serde::{Deserialize, Serialize};

use crate::map::Terrain;
use crate::template::{Constraint, GenParams, StartRoom};

/// Cellular automaton caves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularConf {
    /// Chance a cell starts as wall
    pub fill_prob: f64,
    pub generations: usize,
    /// A floor cell turns to wall with at least this many wall neighbours
    pub birth: usize,
    /// A wall cell stays wall with at least this many wall neighbours
    pub survive: usize,
}

impl Default for CellularConf {
    fn default() -> Self {
        Self {
            fill_prob: 0.45,
            generations: 4,
            birth: 5,
            survive: 4,
        }
    }
}

/// Room and corridor digging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiggerConf {
    /// Inner room width range, inclusive
    pub room_width: (i32, i32),
    pub room_height: (i32, i32),
    /// Share of the map to carve as room floor
    pub dug_percentage: f64,
    pub min_num_rooms: usize,
    /// Room placement attempts per generated map
    pub placement_tries: usize,
    /// Whole-map retries when `min_num_rooms` is missed
    pub watchdog: usize,
}

impl Default for DiggerConf {
    fn default() -> Self {
        Self {
            room_width: (3, 9),
            room_height: (3, 6),
            dug_percentage: 0.25,
            min_num_rooms: 4,
            placement_tries: 400,
            watchdog: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConf {
    /// Chance a dead end is opened up in braided mazes
    pub braid: f64,
}

impl Default for MazeConf {
    fn default() -> Self {
        Self { braid: 0.5 }
    }
}

/// Where the first miner of a cave starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinerStart {
    #[default]
    Center,
    /// On a random side of the map, digging inwards
    Edge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConf {
    pub primary: MinerStart,
    /// Miners started from the middle area besides the primary
    pub additional: usize,
    /// Stop once this share of the map is floor
    pub target_ratio: f64,
    /// Radius of the carving brush
    pub brush: i32,
    pub floor: Terrain,
    pub wall: Terrain,
}

impl Default for CaveConf {
    fn default() -> Self {
        Self {
            primary: MinerStart::Center,
            additional: 2,
            target_ratio: 0.35,
            brush: 1,
            floor: Terrain::FloorCave,
            wall: Terrain::WallCave,
        }
    }
}

/// Noise thresholds for mountain terrain. Values above a threshold get the
/// band's terrain; the chasm thresholds apply below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainConf {
    pub noise_scale: f64,
    pub highrock: f64,
    pub steep_cliff: f64,
    pub cliff: f64,
    pub stone: f64,
    pub snow: f64,
    pub chasm: f64,
    pub deep_chasm: f64,
    pub abyss: f64,
    pub road: bool,
    /// Number of zig-zag anchors between top and bottom
    pub road_anchors: usize,
    pub road_brush: i32,
}

impl Default for MountainConf {
    fn default() -> Self {
        Self {
            noise_scale: 0.09,
            highrock: 0.7,
            steep_cliff: 0.55,
            cliff: 0.4,
            stone: 0.25,
            snow: 0.15,
            chasm: -0.45,
            deep_chasm: -0.6,
            abyss: -0.75,
            road: false,
            road_anchors: 4,
            road_brush: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummitConf {
    /// Share of the map covered by the summit blob
    pub area_ratio: f64,
    /// Noise level above which summit cells turn to snow
    pub snow_bias: f64,
}

impl Default for SummitConf {
    fn default() -> Self {
        Self {
            area_ratio: 0.3,
            snow_bias: -0.3,
        }
    }
}

/// Noise patches for forest, lake and arctic maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConf {
    pub noise_scale: f64,
    /// Noise level above which the patch terrain appears
    pub threshold: f64,
    /// Higher level for the denser variant (deep water, ice walls)
    pub dense: f64,
}

impl Default for PatchConf {
    fn default() -> Self {
        Self {
            noise_scale: 0.12,
            threshold: 0.2,
            dense: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConf {
    /// Leaves are not split below this size
    pub min_leaf: i32,
    /// Smallest house footprint, walls included
    pub min_house: i32,
    pub max_house: i32,
    pub window_chance: f64,
    pub ground: Terrain,
}

impl Default for TownConf {
    fn default() -> Self {
        Self {
            min_leaf: 8,
            min_house: 5,
            max_house: 11,
            window_chance: 0.3,
            ground: Terrain::Grass,
        }
    }
}

/// The horizontal rock band used as a mountain crux
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConf {
    /// Band height before jitter
    pub thickness: i32,
    /// Maximum jitter of each edge
    pub ragged: i32,
    pub ground: Terrain,
}

impl Default for WallConf {
    fn default() -> Self {
        Self {
            thickness: 4,
            ragged: 1,
            ground: Terrain::Stone,
        }
    }
}

/// Template tiling for castles, crypts and nests
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TiledConf {
    pub gen_params: GenParams,
    pub room_count: Option<usize>,
    pub start_room: StartRoom,
    pub constraint: Constraint,
    pub try_to_match_all_exits: bool,
    /// Keep `+ & | : ?` as markers instead of plain floor
    pub preserve_markers: bool,
}

/// Options for [`create_map`](super::create_map)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConf {
    pub wall_type: Terrain,
    pub floor_type: Terrain,
    pub cellular: CellularConf,
    pub digger: DiggerConf,
    pub maze: MazeConf,
    pub cave: CaveConf,
    pub mountain: MountainConf,
    pub summit: SummitConf,
    pub patches: PatchConf,
    pub town: TownConf,
    pub wall: WallConf,
    pub tiled: TiledConf,
}

impl Default for MapGenConf {
    fn default() -> Self {
        Self {
            wall_type: Terrain::Wall,
            floor_type: Terrain::Floor,
            cellular: CellularConf::default(),
            digger: DiggerConf::default(),
            maze: MazeConf::default(),
            cave: CaveConf::default(),
            mountain: MountainConf::default(),
            summit: SummitConf::default(),
            patches: PatchConf::default(),
            town: TownConf::default(),
            wall: WallConf::default(),
            tiled: TiledConf::default(),
        }
    }
}
