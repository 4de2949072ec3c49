//! Template-driven tiling for castles, crypts and nests

mod builtin;
mod catalog;
mod engine;
mod start;
mod tile;

pub use builtin::{castle_catalog, crypt_catalog, nest_catalog};
pub use catalog::TemplateCatalog;
pub use engine::{PlacedTile, TiledMap, TilingConf, tile_map};
pub use start::{
    Constraint, ForcedSlot, Slot, StartRoom, StartSeed, constraint_cross, constraint_none,
    start_center, start_default, start_four_gates, start_gates_avoiding, start_one_gate,
    start_two_gates_adjacent, start_two_gates_opposite,
};
pub use tile::{GenParams, TileCategory, TileTemplate, WALL};
