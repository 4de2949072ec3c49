//! Levels, their extras, rooms and stairs

mod extras;
#[allow(clippy::module_inception)]
mod level;
mod room;
mod stairs;

pub use extras::{
    CastleExtras, CaveExtras, CryptExtras, DungeonExtras, ExtrasKind, LevelExtras, MountainExtras,
    MountainPart, NestExtras,
};
pub use level::{Level, LevelId};
pub use room::{BigRoom, BigRoomKind, Room, RoomCategory};
pub use stairs::{Stairs, StairsDir, StairsTarget, connect_stairs, stairs_linked};
