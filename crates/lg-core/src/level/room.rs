//! Rooms and big rooms

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::Coord;
use crate::geom::BBox;

/// What a room is used for. Assigned when the room is created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum RoomCategory {
    #[default]
    Room,
    Corridor,
    Storeroom,
    Vault,
    Entrance,
    Cross,
    Nest,
    Center,
    Custom,
}

/// A rectangular room. `bbox` is the outer box, walls included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub category: RoomCategory,
    pub bbox: BBox,
    pub doors: Vec<Coord>,
    /// Tile template name for rooms coming from tiled layouts
    pub name: Option<String>,
}

impl Room {
    pub fn new(category: RoomCategory, bbox: BBox) -> Self {
        Self {
            category,
            bbox,
            doors: Vec::new(),
            name: None,
        }
    }

    pub fn named(category: RoomCategory, bbox: BBox, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(category, bbox)
        }
    }

    /// Floor area inside the walls
    pub fn inner(&self) -> BBox {
        self.bbox.shrink(1)
    }

    pub fn center(&self) -> Coord {
        self.bbox.center()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bbox.contains(x, y)
    }

    pub fn overlaps(&self, other: &Room) -> bool {
        self.bbox.overlaps(&other.bbox)
    }

    /// Is the position on the outer wall ring?
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.bbox.contains(x, y) && !self.inner().contains(x, y)
    }

    pub fn add_door(&mut self, pos: Coord) {
        if !self.doors.contains(&pos) {
            self.doors.push(pos);
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.bbox = self.bbox.translate(dx, dy);
        for d in &mut self.doors {
            *d = (d.0 + dx, d.1 + dy);
        }
    }
}

/// Kinds of oversized rooms injected into dungeons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BigRoomKind {
    Center,
    LargeCorridor { horizontal: bool },
    Cross,
    SmallVault,
    LargeVault,
    Nest,
}

impl BigRoomKind {
    pub const ALL: [BigRoomKind; 7] = [
        BigRoomKind::Center,
        BigRoomKind::LargeCorridor { horizontal: true },
        BigRoomKind::LargeCorridor { horizontal: false },
        BigRoomKind::Cross,
        BigRoomKind::SmallVault,
        BigRoomKind::LargeVault,
        BigRoomKind::Nest,
    ];

    pub fn category(&self) -> RoomCategory {
        match self {
            BigRoomKind::Center => RoomCategory::Center,
            BigRoomKind::LargeCorridor { .. } => RoomCategory::Corridor,
            BigRoomKind::Cross => RoomCategory::Cross,
            BigRoomKind::SmallVault | BigRoomKind::LargeVault => RoomCategory::Vault,
            BigRoomKind::Nest => RoomCategory::Nest,
        }
    }
}

/// An oversized room with its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigRoom {
    pub room: Room,
    pub kind: BigRoomKind,
}

impl From<&Room> for BBox {
    fn from(room: &Room) -> Self {
        room.bbox
    }
}
