//! Level side-channel data
//!
//! Every level carries the common start/end/critical-path base. Generators
//! add their own facts through one [`ExtrasKind`] variant; population and
//! marker cleanup only look at the base.

use serde::{Deserialize, Serialize};

use super::room::{BigRoom, Room};
use crate::Coord;
use crate::generator::CaveType;
use crate::geom::BBox;

fn shift(p: &mut Coord, dx: i32, dy: i32) {
    p.0 += dx;
    p.1 += dy;
}

fn shift_all(ps: &mut [Coord], dx: i32, dy: i32) {
    for p in ps {
        shift(p, dx, dy);
    }
}

fn shift_rooms(rooms: &mut [Room], dx: i32, dy: i32) {
    for r in rooms {
        r.translate(dx, dy);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DungeonExtras {
    pub rooms: Vec<Room>,
    pub corridors: Vec<Room>,
    pub big_rooms: Vec<BigRoom>,
    /// Dead-end corridor cells
    pub dead_ends: Vec<Coord>,
    /// Indices into `rooms`
    pub start_room: Option<usize>,
    pub end_room: Option<usize>,
    /// Cells turned into bridges by the critical-path fallback
    pub bridges: Vec<Coord>,
    pub nest_loot: Vec<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaveExtras {
    pub cave_type: CaveType,
    pub collapsed: bool,
    pub spur_points: Vec<Coord>,
    pub nest: Option<BBox>,
    pub nest_loot: Vec<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastleExtras {
    pub rooms: Vec<Room>,
    pub corridors: Vec<Room>,
    pub entrances: Vec<Room>,
    pub storerooms: Vec<Room>,
    pub vaults: Vec<Room>,
    /// Gate cells on the castle border
    pub gates: Vec<Coord>,
    /// Index into `storerooms`
    pub main_loot_room: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CryptExtras {
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MountainPart {
    #[default]
    Face,
    Summit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MountainExtras {
    pub part: MountainPart,
    /// Carved openings through the crux wall
    pub breaches: Vec<Coord>,
    pub crux: Option<BBox>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NestExtras {
    pub bbox: Option<BBox>,
    pub loot_points: Vec<Coord>,
}

/// Generator-specific part of the extras
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtrasKind {
    #[default]
    None,
    Dungeon(DungeonExtras),
    Cave(CaveExtras),
    Castle(CastleExtras),
    Crypt(CryptExtras),
    Mountain(MountainExtras),
    Nest(NestExtras),
}

/// Extras common to every level plus the generator-specific variant
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelExtras {
    pub start_point: Option<Coord>,
    pub end_point: Option<Coord>,
    pub critical_path: Vec<Coord>,
    pub kind: ExtrasKind,
}

impl LevelExtras {
    pub fn with_kind(kind: ExtrasKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn dungeon(&self) -> Option<&DungeonExtras> {
        match &self.kind {
            ExtrasKind::Dungeon(d) => Some(d),
            _ => None,
        }
    }

    pub fn cave(&self) -> Option<&CaveExtras> {
        match &self.kind {
            ExtrasKind::Cave(c) => Some(c),
            _ => None,
        }
    }

    pub fn castle(&self) -> Option<&CastleExtras> {
        match &self.kind {
            ExtrasKind::Castle(c) => Some(c),
            _ => None,
        }
    }

    pub fn crypt(&self) -> Option<&CryptExtras> {
        match &self.kind {
            ExtrasKind::Crypt(c) => Some(c),
            _ => None,
        }
    }

    pub fn mountain(&self) -> Option<&MountainExtras> {
        match &self.kind {
            ExtrasKind::Mountain(m) => Some(m),
            _ => None,
        }
    }

    pub fn nest(&self) -> Option<&NestExtras> {
        match &self.kind {
            ExtrasKind::Nest(n) => Some(n),
            _ => None,
        }
    }

    /// Shift every stored coordinate by `(dx, dy)`
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if let Some(p) = self.start_point.as_mut() {
            shift(p, dx, dy);
        }
        if let Some(p) = self.end_point.as_mut() {
            shift(p, dx, dy);
        }
        shift_all(&mut self.critical_path, dx, dy);
        match &mut self.kind {
            ExtrasKind::None => {}
            ExtrasKind::Dungeon(d) => {
                shift_rooms(&mut d.rooms, dx, dy);
                shift_rooms(&mut d.corridors, dx, dy);
                for big in &mut d.big_rooms {
                    big.room.translate(dx, dy);
                }
                shift_all(&mut d.dead_ends, dx, dy);
                shift_all(&mut d.bridges, dx, dy);
                shift_all(&mut d.nest_loot, dx, dy);
            }
            ExtrasKind::Cave(c) => {
                shift_all(&mut c.spur_points, dx, dy);
                shift_all(&mut c.nest_loot, dx, dy);
                c.nest = c.nest.map(|b| b.translate(dx, dy));
            }
            ExtrasKind::Castle(c) => {
                shift_rooms(&mut c.rooms, dx, dy);
                shift_rooms(&mut c.corridors, dx, dy);
                shift_rooms(&mut c.entrances, dx, dy);
                shift_rooms(&mut c.storerooms, dx, dy);
                shift_rooms(&mut c.vaults, dx, dy);
                shift_all(&mut c.gates, dx, dy);
            }
            ExtrasKind::Crypt(c) => shift_rooms(&mut c.rooms, dx, dy),
            ExtrasKind::Mountain(m) => {
                shift_all(&mut m.breaches, dx, dy);
                m.crux = m.crux.map(|b| b.translate(dx, dy));
            }
            ExtrasKind::Nest(n) => {
                shift_all(&mut n.loot_points, dx, dy);
                n.bbox = n.bbox.map(|b| b.translate(dx, dy));
            }
        }
    }
}
