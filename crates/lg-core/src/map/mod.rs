//! Terrain, cells and the cell grid

mod cell;
mod cell_map;
mod element;
mod terrain;

pub use cell::Cell;
pub use cell_map::CellMap;
pub use element::{Door, Element, ElementKind, Lever, LeverDoor, MarkerKind};
pub use terrain::Terrain;
