//! lg-core: procedural level generation for a roguelike
//!
//! Turns abstract parameters (dimensions, level flavour, danger and value
//! budgets) into a furnished level: terrain, rooms or cave/castle/crypt
//! topology, connectivity guarantees, markers, and population.
//!
//! The crate is pure and synchronous. All randomness comes from the
//! [`GameRng`] passed into each call; there is no global generator.

pub mod entity;
pub mod error;
pub mod generator;
pub mod geom;
pub mod level;
pub mod map;
pub mod mapgen;
pub mod options;
pub mod population;
pub mod template;

mod consts;

pub use consts::*;
pub use error::{GenError, GenResult};
pub use lg_rng::GameRng;

/// Grid coordinate, x to the right and y downwards.
pub type Coord = (i32, i32);
