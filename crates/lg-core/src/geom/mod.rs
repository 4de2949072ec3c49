//! Geometry: boxes, paths, flood fills and map merging

mod bbox;
mod dir;
mod flood;
mod merge;
mod path;

pub use bbox::{BBox, box_around, cross_around, hollow_box};
pub use dir::Dir;
pub use flood::{floodfill, floodfill_passable, regions, unreachable_passable};
pub use merge::{copy_cell, merge_maps};
pub use path::{
    CellFilter, Topology, grid_path, min_weight_or_shortest, path_through_walls, shortest_passable_path,
    shortest_passable_path_with_doors, shortest_path,
};
