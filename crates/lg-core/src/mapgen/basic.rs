//! Arena, cellular automaton and maze maps

use super::conf::{CellularConf, MazeConf};
use crate::GameRng;
use crate::geom::{Topology, grid_path, regions};
use crate::map::{Cell, CellMap, Terrain};

const MAZE_DIRS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Open floor ringed by walls
pub fn arena(cols: i32, rows: i32, wall: Terrain, floor: Terrain) -> CellMap {
    let mut map = CellMap::new(cols, rows, wall);
    let inner = map.bbox().shrink(1);
    map.fill(&inner, floor);
    map
}

/// Cellular automaton cave with every floor region connected.
///
/// Each generation applies the 4-5 rule: a wall with at least `survive`
/// wall neighbours stays wall, a floor with at least `birth` becomes wall.
pub fn cellular(
    cols: i32,
    rows: i32,
    conf: &CellularConf,
    wall: Terrain,
    floor: Terrain,
    rng: &mut GameRng,
) -> CellMap {
    let mut map = CellMap::new(cols, rows, wall);
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            if rng.get_uniform() >= conf.fill_prob {
                map.set_base(x, y, floor);
            }
        }
    }

    for _ in 0..conf.generations {
        let mut next = map.clone();
        for y in 1..rows - 1 {
            for x in 1..cols - 1 {
                let walls = map.wall_neighbours(x, y);
                let is_wall = map.is_wall(x, y);
                let becomes_wall = if is_wall {
                    walls >= conf.survive
                } else {
                    walls >= conf.birth
                };
                next.set_base(x, y, if becomes_wall { wall } else { floor });
            }
        }
        map = next;
    }

    connect_regions(&mut map, floor);
    map
}

/// Carve grid paths from every smaller passable region to the largest one
pub fn connect_regions(map: &mut CellMap, floor: Terrain) -> usize {
    let found = regions(map, Cell::is_passable, false);
    let Some((main, rest)) = found.split_first() else {
        return 0;
    };
    for region in rest {
        let Some(&from) = region.first() else {
            continue;
        };
        let Some(&to) = main
            .iter()
            .min_by_key(|p| Topology::Four.distance(**p, from))
        else {
            continue;
        };
        for (x, y) in grid_path(from, to, Topology::Four) {
            if !map.is_passable(x, y) {
                map.set_base(x, y, floor);
            }
        }
    }
    log::debug!("connected {} isolated regions", rest.len());
    rest.len()
}

/// Perfect maze by recursive backtracking on odd coordinates
pub fn maze(cols: i32, rows: i32, wall: Terrain, floor: Terrain, rng: &mut GameRng) -> CellMap {
    let mut map = CellMap::new(cols, rows, wall);
    let (max_x, max_y) = (cols - 2, rows - 2);
    if max_x < 1 || max_y < 1 {
        return map;
    }
    let start = (
        1 + 2 * rng.rn2(((max_x + 1) / 2) as u32) as i32,
        1 + 2 * rng.rn2(((max_y + 1) / 2) as u32) as i32,
    );
    walk_from(&mut map, start, max_x, max_y, floor, rng);
    map
}

fn can_carve(map: &CellMap, (x, y): (i32, i32), dir: (i32, i32), max_x: i32, max_y: i32) -> bool {
    let (nx, ny) = (x + 2 * dir.0, y + 2 * dir.1);
    nx >= 1 && ny >= 1 && nx <= max_x && ny <= max_y && map.is_wall(nx, ny)
}

fn walk_from(
    map: &mut CellMap,
    start: (i32, i32),
    max_x: i32,
    max_y: i32,
    floor: Terrain,
    rng: &mut GameRng,
) {
    let mut stack = vec![start];
    map.set_base(start.0, start.1, floor);
    while let Some(&(x, y)) = stack.last() {
        let open: Vec<(i32, i32)> = MAZE_DIRS
            .iter()
            .copied()
            .filter(|d| can_carve(&*map, (x, y), *d, max_x, max_y))
            .collect();
        let Some(&(dx, dy)) = rng.choose(&open) else {
            stack.pop();
            continue;
        };
        map.set_base(x + dx, y + dy, floor);
        map.set_base(x + 2 * dx, y + 2 * dy, floor);
        stack.push((x + 2 * dx, y + 2 * dy));
    }
}

/// Maze with some dead ends knocked through into a neighbouring passage
pub fn maze_braided(
    cols: i32,
    rows: i32,
    conf: &MazeConf,
    wall: Terrain,
    floor: Terrain,
    rng: &mut GameRng,
) -> CellMap {
    let mut map = maze(cols, rows, wall, floor, rng);
    let ends = dead_ends(&map);
    let mut opened = 0;
    for (x, y) in ends {
        if !is_dead_end(&map, x, y) || rng.get_uniform() >= conf.braid {
            continue;
        }
        let through: Vec<(i32, i32)> = MAZE_DIRS
            .iter()
            .copied()
            .filter(|(dx, dy)| {
                let (wx, wy) = (x + dx, y + dy);
                let (fx, fy) = (x + 2 * dx, y + 2 * dy);
                !map.is_edge(wx, wy) && map.is_wall(wx, wy) && map.is_passable(fx, fy)
            })
            .collect();
        if let Some(&(dx, dy)) = rng.choose(&through) {
            map.set_base(x + dx, y + dy, floor);
            opened += 1;
        }
    }
    log::debug!("braided maze: opened {} dead ends", opened);
    map
}

fn is_dead_end(map: &CellMap, x: i32, y: i32) -> bool {
    map.is_passable(x, y)
        && map
            .neighbours(x, y, false)
            .into_iter()
            .filter(|&(nx, ny)| map.is_passable(nx, ny))
            .count()
            == 1
}

/// Passable cells with exactly one passable orthogonal neighbour
pub fn dead_ends(map: &CellMap) -> Vec<(i32, i32)> {
    map.coords_where(|c| c.is_passable())
        .into_iter()
        .filter(|&(x, y)| is_dead_end(map, x, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::floodfill_passable;

    #[test]
    fn test_arena_walls() {
        let map = arena(10, 6, Terrain::Wall, Terrain::Floor);
        assert!(map.is_wall(0, 0));
        assert!(map.is_wall(9, 5));
        assert!(map.is_passable(1, 1));
        assert_eq!(map.count_passable(), 8 * 4);
    }

    #[test]
    fn test_cellular_is_connected() {
        let mut rng = GameRng::new(7);
        let map = cellular(40, 30, &CellularConf::default(), Terrain::Wall, Terrain::Floor, &mut rng);
        let reached = floodfill_passable(&map);
        assert_eq!(reached.len(), map.count_passable());
        for x in 0..40 {
            assert!(map.is_wall(x, 0));
            assert!(map.is_wall(x, 29));
        }
    }

    #[test]
    fn test_maze_is_perfect_and_connected() {
        let mut rng = GameRng::new(3);
        let map = maze(21, 15, Terrain::Wall, Terrain::Floor, &mut rng);
        let reached = floodfill_passable(&map);
        assert_eq!(reached.len(), map.count_passable());
        // Every odd cell is visited
        assert!(map.is_passable(1, 1));
        assert!(map.is_passable(19, 13));
        assert!(!dead_ends(&map).is_empty());
    }

    #[test]
    fn test_braiding_removes_dead_ends() {
        let conf = MazeConf { braid: 1.0 };
        let plain = maze(31, 21, Terrain::Wall, Terrain::Floor, &mut GameRng::new(4));
        let braided = maze_braided(31, 21, &conf, Terrain::Wall, Terrain::Floor, &mut GameRng::new(4));
        assert!(dead_ends(&braided).len() < dead_ends(&plain).len());
        assert_eq!(floodfill_passable(&braided).len(), braided.count_passable());
    }
}
