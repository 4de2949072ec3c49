use proptest::prelude::*;

use lg_core::entity::TableFactory;
use lg_core::generator::{DungeonGenerator, DungeonOptions, LevelGenerator, markers_to_doors};
use lg_core::geom::{Dir, floodfill};
use lg_core::level::{Level, StairsDir, connect_stairs, stairs_linked};
use lg_core::map::{Cell, CellMap, ElementKind, MarkerKind, Terrain};
use lg_core::population::add_main_loot;
use lg_core::template::{StartRoom, TilingConf, castle_catalog, tile_map};
use lg_core::{GameRng, UNREACHABLE_TOLERANCE};

fn quiet_dungeon() -> DungeonOptions {
    DungeonOptions {
        add_actors: false,
        add_items: false,
        ..Default::default()
    }
}

#[test]
fn test_dungeons_stay_connected() {
    let opts = DungeonOptions {
        rerun_on_failure: true,
        error_on_failure: true,
        ..quiet_dungeon()
    };
    for seed in 10..16 {
        let mut rng = GameRng::new(seed);
        let Ok(level) = DungeonGenerator::default().create(80, 40, &opts, &mut rng) else {
            continue;
        };
        let map = level.map();
        let start = level.extras().start_point.unwrap();
        let reached = floodfill(map, start, Cell::is_passable, true);
        let missing = map
            .coords_where(Cell::is_passable)
            .into_iter()
            .filter(|p| !reached.contains(p))
            .count();
        assert!(missing <= UNREACHABLE_TOLERANCE, "seed {}: {} unreachable", seed, missing);
    }
}

#[test]
fn test_stairs_link_both_ways_or_not_at_all() {
    let mut a = Level::new(CellMap::new(5, 5, Terrain::Floor));
    let mut b = Level::new(CellMap::new(5, 5, Terrain::Floor));
    a.add_stairs(StairsDir::Down, 1, 1);
    assert!(connect_stairs(&mut a, (1, 1), &mut b, (2, 2)).is_err());
    assert!(a.stairs_at(1, 1).is_some_and(|s| s.target().is_none()));

    b.add_stairs(StairsDir::Up, 2, 2);
    connect_stairs(&mut a, (1, 1), &mut b, (2, 2)).unwrap();
    assert!(stairs_linked(&a, (1, 1), &b, (2, 2)));
    assert!(stairs_linked(&b, (2, 2), &a, (1, 1)));
}

#[test]
fn test_door_resolution_is_idempotent() {
    let mut level = Level::new(CellMap::from_ascii("#####\n#+.+#\n#.+.#\n#+..#\n#####"));
    let markers = level.cells_with_marker(MarkerKind::Door).len();
    assert_eq!(markers_to_doors(&mut level).len(), markers);
    assert!(markers_to_doors(&mut level).is_empty());
    assert_eq!(level.cells_with_element(ElementKind::Door).len(), markers);
}

#[test]
fn test_breaking_never_shortens_the_critical_path() {
    for seed in 20..24 {
        let short = DungeonOptions {
            min_path_len: 0,
            verify: false,
            ..quiet_dungeon()
        };
        let long = DungeonOptions {
            min_path_len: 50,
            ..short.clone()
        };
        let base = DungeonGenerator::default()
            .create(80, 40, &short, &mut GameRng::new(seed))
            .unwrap();
        let broken = DungeonGenerator::default()
            .create(80, 40, &long, &mut GameRng::new(seed))
            .unwrap();
        let (a, b) = (base.extras().critical_path.len(), broken.extras().critical_path.len());
        assert!(b >= a, "seed {}: {} < {}", seed, b, a);
    }
}

fn shared_exits_match(seed: u64, tiles: usize) -> bool {
    let catalog = match castle_catalog() {
        Ok(c) => c,
        Err(_) => return false,
    };
    let conf = TilingConf {
        tiles_x: tiles,
        tiles_y: tiles,
        start_room: StartRoom::TwoGatesOpposite,
        try_to_match_all_exits: true,
        ..Default::default()
    };
    let Ok(tiled) = tile_map(&catalog, &conf, &mut GameRng::new(seed)) else {
        return false;
    };
    tiled.placed.iter().all(|a| {
        tiled.placed.iter().all(|b| {
            if (a.slot.0 + 1, a.slot.1) == b.slot {
                a.exits[Dir::E.index()] == b.exits[Dir::W.index()]
            } else if (a.slot.0, a.slot.1 + 1) == b.slot {
                a.exits[Dir::S.index()] == b.exits[Dir::N.index()]
            } else {
                true
            }
        })
    })
}

proptest! {
    #[test]
    fn prop_tile_neighbours_agree_on_exits(seed in 0u64..10_000, tiles in 2usize..7) {
        prop_assert!(shared_exits_match(seed, tiles));
    }

    #[test]
    fn prop_main_loot_stays_in_window(seed in 0u64..10_000, max_value in 1u32..1500) {
        let mut level = Level::new(CellMap::new(9, 9, Terrain::Floor));
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(seed);
        if add_main_loot(&mut level, &mut factory, (4, 4), max_value, &mut rng) {
            let items = level.items();
            prop_assert_eq!(items.len(), 1);
            let value = items[0].1.value;
            prop_assert!(value >= max_value && value <= 2 * max_value);
        }
    }

    #[test]
    fn prop_main_loot_needs_an_open_cell(seed in 0u64..1_000, max_value in 1u32..500) {
        let mut level = Level::new(CellMap::new(9, 9, Terrain::Wall));
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(seed);
        prop_assert!(!add_main_loot(&mut level, &mut factory, (4, 4), max_value, &mut rng));
        prop_assert!(level.items().is_empty());
    }
}
