//! Built-in castle, crypt and nest catalogs

use super::catalog::TemplateCatalog;
use crate::error::GenResult;

const FILLER: &str = "
@filler filler 0
#######
#######
#######
#######
#######
#######
#######
";

const CASTLE: &str = "
@corridor corridor 6 rot
#######
#######
#######
.......
#######
#######
#######

@corridor_corner corridor 3 rot
###.###
###.###
###.###
###....
#######
#######
#######

@corridor_tee corridor 3 rot
###.###
###.###
###.###
.......
#######
#######
#######

@hall cross 2
###.###
#.....#
#.....#
.......
#.....#
#.....#
###.###

@entrance entrance 4 rot
###.###
#.....#
#.:.:.#
#.....#
#.:.:.#
#.....#
###+###

@quarters room 5 rot
#######
#.:.:.#
#.....#
#.:.:.#
#.....#
#.....#
###+###

@passage_room room 4 rot
###+###
#.....#
#.....#
#.....#
#.....#
#.....#
###+###

@great_room room 2
###+###
#.....#
#.....#
+.....+
#.....#
#.....#
###+###

@storeroom storeroom 3 rot
#######
#??.??#
#.....#
#.....+
#.....#
#??.??#
#######

@vault vault 1 rot
#######
#?????#
#?...?#
#.....#
#.....#
#.&...#
###|###
";

const CRYPT: &str = "
@crypt_corridor corridor 6 rot
#######
#######
#######
.......
#######
#######
#######

@crypt_corner corridor 3 rot
###.###
###.###
###.###
###....
#######
#######
#######

@crypt_tee corridor 2 rot
###.###
###.###
###.###
.......
#######
#######
#######

@crypt_cross cross 2
###.###
###.###
###.###
.......
###.###
###.###
###.###

@tomb room 4 rot
#######
#.#.#.#
#.....#
#.#.#.#
#.....#
#.?.?.#
###.###

@chapel room 2 rot
###.###
#.....#
#.#.#.#
.......
#.#.#.#
#..?..#
#######

@ossuary storeroom 2 rot
#######
#?.?.?#
#.....#
#.....#
#.....#
#.....#
###+###
";

const NEST: &str = "
@nest_tunnel corridor 5 rot
#######
##..###
#.....#
.......
#.....#
###..##
#######

@nest_bend corridor 3 rot
###.###
##...##
#.....#
#......
#.....#
##...##
#######

@nest_chamber nest 4 rot
###.###
#?...?#
#.....#
#..?..#
#.....#
#?...?#
###.###

@nest_den nest 4 rot
#######
#.?.?.#
#.....#
#..?..#
#.....#
##...##
###.###

@nest_hub cross 2
###.###
#.....#
#.....#
.......
#.....#
#.....#
###.###
";

fn with_filler(body: &str) -> GenResult<TemplateCatalog> {
    TemplateCatalog::parse(&format!("{}{}", FILLER, body))
}

pub fn castle_catalog() -> GenResult<TemplateCatalog> {
    with_filler(CASTLE)
}

pub fn crypt_catalog() -> GenResult<TemplateCatalog> {
    with_filler(CRYPT)
}

pub fn nest_catalog() -> GenResult<TemplateCatalog> {
    with_filler(NEST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TileCategory;

    #[test]
    fn test_builtin_catalogs_parse() {
        for cat in [castle_catalog(), crypt_catalog(), nest_catalog()] {
            let cat = cat.unwrap();
            assert!(cat.len() > 10);
            assert_eq!(cat.filler().name, "filler");
        }
    }

    #[test]
    fn test_castle_categories() {
        let cat = castle_catalog().unwrap();
        for category in [
            TileCategory::Corridor,
            TileCategory::Entrance,
            TileCategory::Storeroom,
            TileCategory::Vault,
            TileCategory::Room,
            TileCategory::Cross,
        ] {
            assert!(
                cat.templates().iter().any(|t| t.category == category),
                "missing {}",
                category
            );
        }
    }

    #[test]
    fn test_vault_lever_next_to_door() {
        let cat = castle_catalog().unwrap();
        let vault = cat.get("vault").unwrap();
        assert_eq!(vault.char_at(2, 5), '&');
        assert_eq!(vault.char_at(3, 6), '|');
    }
}
