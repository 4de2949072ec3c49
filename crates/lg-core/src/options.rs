//! Loading generator options from JSON
//!
//! Every options struct in the crate derives `Deserialize` with
//! `#[serde(default)]`, so a partial document only overrides what it names.

use serde::de::DeserializeOwned;

use crate::error::{report, GenError, GenResult};

/// Parse an options struct from a JSON document.
pub fn from_json<T: DeserializeOwned>(json: &str) -> GenResult<T> {
    serde_json::from_str(json).map_err(|e| report(GenError::InvalidOptions(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DungeonOptions;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let opts: DungeonOptions = from_json(r#"{ "min_num_rooms": 7 }"#).unwrap();
        let defaults = DungeonOptions::default();
        assert_eq!(opts.min_num_rooms, 7);
        assert_eq!(opts.min_path_len, defaults.min_path_len);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        let res: GenResult<DungeonOptions> = from_json("{ not json");
        assert!(res.is_err());
    }
}
