//! Codec for boolean records encoded as flag lists.
//!
//! Visibility and row selection are maps from id to bool where the absent
//! key means "default". Only the keys whose value equals the codec's fixed
//! target are written: `false` for the hidden-columns list, `true` for the
//! selected-rows list. Presence in the list *is* the flag; the wire format
//! is deliberately asymmetric.

use std::collections::BTreeMap;

use crate::codec::{decode_component, encode_component};

pub fn serialize(record: &BTreeMap<String, bool>, target: bool) -> Option<String> {
    // Row ids are arbitrary host strings; encode each so a comma inside
    // a key survives the split on parse.
    let keys: Vec<String> = record
        .iter()
        .filter(|(_, v)| **v == target)
        .map(|(k, _)| encode_component(k))
        .collect();
    if keys.is_empty() {
        return None;
    }
    Some(encode_component(&keys.join(",")))
}

pub fn parse(raw: Option<&str>, target: bool) -> BTreeMap<String, bool> {
    let Some(raw) = raw else {
        return BTreeMap::new();
    };
    decode_component(raw)
        .split(',')
        .filter(|key| !key.is_empty())
        .map(|key| (decode_component(key), target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn only_target_keys_are_written() {
        let visibility = record(&[("a", true), ("b", false), ("c", false)]);
        assert_eq!(serialize(&visibility, false), Some("b%2Cc".to_string()));
    }

    #[test]
    fn all_default_serializes_to_none() {
        // Every column explicitly visible: nothing to persist.
        let visibility = record(&[("a", true), ("b", true)]);
        assert_eq!(serialize(&visibility, false), None);
        assert_eq!(serialize(&BTreeMap::new(), false), None);
    }

    #[test]
    fn parse_maps_keys_to_target() {
        let parsed = parse(Some("b%2Cc"), false);
        assert_eq!(parsed, record(&[("b", false), ("c", false)]));

        let selected = parse(Some("row-1"), true);
        assert_eq!(selected, record(&[("row-1", true)]));
    }

    #[test]
    fn round_trip_loses_explicit_defaults() {
        // {a: true} for the hidden list means "a is visible", which is the
        // default and therefore not persisted.
        let visibility = record(&[("a", true)]);
        assert_eq!(serialize(&visibility, false), None);
        assert!(parse(None, false).is_empty());
    }

    #[test]
    fn comma_in_row_id_round_trips() {
        let selection = record(&[("doe, jane", true), ("row-2", true)]);
        let wire = serialize(&selection, true).unwrap();
        assert_eq!(parse(Some(&wire), true), selection);
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert!(parse(Some(",,,"), false).is_empty());
    }
}
