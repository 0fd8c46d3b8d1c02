//! Codec for ordered id lists (column pinning).
//!
//! Wire form: comma-joined ids, each percent-encoded individually so a
//! comma inside an id survives the split, then percent-encoded again as
//! one unit. An empty list is the default and serializes to `None`.

use crate::codec::{decode_component, encode_component};

pub fn serialize(ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let joined = ids
        .iter()
        .map(|id| encode_component(id))
        .collect::<Vec<_>>()
        .join(",");
    Some(encode_component(&joined))
}

pub fn parse(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    decode_component(raw)
        .split(',')
        .filter(|id| !id.is_empty())
        .map(decode_component)
        .collect()
}
