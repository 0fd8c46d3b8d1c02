//! Codec for the ordered sorting list.
//!
//! Wire form: `id:dir` entries joined by `;`, with `dir` one of `asc` or
//! `desc`, percent-encoded as one unit. Ids are percent-encoded
//! individually first so a `:` or `;` inside an id survives the entry
//! split. Entry order is sort precedence.
//! Malformed entries are dropped individually; one bad entry never aborts
//! the rest.

use std::collections::HashSet;

use crate::codec::{decode_component, encode_component};
use crate::state::SortEntry;

pub fn serialize(entries: &[SortEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let joined = entries
        .iter()
        .map(|entry| {
            format!(
                "{}:{}",
                encode_component(&entry.id),
                if entry.desc { "desc" } else { "asc" }
            )
        })
        .collect::<Vec<_>>()
        .join(";");
    Some(encode_component(&joined))
}

pub fn parse(raw: Option<&str>) -> Vec<SortEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let decoded = decode_component(raw);
    let mut seen = HashSet::new();
    decoded
        .split(';')
        .filter_map(|entry| {
            let (id, dir) = entry.split_once(':')?;
            if id.is_empty() {
                return None;
            }
            let id = decode_component(id);
            let desc = match dir {
                "asc" => false,
                "desc" => true,
                other => {
                    log::warn!("dropping sort entry '{id}': invalid direction '{other}'");
                    return None;
                }
            };
            // Sort ids are unique; a repeated id keeps its first position.
            if !seen.insert(id.clone()) {
                return None;
            }
            Some(SortEntry { id, desc })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, desc: bool) -> SortEntry {
        SortEntry {
            id: id.to_string(),
            desc,
        }
    }

    #[test]
    fn concrete_wire_form() {
        let entries = vec![entry("name", false), entry("age", true)];
        let wire = serialize(&entries).unwrap();
        assert_eq!(wire, "name%3Aasc%3Bage%3Adesc");
        assert_eq!(parse(Some(&wire)), entries);
    }

    #[test]
    fn empty_list_is_omitted() {
        assert_eq!(serialize(&[]), None);
        assert!(parse(None).is_empty());
    }

    #[test]
    fn malformed_entries_dropped_individually() {
        let parsed = parse(Some("name%3Aasc%3B%3B%3Asideways%3Bage%3Adesc"));
        assert_eq!(parsed, vec![entry("name", false), entry("age", true)]);
    }

    #[test]
    fn invalid_direction_dropped() {
        assert!(parse(Some("name%3Aup")).is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let parsed = parse(Some("name%3Aasc%3Bname%3Adesc"));
        assert_eq!(parsed, vec![entry("name", false)]);
    }

    #[test]
    fn separator_in_id_round_trips() {
        let entries = vec![entry("meta:priority", true), entry("name", false)];
        let wire = serialize(&entries).unwrap();
        assert_eq!(parse(Some(&wire)), entries);
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert!(parse(Some("garbage;;:::")).is_empty());
    }
}
