//! Query-state codecs.
//!
//! Each state slice has its own small codec: a `parse` that is total
//! (malformed input degrades to the slice's default, with a log line, and
//! never fails the other slices) and a `serialize` that is partial
//! (`None` means "this is the default, omit the key so URLs stay short").
//!
//! The assembled wire contract is [`DataQueryState`]: a flat record of
//! independently optional, independently parseable strings and numbers. A
//! persistence layer (URL query string, storage) round-trips it
//! byte-for-byte and never needs to understand the contents.
//!
//! Encoding happens at two layers. Ids and free-form value tokens are
//! percent-encoded individually, so a `,`, `:` or `;` inside a token never
//! collides with the slice's own separators. The assembled slice string is
//! then percent-encoded once more as a single unit for URL embedding of
//! the record itself.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnDef;
use crate::state::TableState;

pub mod filters;
pub mod flags;
pub mod id_list;
pub mod pagination;
pub mod sorting;

/// The serialized form of the whole table state.
///
/// All keys are optional; an absent key decodes to the slice's default.
/// `hidden` and `selected` are asymmetric flag lists: only hidden columns
/// and only selected rows appear, so the default (visible / unselected)
/// costs nothing on the wire. Note the compatibility hazard this buys:
/// if a column's *definition* default flips between versions, a persisted
/// `hidden` list silently reinterprets. That is inherent to the format,
/// not something this codec can detect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQueryState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(
        default,
        rename = "columnFilters",
        skip_serializing_if = "Option::is_none"
    )]
    pub column_filters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DataQueryState {
    /// True when every key is absent, i.e. the whole state is default.
    pub fn is_empty(&self) -> bool {
        *self == DataQueryState::default()
    }
}

/// Serialize live table state into the wire record.
pub fn encode(
    state: &TableState,
    columns: &[ColumnDef],
    default_page_size: usize,
) -> DataQueryState {
    let (page, size) = pagination::serialize(&state.pagination, default_page_size);
    DataQueryState {
        hidden: flags::serialize(&state.visibility, false),
        left: id_list::serialize(&state.pinning.left),
        right: id_list::serialize(&state.pinning.right),
        selected: flags::serialize(&state.selection, true),
        search: serialize_search(&state.search),
        column_filters: filters::serialize(&state.filters, columns),
        sorting: sorting::serialize(&state.sorting),
        page,
        size,
    }
}

/// Parse the wire record back into live table state.
///
/// Total: any slice that fails to parse comes back as its default without
/// disturbing the others.
pub fn decode(
    query: &DataQueryState,
    columns: &[ColumnDef],
    default_page_size: usize,
) -> TableState {
    TableState {
        visibility: flags::parse(query.hidden.as_deref(), false),
        pinning: crate::state::ColumnPinning {
            left: id_list::parse(query.left.as_deref()),
            right: id_list::parse(query.right.as_deref()),
        }
        .sanitized(),
        selection: flags::parse(query.selected.as_deref(), true),
        filters: filters::parse(query.column_filters.as_deref(), columns),
        sorting: sorting::parse(query.sorting.as_deref()),
        pagination: pagination::parse(query.page, query.size, default_page_size),
        search: parse_search(query.search.as_deref()),
    }
}

/// Free-text search: trimmed, empty omitted.
pub fn serialize_search(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(encode_component(trimmed))
    }
}

pub fn parse_search(raw: Option<&str>) -> String {
    raw.map(decode_component).unwrap_or_default()
}

/// Percent-encode one unit: a single token or a whole assembled slice.
pub(crate) fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Inverse of [`encode_component`]; invalid sequences fall back to the raw
/// text so a garbled slice degrades instead of erroring.
pub(crate) fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => {
            log::warn!("undecodable percent-encoding in '{raw}', using raw text");
            raw.to_string()
        }
    }
}
