//! Filter values and models.
//!
//! Filter values are a tagged union, one variant per column type, never a
//! single "any shape" container. The codec and the transition resolver
//! match exhaustively on the variant, so a shape mismatch is impossible to
//! express rather than merely unlikely.

use chrono::{DateTime, Utc};

use crate::columns::ColumnType;
use crate::operators::Operator;

pub mod normalize;

pub use normalize::{normalize_model, NUMBER_CAP};

/// Per-type container for a filter's values.
///
/// Multi-option values are nested: each inner list is one group of option
/// ids. Normalization collapses the groups to one (see
/// [`normalize::normalize_model`]).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(Vec<String>),
    Number(Vec<f64>),
    Date(Vec<DateTime<Utc>>),
    Option(Vec<String>),
    MultiOption(Vec<Vec<String>>),
}

impl FilterValue {
    /// The column type this value belongs to.
    pub fn kind(&self) -> ColumnType {
        match self {
            FilterValue::Text(_) => ColumnType::Text,
            FilterValue::Number(_) => ColumnType::Number,
            FilterValue::Date(_) => ColumnType::Date,
            FilterValue::Option(_) => ColumnType::Option,
            FilterValue::MultiOption(_) => ColumnType::MultiOption,
        }
    }

    /// Number of selected values, as the operator arity sees it.
    ///
    /// For multi-option this counts the items of the first group, which is
    /// the only group after normalization.
    pub fn count(&self) -> usize {
        match self {
            FilterValue::Text(v) => v.len(),
            FilterValue::Number(v) => v.len(),
            FilterValue::Date(v) => v.len(),
            FilterValue::Option(v) => v.len(),
            FilterValue::MultiOption(groups) => groups.first().map_or(0, |g| g.len()),
        }
    }

    /// True when no value is selected. An empty value set means the filter
    /// should be removed entirely.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::MultiOption(groups) => groups.iter().all(|g| g.is_empty()),
            other => other.count() == 0,
        }
    }
}

/// A filter's operator together with its values.
///
/// Invariant: the operator belongs to the registry table for
/// `values.kind()` and the value count fits the operator's arity. The
/// codec drops models violating this on serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterModel {
    pub operator: Operator,
    pub values: FilterValue,
}

impl FilterModel {
    pub fn new(operator: Operator, values: FilterValue) -> Self {
        Self { operator, values }
    }
}

/// A per-column filter: the column id plus its model.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterModel,
}

impl ColumnFilter {
    pub fn new(id: impl Into<String>, value: FilterModel) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}
