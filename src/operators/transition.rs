//! Operator transitions driven by value edits.
//!
//! When the user edits a filter's values, the operator may need to follow:
//! a multi-option "include" with two selections is really "include any of",
//! a number "is" with a second value is really "is between". [`resolve`]
//! decides the new operator from the old and new value sets. Explicit
//! operator changes from a menu go through [`apply_operator`] instead, which
//! keeps values and only reshapes them when the arity no longer fits.

use crate::columns::ColumnType;
use crate::filters::{FilterModel, FilterValue};
use crate::operators::{details_for, find_spec, Arity, Operator};

/// Decide the operator after a value edit.
///
/// Returns `None` when the new value set is empty, meaning the filter must
/// be cleared rather than kept with a dangling operator.
pub fn resolve(
    kind: ColumnType,
    old_values: &FilterValue,
    new_values: &FilterValue,
    old_op: Operator,
) -> Option<Operator> {
    if new_values.is_empty() {
        return None;
    }
    let spec = details_for(kind, old_op);
    let old_count = old_values.count();
    let new_count = new_values.count();

    match kind {
        // Promote single-target operators when the selection grows past one
        // value; demote when it shrinks back. The relative pairing keeps
        // exclusion operators in the exclusion family, and operators with
        // no relative (the "all of" family) never auto-change.
        ColumnType::MultiOption | ColumnType::Number | ColumnType::Date => {
            if old_count <= 1 && new_count > 1 && spec.arity == Arity::Single {
                return Some(spec.relative.unwrap_or(old_op));
            }
            if new_count <= 1 && spec.arity == Arity::Multiple {
                return Some(spec.relative.unwrap_or(old_op));
            }
            Some(old_op)
        }
        // Text and option operators are chosen explicitly, never inferred
        // from the value count.
        ColumnType::Text | ColumnType::Option => Some(old_op),
    }
}

/// Apply an explicitly selected operator to an existing model.
///
/// Values are preserved; when the new operator's arity no longer fits they
/// are truncated (range to single: keep the first) or padded (single to
/// range: duplicate the value).
pub fn apply_operator(model: FilterModel, new_op: Operator) -> FilterModel {
    let kind = model.values.kind();
    let Some(spec) = find_spec(kind, new_op) else {
        // Foreign operator for this type; keep the model unchanged.
        log::warn!(
            "operator '{}' is not defined for {} columns, keeping '{}'",
            new_op,
            kind,
            model.operator
        );
        return model;
    };

    let needs_two = matches!(new_op, Operator::Between | Operator::NotBetween);
    let values = match (spec.arity, model.values) {
        (Arity::Single, FilterValue::Text(v)) => FilterValue::Text(v.into_iter().take(1).collect()),
        (Arity::Single, FilterValue::Number(v)) => {
            FilterValue::Number(v.into_iter().take(1).collect())
        }
        (Arity::Single, FilterValue::Date(v)) => FilterValue::Date(v.into_iter().take(1).collect()),
        (Arity::Single, FilterValue::Option(v)) => {
            FilterValue::Option(v.into_iter().take(1).collect())
        }
        (Arity::Multiple, FilterValue::Number(v)) if needs_two => {
            FilterValue::Number(pad_pair(v))
        }
        (Arity::Multiple, FilterValue::Date(v)) if needs_two => FilterValue::Date(pad_pair(v)),
        (_, values) => values,
    };

    FilterModel::new(new_op, values)
}

fn pad_pair<T: Clone>(values: Vec<T>) -> Vec<T> {
    match values.len() {
        0 => values,
        1 => vec![values[0].clone(), values[0].clone()],
        _ => values.into_iter().take(2).collect(),
    }
}
