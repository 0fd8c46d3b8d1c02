//! Value normalization.
//!
//! Every filter model passes through [`normalize_model`] before it is
//! stored or serialized. The rules per type:
//!
//! - number ranges are stored sorted ascending, with an upper bound at or
//!   beyond [`NUMBER_CAP`] widened to the open-ended infinity sentinel;
//! - a date range whose end falls on a later calendar day gets its end
//!   moved to the end of that day, and a same-day pair collapses to a
//!   single-value `is` filter;
//! - option ids are deduplicated preserving first occurrence;
//! - multi-option groups are merged into one deduplicated group;
//! - empty text values are discarded.
//!
//! A model whose values come out empty yields `None`: the filter is to be
//! removed, not stored degenerate.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::columns::ColumnType;
use crate::filters::{FilterModel, FilterValue};
use crate::operators::{find_spec, Arity, Operator};

/// Largest exactly-representable integer bound. Anything at or above it is
/// treated as "no upper bound" and stored as infinity.
pub const NUMBER_CAP: f64 = 9_007_199_254_740_991.0;

/// Normalize a filter model. `None` means the filter is empty and must be
/// cleared.
pub fn normalize_model(model: FilterModel) -> Option<FilterModel> {
    let FilterModel { operator, values } = model;
    match values {
        FilterValue::Text(items) => {
            let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
            let items = truncate_single(operator, ColumnType::Text, items);
            wrap(operator, FilterValue::Text(items))
        }
        FilterValue::Number(items) => normalize_number(operator, items),
        FilterValue::Date(items) => normalize_date(operator, items),
        FilterValue::Option(items) => {
            let items = truncate_single(operator, ColumnType::Option, dedup(items));
            wrap(operator, FilterValue::Option(items))
        }
        FilterValue::MultiOption(groups) => {
            let merged = dedup(groups.into_iter().flatten().collect());
            if merged.is_empty() {
                return None;
            }
            wrap(operator, FilterValue::MultiOption(vec![merged]))
        }
    }
}

fn normalize_number(operator: Operator, items: Vec<f64>) -> Option<FilterModel> {
    if items.is_empty() {
        return None;
    }
    if is_range(operator) && items.len() >= 2 {
        let mut bounds = [items[0], items[1]];
        bounds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let lower = bounds[0];
        let upper = if bounds[1] >= NUMBER_CAP {
            f64::INFINITY
        } else {
            bounds[1]
        };
        return Some(FilterModel::new(operator, FilterValue::Number(vec![lower, upper])));
    }
    if !is_range(operator) {
        return Some(FilterModel::new(
            operator,
            FilterValue::Number(vec![items[0]]),
        ));
    }
    // Range operator with a single value: keep it, the shape check on
    // serialize will drop it unless the caller pads the range first.
    Some(FilterModel::new(operator, FilterValue::Number(items)))
}

fn normalize_date(operator: Operator, items: Vec<DateTime<Utc>>) -> Option<FilterModel> {
    if items.is_empty() {
        return None;
    }
    if is_range(operator) && items.len() >= 2 {
        let (start, end) = if items[0] <= items[1] {
            (items[0], items[1])
        } else {
            (items[1], items[0])
        };
        if start.date_naive() == end.date_naive() {
            // A degenerate same-day range reads better as a plain "is".
            let collapsed = if operator == Operator::Between {
                Operator::Is
            } else {
                operator
            };
            return Some(FilterModel::new(collapsed, FilterValue::Date(vec![start])));
        }
        return Some(FilterModel::new(
            operator,
            FilterValue::Date(vec![start, end_of_day(end)]),
        ));
    }
    if !is_range(operator) {
        return Some(FilterModel::new(operator, FilterValue::Date(vec![items[0]])));
    }
    Some(FilterModel::new(operator, FilterValue::Date(items)))
}

/// Move a timestamp to the last millisecond of its calendar day.
pub fn end_of_day(moment: DateTime<Utc>) -> DateTime<Utc> {
    match moment.date_naive().and_hms_milli_opt(23, 59, 59, 999) {
        Some(t) => t.and_utc(),
        None => moment,
    }
}

fn is_range(operator: Operator) -> bool {
    matches!(operator, Operator::Between | Operator::NotBetween)
}

fn wrap(operator: Operator, values: FilterValue) -> Option<FilterModel> {
    if values.is_empty() {
        None
    } else {
        Some(FilterModel::new(operator, values))
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn truncate_single(operator: Operator, kind: ColumnType, items: Vec<String>) -> Vec<String> {
    match find_spec(kind, operator) {
        Some(spec) if spec.arity == Arity::Single => items.into_iter().take(1).collect(),
        _ => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn number_range_sorts_ascending() {
        let model = FilterModel::new(Operator::Between, FilterValue::Number(vec![50.0, 10.0]));
        let normalized = normalize_model(model).unwrap();
        assert_eq!(normalized.values, FilterValue::Number(vec![10.0, 50.0]));
    }

    #[test]
    fn capped_upper_bound_becomes_infinity() {
        let model = FilterModel::new(
            Operator::Between,
            FilterValue::Number(vec![10.0, NUMBER_CAP]),
        );
        let normalized = normalize_model(model).unwrap();
        assert_eq!(
            normalized.values,
            FilterValue::Number(vec![10.0, f64::INFINITY])
        );
    }

    #[test]
    fn single_number_operator_truncates() {
        let model = FilterModel::new(Operator::Is, FilterValue::Number(vec![3.0, 4.0]));
        let normalized = normalize_model(model).unwrap();
        assert_eq!(normalized.values, FilterValue::Number(vec![3.0]));
    }

    #[test]
    fn date_range_end_moves_to_end_of_day() {
        let model = FilterModel::new(
            Operator::Between,
            FilterValue::Date(vec![date(2024, 3, 1, 9), date(2024, 3, 5, 9)]),
        );
        let normalized = normalize_model(model).unwrap();
        let FilterValue::Date(values) = &normalized.values else {
            panic!("expected date values");
        };
        assert_eq!(values[0], date(2024, 3, 1, 9));
        assert_eq!(
            values[1],
            Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn same_day_range_collapses_to_is() {
        let model = FilterModel::new(
            Operator::Between,
            FilterValue::Date(vec![date(2024, 3, 1, 9), date(2024, 3, 1, 18)]),
        );
        let normalized = normalize_model(model).unwrap();
        assert_eq!(normalized.operator, Operator::Is);
        assert_eq!(
            normalized.values,
            FilterValue::Date(vec![date(2024, 3, 1, 9)])
        );
    }

    #[test]
    fn unordered_dates_sort_before_boundary_handling() {
        let model = FilterModel::new(
            Operator::Between,
            FilterValue::Date(vec![date(2024, 3, 5, 9), date(2024, 3, 1, 9)]),
        );
        let normalized = normalize_model(model).unwrap();
        let FilterValue::Date(values) = &normalized.values else {
            panic!("expected date values");
        };
        assert_eq!(values[0], date(2024, 3, 1, 9));
    }

    #[test]
    fn option_values_dedup_preserving_order() {
        let model = FilterModel::new(
            Operator::AnyOf,
            FilterValue::Option(vec!["b".into(), "a".into(), "b".into()]),
        );
        let normalized = normalize_model(model).unwrap();
        assert_eq!(
            normalized.values,
            FilterValue::Option(vec!["b".into(), "a".into()])
        );
    }

    #[test]
    fn multi_option_groups_merge() {
        let model = FilterModel::new(
            Operator::IncludeAnyOf,
            FilterValue::MultiOption(vec![vec!["a".into()], vec!["b".into(), "a".into()]]),
        );
        let normalized = normalize_model(model).unwrap();
        assert_eq!(
            normalized.values,
            FilterValue::MultiOption(vec![vec!["a".into(), "b".into()]])
        );
    }

    #[test]
    fn empty_values_clear_the_filter() {
        assert!(normalize_model(FilterModel::new(
            Operator::Contains,
            FilterValue::Text(vec!["".into()])
        ))
        .is_none());
        assert!(normalize_model(FilterModel::new(
            Operator::Include,
            FilterValue::MultiOption(vec![vec![]])
        ))
        .is_none());
    }
}
