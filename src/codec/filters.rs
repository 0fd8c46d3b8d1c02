//! Codec for column filters.
//!
//! Wire form: `id:operator:value1,value2` entries joined by `;`,
//! percent-encoded as one unit. Ids and string values are arbitrary host
//! text, so each is percent-encoded individually first; a `,`, `:` or `;`
//! inside a value never collides with the entry separators. The format is
//! not self-describing: parsing needs the column definitions to know
//! whether to coerce each value token to a number, a
//! date-from-epoch-millis, or leave it as a string.
//!
//! Entries referencing an unknown column, carrying an operator foreign to
//! the column's type, or ending up with no values are dropped one at a
//! time with a log line; the remaining entries still parse. Serialization
//! likewise drops entries whose value shape no longer fits their operator.
//!
//! Dates travel as millisecond epoch integers; the open-ended number bound
//! travels as `inf`.

use chrono::{DateTime, Utc};

use crate::codec::{decode_component, encode_component};
use crate::columns::{find_column, ColumnDef, ColumnType};
use crate::filters::{ColumnFilter, FilterModel, FilterValue};
use crate::operators::{find_spec, value_shape_ok, Operator};

pub fn serialize(filters: &[ColumnFilter], columns: &[ColumnDef]) -> Option<String> {
    let entries: Vec<String> = filters
        .iter()
        .filter_map(|filter| serialize_entry(filter, columns))
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(encode_component(&entries.join(";")))
}

fn serialize_entry(filter: &ColumnFilter, columns: &[ColumnDef]) -> Option<String> {
    let Some(column) = find_column(columns, &filter.id) else {
        log::warn!("dropping filter for unknown column '{}'", filter.id);
        return None;
    };
    let model = &filter.value;
    if model.values.kind() != column.kind {
        log::warn!(
            "dropping filter for '{}': {} values on a {} column",
            filter.id,
            model.values.kind(),
            column.kind
        );
        return None;
    }
    let Some(spec) = find_spec(column.kind, model.operator) else {
        log::warn!(
            "dropping filter for '{}': operator '{}' not defined for {} columns",
            filter.id,
            model.operator,
            column.kind
        );
        return None;
    };
    if !value_shape_ok(spec, model.values.count()) {
        log::warn!(
            "dropping filter for '{}': {} value(s) do not fit operator '{}'",
            filter.id,
            model.values.count(),
            model.operator
        );
        return None;
    }
    let rendered = render_values(&model.values);
    if rendered.is_empty() {
        return None;
    }
    Some(format!(
        "{}:{}:{}",
        encode_component(&filter.id),
        model.operator.wire(),
        rendered.join(",")
    ))
}

fn render_values(values: &FilterValue) -> Vec<String> {
    let encode_all = |items: &[String]| -> Vec<String> {
        items.iter().map(|v| encode_component(v)).collect()
    };
    match values {
        FilterValue::Text(items) => encode_all(items),
        FilterValue::Option(items) => encode_all(items),
        FilterValue::Number(items) => items.iter().map(|n| render_number(*n)).collect(),
        FilterValue::Date(items) => items
            .iter()
            .map(|d| d.timestamp_millis().to_string())
            .collect(),
        // Normalization guarantees a single group; anything beyond the
        // first would have no wire representation.
        FilterValue::MultiOption(groups) => {
            encode_all(groups.first().map(Vec::as_slice).unwrap_or_default())
        }
    }
}

fn render_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 9e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}

pub fn parse(raw: Option<&str>, columns: &[ColumnDef]) -> Vec<ColumnFilter> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    decode_component(raw)
        .split(';')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| parse_entry(entry, columns))
        .collect()
}

fn parse_entry(entry: &str, columns: &[ColumnDef]) -> Option<ColumnFilter> {
    let mut parts = entry.splitn(3, ':');
    let id = parts.next()?;
    let operator_text = parts.next()?;
    let value_text = parts.next()?;
    if id.is_empty() || operator_text.is_empty() {
        return None;
    }
    let id = decode_component(id);
    let Some(column) = find_column(columns, &id) else {
        log::warn!("dropping wire filter for unknown column '{id}'");
        return None;
    };
    let operator = Operator::from_wire(operator_text)?;
    let spec = find_spec(column.kind, operator)?;
    let tokens: Vec<String> = value_text
        .split(',')
        .filter(|t| !t.is_empty())
        .map(decode_component)
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let values = coerce_values(column.kind, &tokens)?;
    if values.is_empty() || !value_shape_ok(spec, values.count()) {
        log::warn!("dropping wire filter for '{id}': value shape does not fit '{operator}'");
        return None;
    }
    Some(ColumnFilter::new(id, FilterModel::new(operator, values)))
}

fn coerce_values(kind: ColumnType, tokens: &[String]) -> Option<FilterValue> {
    match kind {
        ColumnType::Text => Some(FilterValue::Text(tokens.to_vec())),
        ColumnType::Option => Some(FilterValue::Option(tokens.to_vec())),
        ColumnType::MultiOption => Some(FilterValue::MultiOption(vec![tokens.to_vec()])),
        ColumnType::Number => {
            let numbers: Vec<f64> = tokens.iter().filter_map(|t| parse_number(t)).collect();
            if numbers.is_empty() {
                None
            } else {
                Some(FilterValue::Number(numbers))
            }
        }
        ColumnType::Date => {
            let dates: Vec<DateTime<Utc>> = tokens
                .iter()
                .filter_map(|t| t.parse::<i64>().ok())
                .filter_map(DateTime::from_timestamp_millis)
                .collect();
            if dates.is_empty() {
                None
            } else {
                Some(FilterValue::Date(dates))
            }
        }
    }
}

fn parse_number(token: &str) -> Option<f64> {
    match token {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("name", ColumnType::Text, "Name"),
            ColumnDef::new("age", ColumnType::Number, "Age"),
            ColumnDef::new("joined", ColumnType::Date, "Joined"),
            ColumnDef::new("status", ColumnType::Option, "Status"),
            ColumnDef::new("tags", ColumnType::MultiOption, "Tags"),
        ]
    }

    fn age_between(low: f64, high: f64) -> ColumnFilter {
        ColumnFilter::new(
            "age",
            FilterModel::new(Operator::Between, FilterValue::Number(vec![low, high])),
        )
    }

    #[test]
    fn number_range_round_trip() {
        let filters = vec![age_between(18.0, 65.0)];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn number_wire_has_no_decimal_point_for_integers() {
        let filters = vec![age_between(18.0, 65.0)];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(decode_component(&wire), "age:is between:18,65");
    }

    #[test]
    fn infinity_travels_as_inf() {
        let filters = vec![age_between(10.0, f64::INFINITY)];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(decode_component(&wire), "age:is between:10,inf");
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn dates_travel_as_epoch_millis() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let filters = vec![ColumnFilter::new(
            "joined",
            FilterModel::new(Operator::Is, FilterValue::Date(vec![when])),
        )];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(
            decode_component(&wire),
            format!("joined:is:{}", when.timestamp_millis())
        );
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn multiple_entries_round_trip() {
        let filters = vec![
            age_between(18.0, 65.0),
            ColumnFilter::new(
                "tags",
                FilterModel::new(
                    Operator::IncludeAnyOf,
                    FilterValue::MultiOption(vec![vec!["rust".into(), "work".into()]]),
                ),
            ),
            ColumnFilter::new(
                "name",
                FilterModel::new(Operator::Contains, FilterValue::Text(vec!["smith".into()])),
            ),
        ];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn unknown_column_dropped_on_both_sides() {
        let filters = vec![ColumnFilter::new(
            "ghost",
            FilterModel::new(Operator::Contains, FilterValue::Text(vec!["x".into()])),
        )];
        assert_eq!(serialize(&filters, &columns()), None);
        assert!(parse(Some("ghost%3Acontains%3Ax"), &columns()).is_empty());
    }

    #[test]
    fn foreign_operator_dropped() {
        // "include" is a multi-option operator; on a number column the
        // entry is dropped, not coerced.
        assert!(parse(Some("age%3Ainclude%3A7"), &columns()).is_empty());
    }

    #[test]
    fn bad_shape_dropped_on_serialize() {
        let filters = vec![ColumnFilter::new(
            "age",
            FilterModel::new(Operator::Between, FilterValue::Number(vec![18.0])),
        )];
        assert_eq!(serialize(&filters, &columns()), None);
    }

    #[test]
    fn unparseable_tokens_are_skipped() {
        let parsed = parse(Some("age%3Ais%3Aseventeen"), &columns());
        assert!(parsed.is_empty());
    }

    #[test]
    fn one_bad_entry_does_not_abort_the_rest() {
        let wire = encode_component("ghost:is:1;age:is:21");
        let parsed = parse(Some(&wire), &columns());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "age");
    }

    #[test]
    fn comma_in_text_value_round_trips() {
        let filters = vec![ColumnFilter::new(
            "name",
            FilterModel::new(
                Operator::Contains,
                FilterValue::Text(vec!["smith, jr".into()]),
            ),
        )];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn entry_separators_in_values_do_not_split_entries() {
        let filters = vec![
            ColumnFilter::new(
                "status",
                FilterModel::new(Operator::Is, FilterValue::Option(vec!["a:b;c,d".into()])),
            ),
            age_between(18.0, 65.0),
        ];
        let wire = serialize(&filters, &columns()).unwrap();
        assert_eq!(parse(Some(&wire), &columns()), filters);
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert!(parse(Some("garbage;;:::"), &columns()).is_empty());
        assert!(parse(None, &columns()).is_empty());
    }
}
