//! Filter operator registry.
//!
//! This module is the single source of truth for which operators each
//! column type supports, each operator's arity (single value vs range/list)
//! and label, and how operators pair up across arities. The tables are
//! closed and statically known; adding an operator means adding an entry
//! here.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::columns::ColumnType;

pub mod transition;

pub use transition::{apply_operator, resolve};

/// Every filter operator across all column types.
///
/// Wire names are the human labels (e.g. `is between`); several types share
/// a wire name (`is` appears for number, date, and option columns), which
/// is unambiguous because decoding is always parameterized by column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // text
    Contains,
    NotContains,
    // number / date / option singles
    Is,
    IsNot,
    // number comparisons
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    // number / date ranges
    Between,
    NotBetween,
    // date comparisons
    Before,
    OnOrAfter,
    After,
    OnOrBefore,
    // option lists
    AnyOf,
    NoneOf,
    // multi-option
    Include,
    Exclude,
    IncludeAnyOf,
    ExcludeIfAnyOf,
    IncludeAllOf,
    ExcludeIfAll,
}

impl Operator {
    /// The wire/label text for this operator.
    pub fn wire(&self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::NotContains => "does not contain",
            Operator::Is => "is",
            Operator::IsNot => "is not",
            Operator::GreaterThan => "is greater than",
            Operator::GreaterThanOrEqual => "is greater than or equal to",
            Operator::LessThan => "is less than",
            Operator::LessThanOrEqual => "is less than or equal to",
            Operator::Between => "is between",
            Operator::NotBetween => "is not between",
            Operator::Before => "is before",
            Operator::OnOrAfter => "is on or after",
            Operator::After => "is after",
            Operator::OnOrBefore => "is on or before",
            Operator::AnyOf => "is any of",
            Operator::NoneOf => "is none of",
            Operator::Include => "include",
            Operator::Exclude => "exclude",
            Operator::IncludeAnyOf => "include any of",
            Operator::ExcludeIfAnyOf => "exclude if any of",
            Operator::IncludeAllOf => "include all of",
            Operator::ExcludeIfAll => "exclude if all",
        }
    }

    /// Parse wire text back into an operator. Unknown text yields `None`;
    /// the codec drops the surrounding entry.
    pub fn from_wire(text: &str) -> Option<Operator> {
        WIRE_NAMES.get(text).copied()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire())
    }
}

static WIRE_NAMES: Lazy<HashMap<&'static str, Operator>> = Lazy::new(|| {
    ALL_OPERATORS.iter().map(|op| (op.wire(), *op)).collect()
});

const ALL_OPERATORS: &[Operator] = &[
    Operator::Contains,
    Operator::NotContains,
    Operator::Is,
    Operator::IsNot,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::Between,
    Operator::NotBetween,
    Operator::Before,
    Operator::OnOrAfter,
    Operator::After,
    Operator::OnOrBefore,
    Operator::AnyOf,
    Operator::NoneOf,
    Operator::Include,
    Operator::Exclude,
    Operator::IncludeAnyOf,
    Operator::ExcludeIfAnyOf,
    Operator::IncludeAllOf,
    Operator::ExcludeIfAll,
];

/// Whether an operator's value list is single-valued or multi-valued.
///
/// `Multiple` covers both two-value ranges and one-or-more "any of" lists;
/// [`value_shape_ok`] distinguishes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Multiple,
}

/// Registry entry for one operator of one column type.
#[derive(Debug, Clone)]
pub struct OperatorSpec {
    pub op: Operator,
    pub arity: Arity,
    /// Human label, also the wire text.
    pub label: &'static str,
    /// Whether the operator negates its condition. Value-driven operator
    /// transitions must stay within the same polarity (exclusion stays
    /// exclusion).
    pub negated: bool,
    /// The opposite-arity counterpart with the same polarity, when one
    /// exists. Used by the transition resolver to promote/demote.
    pub relative: Option<Operator>,
}

impl OperatorSpec {
    const fn new(op: Operator, arity: Arity, label: &'static str) -> Self {
        Self {
            op,
            arity,
            label,
            negated: false,
            relative: None,
        }
    }

    const fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    const fn relative(mut self, relative: Operator) -> Self {
        self.relative = Some(relative);
        self
    }
}

/// Operators for text columns.
pub const TEXT_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Contains, Arity::Single, "contains"),
    OperatorSpec::new(Operator::NotContains, Arity::Single, "does not contain").negated(),
];

/// Operators for number columns.
pub const NUMBER_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Is, Arity::Single, "is").relative(Operator::Between),
    OperatorSpec::new(Operator::IsNot, Arity::Single, "is not")
        .negated()
        .relative(Operator::NotBetween),
    OperatorSpec::new(Operator::GreaterThan, Arity::Single, "is greater than")
        .relative(Operator::Between),
    OperatorSpec::new(
        Operator::GreaterThanOrEqual,
        Arity::Single,
        "is greater than or equal to",
    )
    .relative(Operator::Between),
    OperatorSpec::new(Operator::LessThan, Arity::Single, "is less than")
        .relative(Operator::Between),
    OperatorSpec::new(
        Operator::LessThanOrEqual,
        Arity::Single,
        "is less than or equal to",
    )
    .relative(Operator::Between),
    OperatorSpec::new(Operator::Between, Arity::Multiple, "is between").relative(Operator::Is),
    OperatorSpec::new(Operator::NotBetween, Arity::Multiple, "is not between")
        .negated()
        .relative(Operator::IsNot),
];

/// Operators for date columns.
pub const DATE_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Is, Arity::Single, "is").relative(Operator::Between),
    OperatorSpec::new(Operator::IsNot, Arity::Single, "is not")
        .negated()
        .relative(Operator::NotBetween),
    OperatorSpec::new(Operator::Before, Arity::Single, "is before").relative(Operator::Between),
    OperatorSpec::new(Operator::OnOrAfter, Arity::Single, "is on or after")
        .relative(Operator::Between),
    OperatorSpec::new(Operator::After, Arity::Single, "is after").relative(Operator::Between),
    OperatorSpec::new(Operator::OnOrBefore, Arity::Single, "is on or before")
        .relative(Operator::Between),
    OperatorSpec::new(Operator::Between, Arity::Multiple, "is between").relative(Operator::Is),
    OperatorSpec::new(Operator::NotBetween, Arity::Multiple, "is not between")
        .negated()
        .relative(Operator::IsNot),
];

/// Operators for option columns.
pub const OPTION_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Is, Arity::Single, "is").relative(Operator::AnyOf),
    OperatorSpec::new(Operator::IsNot, Arity::Single, "is not")
        .negated()
        .relative(Operator::NoneOf),
    OperatorSpec::new(Operator::AnyOf, Arity::Multiple, "is any of").relative(Operator::Is),
    OperatorSpec::new(Operator::NoneOf, Arity::Multiple, "is none of")
        .negated()
        .relative(Operator::IsNot),
];

/// Operators for multi-option columns.
pub const MULTI_OPTION_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Include, Arity::Single, "include").relative(Operator::IncludeAnyOf),
    OperatorSpec::new(Operator::Exclude, Arity::Single, "exclude")
        .negated()
        .relative(Operator::ExcludeIfAnyOf),
    OperatorSpec::new(Operator::IncludeAnyOf, Arity::Multiple, "include any of")
        .relative(Operator::Include),
    OperatorSpec::new(Operator::ExcludeIfAnyOf, Arity::Multiple, "exclude if any of")
        .negated()
        .relative(Operator::Exclude),
    // "all of" semantics never change implicitly with value count.
    OperatorSpec::new(Operator::IncludeAllOf, Arity::Multiple, "include all of"),
    OperatorSpec::new(Operator::ExcludeIfAll, Arity::Multiple, "exclude if all").negated(),
];

/// The ordered operator set for a column type. The first entry is the
/// default operator a fresh filter starts with.
pub fn operators_for(kind: ColumnType) -> &'static [OperatorSpec] {
    match kind {
        ColumnType::Text => TEXT_OPERATORS,
        ColumnType::Number => NUMBER_OPERATORS,
        ColumnType::Date => DATE_OPERATORS,
        ColumnType::Option => OPTION_OPERATORS,
        ColumnType::MultiOption => MULTI_OPTION_OPERATORS,
    }
}

/// Default operator for a fresh filter on a column of the given type.
pub fn default_operator(kind: ColumnType) -> Operator {
    operators_for(kind)[0].op
}

/// Look up the registry entry for an operator of a column type, if the
/// operator belongs to that type.
pub fn find_spec(kind: ColumnType, op: Operator) -> Option<&'static OperatorSpec> {
    operators_for(kind).iter().find(|spec| spec.op == op)
}

/// Registry entry for an operator that is known to belong to the type.
///
/// The operator tables are static; asking for an operator outside its
/// type's table is a programming error, so this fails fast.
pub fn details_for(kind: ColumnType, op: Operator) -> &'static OperatorSpec {
    match find_spec(kind, op) {
        Some(spec) => spec,
        None => panic!("operator '{}' is not defined for {} columns", op, kind),
    }
}

/// Operators of the same type sharing the current operator's arity family.
///
/// When the user explicitly changes an operator from a menu, only these are
/// offered; crossing arities happens through value edits (see
/// [`transition::resolve`]).
pub fn compatible_operators(kind: ColumnType, current: Operator) -> Vec<Operator> {
    let arity = details_for(kind, current).arity;
    operators_for(kind)
        .iter()
        .filter(|spec| spec.arity == arity)
        .map(|spec| spec.op)
        .collect()
}

/// Whether `len` values fit the operator's arity.
///
/// Ranges take exactly two values; "any of"-style lists take one or more.
pub fn value_shape_ok(spec: &OperatorSpec, len: usize) -> bool {
    match spec.arity {
        Arity::Single => len == 1,
        Arity::Multiple => {
            if matches!(spec.op, Operator::Between | Operator::NotBetween) {
                len == 2
            } else {
                len >= 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_operators() {
        for kind in [
            ColumnType::Text,
            ColumnType::Number,
            ColumnType::Date,
            ColumnType::Option,
            ColumnType::MultiOption,
        ] {
            assert!(!operators_for(kind).is_empty());
        }
    }

    #[test]
    fn wire_names_round_trip() {
        for op in ALL_OPERATORS {
            assert_eq!(Operator::from_wire(op.wire()), Some(*op));
        }
    }

    #[test]
    fn unknown_wire_name_is_none() {
        assert_eq!(Operator::from_wire("frobnicates"), None);
    }

    #[test]
    fn number_between_is_two_valued() {
        let spec = details_for(ColumnType::Number, Operator::Between);
        assert_eq!(spec.arity, Arity::Multiple);
        assert!(value_shape_ok(spec, 2));
        assert!(!value_shape_ok(spec, 1));
        assert!(!value_shape_ok(spec, 3));
    }

    #[test]
    fn option_any_of_takes_one_or_more() {
        let spec = details_for(ColumnType::Option, Operator::AnyOf);
        assert!(value_shape_ok(spec, 1));
        assert!(value_shape_ok(spec, 5));
        assert!(!value_shape_ok(spec, 0));
    }

    #[test]
    fn include_pairs_with_include_any_of() {
        let spec = details_for(ColumnType::MultiOption, Operator::Include);
        assert_eq!(spec.relative, Some(Operator::IncludeAnyOf));
        let back = details_for(ColumnType::MultiOption, Operator::IncludeAnyOf);
        assert_eq!(back.relative, Some(Operator::Include));
    }

    #[test]
    fn exclusion_family_is_negated() {
        assert!(details_for(ColumnType::MultiOption, Operator::Exclude).negated);
        assert!(details_for(ColumnType::MultiOption, Operator::ExcludeIfAnyOf).negated);
        assert!(!details_for(ColumnType::MultiOption, Operator::Include).negated);
    }

    #[test]
    fn all_of_operators_have_no_relative() {
        assert!(details_for(ColumnType::MultiOption, Operator::IncludeAllOf)
            .relative
            .is_none());
        assert!(details_for(ColumnType::MultiOption, Operator::ExcludeIfAll)
            .relative
            .is_none());
    }

    #[test]
    fn compatible_operators_share_arity() {
        let singles = compatible_operators(ColumnType::Number, Operator::Is);
        assert!(singles.contains(&Operator::GreaterThan));
        assert!(!singles.contains(&Operator::Between));

        let ranges = compatible_operators(ColumnType::Number, Operator::Between);
        assert_eq!(ranges, vec![Operator::Between, Operator::NotBetween]);
    }

    #[test]
    #[should_panic(expected = "not defined for text columns")]
    fn details_for_foreign_operator_panics() {
        details_for(ColumnType::Text, Operator::Between);
    }

    #[test]
    fn default_operator_is_first_entry() {
        assert_eq!(default_operator(ColumnType::Text), Operator::Contains);
        assert_eq!(default_operator(ColumnType::MultiOption), Operator::Include);
    }
}
