//! Column definitions and option sources.
//!
//! A [`ColumnDef`] describes one filterable column: its id, data type, and
//! (for option-typed columns) where the selectable choices come from. The
//! choice-source question is resolved once, at setup, into an explicit
//! [`OptionSource`] strategy rather than re-branched on every use.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};

/// The data type of a column, which determines its operator set and how
/// its filter values are coerced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Option,
    MultiOption,
}

impl ColumnType {
    /// Stable lowercase name used in diagnostics and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Option => "option",
            ColumnType::MultiOption => "multiOption",
        }
    }

    /// Whether this type draws its values from a set of choices.
    pub fn is_option_like(&self) -> bool {
        matches!(self, ColumnType::Option | ColumnType::MultiOption)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One selectable choice of an option-typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stable identifier persisted in filter values.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Maps one raw cell value to a [`ChoiceOption`].
pub type TransformFn = Arc<dyn Fn(&Value) -> ChoiceOption + Send + Sync>;

/// Where an option-typed column's choices come from.
///
/// Exactly one strategy applies per column; ambiguity is resolved by
/// precedence (static list, then transform, then self-describing data) and
/// the absence of all three is a configuration error.
#[derive(Clone)]
pub enum OptionSource {
    /// A fixed list supplied in the column definition.
    StaticList(Vec<ChoiceOption>),
    /// Choices derived from column data through a transform function.
    Transform(TransformFn),
    /// Column data is already shaped as `{value, label}` records.
    SelfDescribing,
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::StaticList(opts) => f.debug_tuple("StaticList").field(opts).finish(),
            OptionSource::Transform(_) => f.write_str("Transform(..)"),
            OptionSource::SelfDescribing => f.write_str("SelfDescribing"),
        }
    }
}

/// Definition of one table column, as far as filtering is concerned.
///
/// Rendering concerns (width, cell templates) live with the host; this
/// struct carries only what the codec and filter layer need.
#[derive(Clone)]
pub struct ColumnDef {
    pub id: String,
    pub kind: ColumnType,
    pub label: String,
    /// Static choices for option-typed columns.
    pub options: Option<Vec<ChoiceOption>>,
    /// Derives choices from raw column data when no static list is given.
    pub transform: Option<TransformFn>,
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("options", &self.options)
            .field("transform", &self.transform.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ColumnDef {
    pub fn new(id: impl Into<String>, kind: ColumnType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            options: None,
            transform: None,
        }
    }

    /// Attach a static choice list.
    pub fn with_options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Attach a transform function deriving choices from raw data.
    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Resolve the option-source strategy for this column.
    ///
    /// `sample` is one raw cell value, used only to detect self-describing
    /// data when neither a static list nor a transform is configured.
    /// Returns a configuration error rather than guessing: silently
    /// misinterpreting column data would corrupt what the user sees.
    pub fn option_source(&self, sample: Option<&Value>) -> Result<OptionSource> {
        if !self.kind.is_option_like() {
            return Err(GridError::NotOptionColumn(self.id.clone()));
        }
        if let Some(options) = &self.options {
            return Ok(OptionSource::StaticList(options.clone()));
        }
        if let Some(transform) = &self.transform {
            return Ok(OptionSource::Transform(transform.clone()));
        }
        if sample.is_some_and(is_option_shaped) {
            return Ok(OptionSource::SelfDescribing);
        }
        Err(GridError::MissingOptionSource(self.id.clone()))
    }

    /// Materialize the choice list for this column from raw column data.
    ///
    /// Choices are deduplicated by their `value`, keeping first occurrence.
    pub fn options_from(&self, values: &[Value]) -> Result<Vec<ChoiceOption>> {
        let source = self.option_source(values.first())?;
        let raw: Vec<ChoiceOption> = match source {
            OptionSource::StaticList(options) => options,
            OptionSource::Transform(transform) => values.iter().map(|v| transform(v)).collect(),
            OptionSource::SelfDescribing => values
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
        };
        let mut seen = std::collections::HashSet::new();
        Ok(raw
            .into_iter()
            .filter(|opt| seen.insert(opt.value.clone()))
            .collect())
    }
}

fn is_option_shaped(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("value") && map.contains_key("label"),
        Value::Array(items) => items.first().is_some_and(is_option_shaped),
        _ => false,
    }
}

/// Find a column by id.
pub fn find_column<'a>(columns: &'a [ColumnDef], id: &str) -> Option<&'a ColumnDef> {
    columns.iter().find(|c| c.id == id)
}

/// Check that all column ids are unique.
pub fn validate_columns(columns: &[ColumnDef]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if !seen.insert(column.id.as_str()) {
            return Err(GridError::DuplicateColumn(column.id.clone()));
        }
    }
    Ok(())
}
