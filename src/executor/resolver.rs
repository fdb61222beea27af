//! Field resolver
//!
//! Closed table from logical field name to accessor. Derived fields are
//! computed from other fields at evaluation time and aliases read another
//! field under a second name; every other name reads the record directly. A missing or null value resolves to `None`.

use std::collections::BTreeMap;

use crate::store::{FieldValue, Record};

use super::errors::{ExecutorError, ExecutorResult};

/// How a logical field is read from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// The record's own value
    Direct(String),
    /// Mean of a numeric list field; 0 when the list is empty or absent
    Average(String),
    /// Number of entries of a list field; 0 when absent
    Count(String),
}

/// Maps field names to accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResolver {
    derived: BTreeMap<String, Accessor>,
}

impl FieldResolver {
    /// Resolver with no derived fields
    pub fn new() -> Self {
        Self {
            derived: BTreeMap::new(),
        }
    }

    /// Resolver with `avg_grade` over `grades` and `course_count` over `courses`
    pub fn standard() -> Self {
        Self::new()
            .with_average("avg_grade", "grades")
            .with_count("course_count", "courses")
    }

    /// Adds a derived average field
    pub fn with_average(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.derived
            .insert(name.into().to_lowercase(), Accessor::Average(source.into()));
        self
    }

    /// Adds a derived count field
    pub fn with_count(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.derived
            .insert(name.into().to_lowercase(), Accessor::Count(source.into()));
        self
    }

    /// Adds an alias that reads the record field `source` under `name`
    pub fn with_alias(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.derived
            .insert(name.into().to_lowercase(), Accessor::Direct(source.into()));
        self
    }

    /// Accessor used for `field`
    pub fn accessor(&self, field: &str) -> Accessor {
        self.derived
            .get(field)
            .cloned()
            .unwrap_or_else(|| Accessor::Direct(field.to_string()))
    }

    /// Names of the derived fields and aliases
    pub fn derived_names(&self) -> impl Iterator<Item = &str> {
        self.derived.keys().map(String::as_str)
    }

    /// Resolves `field` against `record`.
    ///
    /// Fails only when a derived field's source has the wrong shape.
    pub fn resolve(&self, record: &Record, field: &str) -> ExecutorResult<Option<FieldValue>> {
        match self.derived.get(field) {
            None => Ok(record.get(field).filter(|v| !v.is_null()).cloned()),
            Some(Accessor::Direct(name)) => {
                Ok(record.get(name).filter(|v| !v.is_null()).cloned())
            }
            Some(Accessor::Average(source)) => average(record, source).map(Some),
            Some(Accessor::Count(source)) => count(record, source).map(Some),
        }
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::standard()
    }
}

fn list_source<'r>(record: &'r Record, source: &str) -> ExecutorResult<&'r [FieldValue]> {
    match record.get(source) {
        None | Some(FieldValue::Null) => Ok(&[]),
        Some(FieldValue::List(items)) => Ok(items),
        Some(other) => Err(ExecutorError::type_mismatch(
            source,
            format!("expected a list, found '{}'", other),
        )),
    }
}

fn average(record: &Record, source: &str) -> ExecutorResult<FieldValue> {
    let items = list_source(record, source)?;
    if items.is_empty() {
        return Ok(FieldValue::Number(0.0));
    }

    let mut sum = 0.0;
    for item in items {
        sum += item.as_number().ok_or_else(|| {
            ExecutorError::type_mismatch(source, format!("'{}' is not a number", item))
        })?;
    }
    Ok(FieldValue::Number(sum / items.len() as f64))
}

fn count(record: &Record, source: &str) -> ExecutorResult<FieldValue> {
    let items = list_source(record, source)?;
    Ok(FieldValue::Number(items.len() as f64))
}
