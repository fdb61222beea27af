//! Result sorting for query execution
//!
//! Each record is resolved once per sort key, then sorted with a stable
//! composite comparator. Key ordering is total:
//! missing < number < text, numbers by value, text case-insensitively.
//!
//! A number never compares against text as a string. Mixing the two
//! orderings is not transitive (`10 < 9` as text, `9 < 10` as numbers), so
//! every number ranks before every text value, even text such as `"!x"`
//! that would render lower.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::planner::{SortDirection, SortSpec};
use crate::store::{FieldValue, Record};

use super::errors::ExecutorResult;
use super::resolver::FieldResolver;

/// Resolved sort key for one field of one record
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn from_value(value: Option<FieldValue>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(v) => match v.as_number() {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(v.render().to_lowercase()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Sorts result records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts `records` by `specs` in priority order.
    ///
    /// Stable: records equal on every key keep their relative order.
    pub fn sort(
        records: Vec<Arc<Record>>,
        specs: &[SortSpec],
        resolver: &FieldResolver,
    ) -> ExecutorResult<Vec<Arc<Record>>> {
        if specs.is_empty() {
            return Ok(records);
        }

        let mut decorated = Vec::with_capacity(records.len());
        for record in records {
            let keys = specs
                .iter()
                .map(|spec| resolver.resolve(&record, &spec.field).map(SortKey::from_value))
                .collect::<ExecutorResult<Vec<_>>>()?;
            decorated.push((keys, record));
        }

        decorated.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, specs));
        Ok(decorated.into_iter().map(|(_, record)| record).collect())
    }

    fn compare_keys(a: &[SortKey], b: &[SortKey], specs: &[SortSpec]) -> Ordering {
        for ((ka, kb), spec) in a.iter().zip(b).zip(specs) {
            let ordering = match spec.direction {
                SortDirection::Asc => ka.compare(kb),
                SortDirection::Desc => ka.compare(kb).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, city: &str, grades: Vec<f64>) -> Arc<Record> {
        Arc::new(
            Record::new()
                .with("name", name)
                .with("city", city)
                .with("grades", grades),
        )
    }

    fn names(records: &[Arc<Record>]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.get("name").map(FieldValue::render).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_sort_by_derived_field_desc() {
        let records = vec![
            rec("Cara", "Pune", vec![70.0]),
            rec("Ann", "Delhi", vec![90.0]),
            rec("Ben", "Pune", vec![80.0]),
        ];
        let sorted =
            ResultSorter::sort(records, &[SortSpec::desc("avg_grade")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["Ann", "Ben", "Cara"]);
    }

    #[test]
    fn test_composite_keys_reverse_independently() {
        let records = vec![
            rec("Ann", "Pune", vec![]),
            rec("Ben", "Delhi", vec![]),
            rec("Cara", "Pune", vec![]),
            rec("Dev", "Delhi", vec![]),
        ];
        let specs = [SortSpec::asc("city"), SortSpec::desc("name")];
        let sorted = ResultSorter::sort(records, &specs, &FieldResolver::standard()).unwrap();
        assert_eq!(names(&sorted), vec!["Dev", "Ben", "Cara", "Ann"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            rec("Zed", "Pune", vec![]),
            rec("Amy", "Pune", vec![]),
            rec("Kim", "Pune", vec![]),
        ];
        let sorted =
            ResultSorter::sort(records, &[SortSpec::asc("city")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["Zed", "Amy", "Kim"]);
    }

    #[test]
    fn test_missing_sorts_first_then_numbers_then_text() {
        let records = vec![
            Arc::new(Record::new().with("name", "text").with("score", "high")),
            Arc::new(Record::new().with("name", "num").with("score", 10.0)),
            Arc::new(Record::new().with("name", "none")),
        ];
        let sorted =
            ResultSorter::sort(records, &[SortSpec::asc("score")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["none", "num", "text"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let records = vec![rec("bob", "x", vec![]), rec("Alice", "x", vec![])];
        let sorted =
            ResultSorter::sort(records, &[SortSpec::asc("name")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["Alice", "bob"]);
    }

    #[test]
    fn test_number_ranks_before_lower_rendering_text() {
        let records = vec![
            Arc::new(Record::new().with("name", "bang").with("score", "!bang")),
            Arc::new(Record::new().with("name", "ten").with("score", 10.0)),
            Arc::new(Record::new().with("name", "nine").with("score", "9")),
        ];
        let sorted =
            ResultSorter::sort(records, &[SortSpec::asc("score")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["nine", "ten", "bang"]);

        let records = sorted.into_iter().rev().collect();
        let sorted =
            ResultSorter::sort(records, &[SortSpec::desc("score")], &FieldResolver::standard())
                .unwrap();
        assert_eq!(names(&sorted), vec!["bang", "ten", "nine"]);
    }
}
