//! GROUP BY partitioning
//!
//! Groups appear in first-seen order. Records whose group field is missing
//! land in the `"NULL"` group.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::store::Record;

use super::errors::ExecutorResult;
use super::resolver::FieldResolver;

/// Key used for records without a group value
pub const NULL_GROUP: &str = "NULL";

/// One group of a GROUP BY query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    #[serde(rename = "group")]
    pub key: String,
    pub count: usize,
    pub records: Vec<Arc<Record>>,
}

/// Partitions records by a field
pub struct Grouper;

impl Grouper {
    pub fn group(
        records: Vec<Arc<Record>>,
        field: &str,
        resolver: &FieldResolver,
    ) -> ExecutorResult<Vec<GroupResult>> {
        let mut groups: Vec<GroupResult> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let key = resolver
                .resolve(&record, field)?
                .map(|v| v.render())
                .unwrap_or_else(|| NULL_GROUP.to_string());

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(GroupResult {
                    key,
                    count: 0,
                    records: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].count += 1;
            groups[slot].records.push(record);
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, city: Option<&str>) -> Arc<Record> {
        let mut record = Record::new().with("name", name);
        if let Some(c) = city {
            record.set("city", c);
        }
        Arc::new(record)
    }

    #[test]
    fn test_first_seen_order() {
        let records = vec![
            rec("a", Some("Pune")),
            rec("b", Some("Delhi")),
            rec("c", Some("Pune")),
        ];
        let groups = Grouper::group(records, "city", &FieldResolver::standard()).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Pune", "Delhi"]);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].records.len(), 2);
    }

    #[test]
    fn test_missing_values_group_under_null() {
        let records = vec![rec("a", None), rec("b", Some("Pune")), rec("c", None)];
        let groups = Grouper::group(records, "city", &FieldResolver::standard()).unwrap();
        assert_eq!(groups[0].key, NULL_GROUP);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_group_by_derived_field() {
        let records = vec![
            Arc::new(Record::new().with("courses", vec!["Math"])),
            Arc::new(Record::new().with("courses", vec!["Art", "Math"])),
            Arc::new(Record::new().with("courses", vec!["Music"])),
        ];
        let groups = Grouper::group(records, "course_count", &FieldResolver::standard()).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
        assert_eq!(keys, vec![("1", 2), ("2", 1)]);
    }

    #[test]
    fn test_serializes_with_group_key() {
        let groups = Grouper::group(vec![rec("a", Some("Pune"))], "city", &FieldResolver::standard())
            .unwrap();
        let value = serde_json::to_value(&groups).unwrap();
        assert_eq!(value[0]["group"], "Pune");
        assert_eq!(value[0]["count"], 1);
        assert_eq!(value[0]["records"][0]["name"], "a");
    }
}
