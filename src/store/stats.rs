//! Aggregate statistics over a set of records
//!
//! Grades come from a numeric list field and courses from a text list
//! field; the field names are supplied by the caller.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::record::{FieldValue, Record};
use super::store::mean_of;

/// Roster-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterStatistics {
    pub total_records: usize,
    pub total_grades: usize,
    pub average_grade: Option<f64>,
    pub median_grade: Option<f64>,
    pub min_grade: Option<f64>,
    pub max_grade: Option<f64>,
    /// Most frequent course; ties go to the course seen first
    pub most_popular_course: Option<String>,
    pub course_distribution: BTreeMap<String, usize>,
}

/// Per-course enrolment and grade summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStatistics {
    pub total_records: usize,
    pub average_grade: f64,
    /// Label of each enrolled record, in record order
    pub members: Vec<String>,
}

/// A record ranked by its mean grade
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecord {
    pub record: Record,
    pub average: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn list_numbers(record: &Record, field: &str) -> Vec<f64> {
    record
        .get(field)
        .and_then(FieldValue::as_list)
        .map(|items| items.iter().filter_map(FieldValue::as_number).collect())
        .unwrap_or_default()
}

fn list_strings(record: &Record, field: &str) -> Vec<String> {
    record
        .get(field)
        .and_then(FieldValue::as_list)
        .map(|items| items.iter().map(FieldValue::render).collect())
        .unwrap_or_default()
}

/// Computes roster statistics
pub fn calculate_statistics(
    records: &[Arc<Record>],
    grades_field: &str,
    courses_field: &str,
) -> RosterStatistics {
    let mut grades = Vec::new();
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for record in records {
        grades.extend(list_numbers(record, grades_field));
        for course in list_strings(record, courses_field) {
            let count = distribution.entry(course.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(course);
            }
            *count += 1;
        }
    }

    let mut most_popular: Option<(&String, usize)> = None;
    for course in &first_seen {
        let count = distribution[course];
        if most_popular.map(|(_, best)| count > best).unwrap_or(true) {
            most_popular = Some((course, count));
        }
    }

    let mut stats = RosterStatistics {
        total_records: records.len(),
        total_grades: grades.len(),
        average_grade: None,
        median_grade: None,
        min_grade: None,
        max_grade: None,
        most_popular_course: most_popular.map(|(c, _)| c.clone()),
        course_distribution: distribution,
    };

    if grades.is_empty() {
        return stats;
    }

    grades.sort_by(f64::total_cmp);
    let n = grades.len();
    stats.average_grade = Some(round2(grades.iter().sum::<f64>() / n as f64));
    stats.median_grade = Some(round2((grades[n / 2] + grades[(n - 1) / 2]) / 2.0));
    stats.min_grade = Some(grades[0]);
    stats.max_grade = Some(grades[n - 1]);
    stats
}

/// Grade summary per course, pairing each course with the grade at the
/// same position in the grades list.
///
/// Members are labelled by the first of `label_fields` the record has.
pub fn course_statistics(
    records: &[Arc<Record>],
    grades_field: &str,
    courses_field: &str,
    label_fields: &[&str],
) -> BTreeMap<String, CourseStatistics> {
    let mut by_course: HashMap<String, (Vec<f64>, Vec<String>)> = HashMap::new();

    for record in records {
        let courses = list_strings(record, courses_field);
        let grades = list_numbers(record, grades_field);
        let label = label_fields
            .iter()
            .find_map(|f| record.get(f).filter(|v| !v.is_null()))
            .map(FieldValue::render)
            .unwrap_or_default();
        for (course, grade) in courses.into_iter().zip(grades) {
            let (grades, members) = by_course.entry(course).or_default();
            grades.push(grade);
            members.push(label.clone());
        }
    }

    by_course
        .into_iter()
        .map(|(course, (grades, members))| {
            let stats = CourseStatistics {
                total_records: grades.len(),
                average_grade: round2(grades.iter().sum::<f64>() / grades.len() as f64),
                members,
            };
            (course, stats)
        })
        .collect()
}

/// The `limit` records with the highest mean grade.
///
/// Records without grades are left out. Equal means keep input order.
pub fn top_performers(records: &[Arc<Record>], grades_field: &str, limit: usize) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = records
        .iter()
        .filter_map(|r| {
            mean_of(r, grades_field).map(|avg| RankedRecord {
                record: Record::clone(r),
                average: round2(avg),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.average.total_cmp(&a.average));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: &str, grades: Vec<f64>, courses: Vec<&str>) -> Arc<Record> {
        Arc::new(
            Record::new()
                .with("roll_no", roll)
                .with("grades", grades)
                .with("courses", courses),
        )
    }

    fn roster() -> Vec<Arc<Record>> {
        vec![
            student("A1", vec![90.0, 80.0], vec!["Math", "Art"]),
            student("A2", vec![60.0, 50.0], vec!["Art", "Math"]),
            student("A3", vec![70.0], vec!["Physics"]),
            student("A4", vec![], vec![]),
        ]
    }

    #[test]
    fn test_statistics() {
        let stats = calculate_statistics(&roster(), "grades", "courses");
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_grades, 5);
        assert_eq!(stats.average_grade, Some(70.0));
        assert_eq!(stats.median_grade, Some(70.0));
        assert_eq!(stats.min_grade, Some(50.0));
        assert_eq!(stats.max_grade, Some(90.0));
        assert_eq!(stats.most_popular_course.as_deref(), Some("Math"));
        assert_eq!(stats.course_distribution["Art"], 2);
        assert_eq!(stats.course_distribution["Physics"], 1);
    }

    #[test]
    fn test_statistics_without_grades() {
        let stats = calculate_statistics(&[student("A1", vec![], vec![])], "grades", "courses");
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.average_grade, None);
        assert_eq!(stats.most_popular_course, None);
    }

    #[test]
    fn test_course_statistics_pairs_by_position() {
        let stats = course_statistics(&roster(), "grades", "courses", &["roll_no"]);
        assert_eq!(stats["Math"].total_records, 2);
        assert_eq!(stats["Math"].average_grade, 70.0);
        assert_eq!(stats["Art"].total_records, 2);
        assert_eq!(stats["Art"].average_grade, 70.0);
        assert_eq!(stats["Physics"].average_grade, 70.0);
    }

    #[test]
    fn test_course_statistics_lists_members() {
        let mut records = roster();
        records.push(Arc::new(
            Record::new()
                .with("roll_no", "A5")
                .with("name", "Eve")
                .with("grades", vec![100.0])
                .with("courses", vec!["Physics"]),
        ));
        let stats = course_statistics(&records, "grades", "courses", &["name", "roll_no"]);
        assert_eq!(stats["Math"].members, vec!["A1", "A2"]);
        assert_eq!(stats["Physics"].members, vec!["A3", "Eve"]);
        assert_eq!(stats["Physics"].total_records, 2);
        assert_eq!(stats["Physics"].average_grade, 85.0);
    }

    #[test]
    fn test_top_performers() {
        let top = top_performers(&roster(), "grades", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].average, 85.0);
        assert_eq!(top[1].average, 70.0);
    }
}
