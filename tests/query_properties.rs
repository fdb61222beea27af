//! Query Property Tests
//!
//! Invariants that must hold for every plan over a varied roster:
//! - Evaluation is deterministic and side-effect free
//! - Filtering only ever removes records
//! - Sorting is stable and idempotent
//! - Limit bounds the result size
//! - Grouping partitions the filtered set
//! - Wildcard and explicit full projections agree

use std::sync::Arc;

use rosterdb::executor::{PredicateFilter, QueryExecutor, RecordSource};
use rosterdb::planner::{parse, QueryPlan};
use rosterdb::{FieldResolver, Record};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn roster() -> Vec<Arc<Record>> {
    let records: Vec<Record> = serde_json::from_value(json!([
        {"roll_no": "1", "name": "Asha", "city": "Pune", "grades": [91, 78], "courses": ["Math", "Art"]},
        {"roll_no": "2", "name": "bilal", "city": "Delhi", "grades": [65], "courses": ["Physics"]},
        {"roll_no": "3", "name": "Chen", "grades": [], "courses": []},
        {"roll_no": "4", "name": "Dana", "city": "Pune", "grades": [88, 92, 70], "courses": ["Math", "Music", "Art"]},
        {"roll_no": "5", "name": "Eli", "city": "delhi", "grades": [65], "courses": ["Math"]},
        {"roll_no": "6", "name": "Farah", "city": "Goa", "phone": null, "grades": [55, 60], "courses": ["Art", "Music"]}
    ]))
    .unwrap();
    records.into_iter().map(Arc::new).collect()
}

const QUERIES: &[&str] = &[
    "SELECT *",
    "SELECT * WHERE avg_grade >= 65",
    "SELECT name, city WHERE city = 'pune' OR course_count > 2",
    "SELECT * WHERE courses LIKE 'math' AND avg_grade < 90",
    "SELECT * WHERE city IN ('Delhi', 'Goa') ORDER BY name",
    "SELECT * ORDER BY avg_grade DESC, name ASC",
    "SELECT * ORDER BY city LIMIT 3",
    "SELECT name WHERE phone != 'x'",
];

fn plans() -> Vec<QueryPlan> {
    QUERIES.iter().map(|q| parse(q).unwrap()).collect()
}

fn rows(plan: &QueryPlan, records: &[Arc<Record>]) -> Vec<Arc<Record>> {
    let resolver = FieldResolver::standard();
    let result = QueryExecutor::new(&resolver).execute(plan, records).unwrap();
    result.rows().unwrap().to_vec()
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn test_evaluation_is_deterministic() {
    let resolver = FieldResolver::standard();
    let records = roster();
    for plan in plans() {
        let Some(predicate) = &plan.predicate else {
            continue;
        };
        for record in &records {
            let before = Record::clone(record);
            let first = PredicateFilter::evaluate(record, predicate, &resolver).unwrap();
            for _ in 0..10 {
                assert_eq!(
                    PredicateFilter::evaluate(record, predicate, &resolver).unwrap(),
                    first
                );
            }
            assert_eq!(**record, before);
        }
    }
}

#[test]
fn test_filter_is_subset_and_every_row_satisfies_predicate() {
    let resolver = FieldResolver::standard();
    let records = roster();
    for query in QUERIES.iter().filter(|q| q.starts_with("SELECT *")) {
        let plan = parse(query).unwrap();
        let Some(predicate) = &plan.predicate else {
            continue;
        };
        let out = rows(&plan, &records);
        assert!(out.len() <= records.len());
        for row in &out {
            assert!(records.iter().any(|r| Arc::ptr_eq(r, row)));
            assert!(PredicateFilter::evaluate(row, predicate, &resolver).unwrap());
        }
    }
}

#[test]
fn test_missing_field_fails_even_not_equal() {
    let plan = parse("SELECT name WHERE phone != 'x'").unwrap();
    assert!(rows(&plan, &roster()).is_empty());
}

// =============================================================================
// Sorting and limit
// =============================================================================

#[test]
fn test_sort_is_idempotent() {
    let records = roster();
    for query in [
        "SELECT * ORDER BY avg_grade DESC, name ASC",
        "SELECT * ORDER BY city",
        "SELECT * ORDER BY course_count DESC",
    ] {
        let plan = parse(query).unwrap();
        let once = rows(&plan, &records);
        let twice = rows(&plan, &once);
        assert_eq!(once, twice, "{}", query);
    }
}

#[test]
fn test_sort_is_stable_on_ties() {
    // bilal and Eli share avg_grade 65 and keep input order
    let plan = parse("SELECT name ORDER BY avg_grade").unwrap();
    let names: Vec<_> = rows(&plan, &roster())
        .iter()
        .map(|r| r.get("name").unwrap().render())
        .collect();
    assert_eq!(names, vec!["Chen", "Farah", "bilal", "Eli", "Dana", "Asha"]);
}

#[test]
fn test_limit_bounds_result() {
    let records = roster();
    for n in 0..8u64 {
        let plan = QueryPlan::select_all().with_limit(n);
        assert!(rows(&plan, &records).len() as u64 <= n);
    }
}

// =============================================================================
// Grouping and projection
// =============================================================================

#[test]
fn test_grouping_is_partition_of_filtered_set() {
    let resolver = FieldResolver::standard();
    let records = roster();
    let plan = parse("SELECT * WHERE avg_grade > 0 GROUP BY city").unwrap();
    let result = QueryExecutor::new(&resolver).execute(&plan, &records).unwrap();
    let groups = result.groups().unwrap();

    let filtered = rows(&parse("SELECT * WHERE avg_grade > 0").unwrap(), &records);
    let members: Vec<_> = groups.iter().flat_map(|g| g.records.iter()).collect();
    assert_eq!(members.len(), filtered.len());
    for record in &filtered {
        assert_eq!(
            members.iter().filter(|m| Arc::ptr_eq(**m, record)).count(),
            1
        );
    }

    let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["Pune", "Delhi", "delhi", "Goa"]);
    assert!(groups.iter().all(|g| g.count == g.records.len()));
}

#[test]
fn test_wildcard_and_full_projection_agree() {
    let records: Vec<Arc<Record>> = roster()
        .into_iter()
        .filter(|r| r.contains("city") && !r.contains("phone"))
        .collect();
    let wildcard = rows(&parse("SELECT *").unwrap(), &records);
    let explicit = rows(
        &parse("SELECT roll_no, name, city, grades, courses").unwrap(),
        &wildcard,
    );
    assert_eq!(wildcard.len(), explicit.len());
    for (a, b) in wildcard.iter().zip(&explicit) {
        assert_eq!(**a, **b);
    }
}

#[test]
fn test_plan_is_reusable_across_snapshots() {
    let plan = parse("SELECT name WHERE city = 'pune'").unwrap();
    let full = roster();
    let partial: Vec<_> = full[..2].to_vec();

    assert_eq!(rows(&plan, &full.snapshot()).len(), 2);
    assert_eq!(rows(&plan, &partial).len(), 1);
    assert_eq!(plan, parse("SELECT name WHERE city = 'pune'").unwrap());
}
