//! Predicate filtering for query execution
//!
//! Values are compared through their rendered string form, case-insensitively.
//! Ordering operators compare numerically when both sides parse as numbers.
//! A missing or null field never matches, whatever the operator.

use std::cmp::Ordering;

use crate::planner::{Condition, FilterOp, Predicate};
use crate::store::{FieldValue, Record};

use super::errors::ExecutorResult;
use super::resolver::FieldResolver;

/// Evaluates predicates against records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks whether `record` satisfies `predicate`.
    ///
    /// AND and OR short-circuit left to right.
    pub fn evaluate(
        record: &Record,
        predicate: &Predicate,
        resolver: &FieldResolver,
    ) -> ExecutorResult<bool> {
        match predicate {
            Predicate::Condition(condition) => Self::matches_condition(record, condition, resolver),
            Predicate::And(left, right) => Ok(Self::evaluate(record, left, resolver)?
                && Self::evaluate(record, right, resolver)?),
            Predicate::Or(left, right) => Ok(Self::evaluate(record, left, resolver)?
                || Self::evaluate(record, right, resolver)?),
        }
    }

    fn matches_condition(
        record: &Record,
        condition: &Condition,
        resolver: &FieldResolver,
    ) -> ExecutorResult<bool> {
        let value = match resolver.resolve(record, &condition.field)? {
            Some(v) => v,
            None => return Ok(false),
        };

        Ok(match &condition.op {
            FilterOp::Eq(expected) => text_eq(&value, expected),
            FilterOp::Ne(expected) => !text_eq(&value, expected),
            FilterOp::Gt(bound) => compare(&value, bound) == Ordering::Greater,
            FilterOp::Lt(bound) => compare(&value, bound) == Ordering::Less,
            FilterOp::Gte(bound) => compare(&value, bound) != Ordering::Less,
            FilterOp::Lte(bound) => compare(&value, bound) != Ordering::Greater,
            FilterOp::Like(pattern) => value
                .render()
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
            FilterOp::In(candidates) => candidates.iter().any(|c| text_eq(&value, c)),
        })
    }
}

fn text_eq(value: &FieldValue, literal: &str) -> bool {
    value.render().to_lowercase() == literal.to_lowercase()
}

/// Numeric ordering when both sides are numbers, lower-cased text ordering otherwise
fn compare(value: &FieldValue, literal: &str) -> Ordering {
    let numeric = value
        .as_number()
        .zip(literal.trim().parse::<f64>().ok().filter(|n| n.is_finite()));
    match numeric {
        Some((a, b)) => a.total_cmp(&b),
        None => value.render().to_lowercase().cmp(&literal.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> Record {
        Record::new()
            .with("roll_no", "B2")
            .with("name", "Bob")
            .with("city", "Pune")
            .with("grades", vec![60.0, 70.0])
            .with("courses", vec!["Math", "Physics"])
    }

    fn eval(predicate: &Predicate) -> bool {
        PredicateFilter::evaluate(&bob(), predicate, &FieldResolver::standard()).unwrap()
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        assert!(eval(&Predicate::eq("name", "BOB")));
        assert!(!eval(&Predicate::eq("name", "Bobby")));
        assert!(eval(&Predicate::condition("name", FilterOp::Ne("alice".into()))));
    }

    #[test]
    fn test_numeric_range_on_derived_field() {
        assert!(eval(&Predicate::gt("avg_grade", "64.5")));
        assert!(!eval(&Predicate::gt("avg_grade", "65")));
        assert!(eval(&Predicate::condition("avg_grade", FilterOp::Gte("65".into()))));
        assert!(eval(&Predicate::condition("avg_grade", FilterOp::Lte("65".into()))));
        assert!(eval(&Predicate::lt("course_count", "3")));
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        // "9" > "10" as text, but not as numbers
        let record = Record::new().with("age", 9.0);
        let resolver = FieldResolver::standard();
        assert!(!PredicateFilter::evaluate(&record, &Predicate::gt("age", "10"), &resolver).unwrap());
    }

    #[test]
    fn test_text_range_falls_back_to_strings() {
        assert!(eval(&Predicate::gt("city", "mumbai")));
        assert!(eval(&Predicate::lt("city", "RANCHI")));
    }

    #[test]
    fn test_like_matches_substring() {
        assert!(eval(&Predicate::like("name", "ob")));
        assert!(eval(&Predicate::like("courses", "phys")));
        assert!(!eval(&Predicate::like("name", "ali")));
    }

    #[test]
    fn test_in_candidates() {
        let hit = Predicate::condition("city", FilterOp::In(vec!["Delhi".into(), "pune".into()]));
        let miss = Predicate::condition("city", FilterOp::In(vec!["Delhi".into()]));
        assert!(eval(&hit));
        assert!(!eval(&miss));
    }

    #[test]
    fn test_missing_field_never_matches() {
        assert!(!eval(&Predicate::eq("email", "x")));
        assert!(!eval(&Predicate::condition("email", FilterOp::Ne("x".into()))));
        assert!(!eval(&Predicate::like("email", "")));
    }

    #[test]
    fn test_boolean_composition() {
        let and = Predicate::eq("name", "bob").and(Predicate::eq("city", "delhi"));
        let or = Predicate::eq("name", "alice").or(Predicate::eq("city", "pune"));
        assert!(!eval(&and));
        assert!(eval(&or));
    }

    #[test]
    fn test_short_circuit_skips_failing_branch() {
        let record = Record::new().with("name", "Bob").with("grades", "n/a");
        let resolver = FieldResolver::standard();

        let guarded = Predicate::eq("name", "alice").and(Predicate::gt("avg_grade", "50"));
        assert!(!PredicateFilter::evaluate(&record, &guarded, &resolver).unwrap());

        let unguarded = Predicate::eq("name", "bob").and(Predicate::gt("avg_grade", "50"));
        assert!(PredicateFilter::evaluate(&record, &unguarded, &resolver).is_err());
    }
}
