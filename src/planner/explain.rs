//! Explain output
//!
//! Describes a parsed plan (or the reason it was rejected) without running it.

use std::fmt;

use serde::Serialize;

use super::ast::{Projection, QueryPlan};
use super::errors::PlannerError;

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether parsing succeeded
    pub accepted: bool,
    /// Projected fields, `["*"]` for all
    pub projection: Vec<String>,
    /// Predicate tree rendered with explicit grouping
    pub predicate: Option<String>,
    /// Grouping field
    pub group_by: Option<String>,
    /// Sort keys as `field direction`
    pub sort: Vec<String>,
    /// Row limit
    pub limit: Option<u64>,
    /// Pipeline stages in execution order
    pub stages: Vec<&'static str>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a parsed query
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let projection = match &plan.projection {
            Projection::All => vec!["*".to_string()],
            Projection::Fields(fields) => fields.clone(),
        };

        let mut stages = vec!["SCAN"];
        if plan.predicate.is_some() {
            stages.push("FILTER");
        }
        if plan.group_by.is_some() {
            // Grouping ends the pipeline
            stages.push("GROUP");
        } else {
            if !plan.sort.is_empty() {
                stages.push("SORT");
            }
            if plan.limit.is_some() {
                stages.push("LIMIT");
            }
            if !plan.projection.is_all() {
                stages.push("PROJECT");
            }
        }

        Self {
            accepted: true,
            projection,
            predicate: plan.predicate.as_ref().map(ToString::to_string),
            group_by: plan.group_by.clone(),
            sort: plan
                .sort
                .iter()
                .map(|s| format!("{} {}", s.field, s.direction.as_str()))
                .collect(),
            limit: plan.limit,
            stages,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a parse error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            projection: Vec::new(),
            predicate: None,
            group_by: None,
            sort: Vec::new(),
            limit: None,
            stages: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        writeln!(f, "Projection: {}", self.projection.join(", "))?;
        if let Some(predicate) = &self.predicate {
            writeln!(f, "Filter: {}", predicate)?;
        }
        if let Some(group) = &self.group_by {
            writeln!(f, "Group By: {}", group)?;
        }
        if !self.sort.is_empty() {
            writeln!(f, "Sort: {}", self.sort.join(", "))?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        writeln!(f, "Stages: {}", self.stages.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::parse;

    #[test]
    fn test_explain_accepted() {
        let plan = parse("SELECT name WHERE avg_grade > 70 ORDER BY name DESC LIMIT 1").unwrap();
        let explain = ExplainPlan::from_plan(&plan);

        assert!(explain.accepted);
        assert_eq!(explain.projection, vec!["name"]);
        assert_eq!(explain.predicate.as_deref(), Some("avg_grade > '70'"));
        assert_eq!(explain.sort, vec!["name desc"]);
        assert_eq!(
            explain.stages,
            vec!["SCAN", "FILTER", "SORT", "LIMIT", "PROJECT"]
        );

        let text = explain.to_string();
        assert!(text.contains("Status: ACCEPTED"));
        assert!(text.contains("Stages: SCAN -> FILTER -> SORT -> LIMIT -> PROJECT"));
    }

    #[test]
    fn test_explain_group_is_terminal() {
        let plan = parse("SELECT * GROUP BY course ORDER BY name LIMIT 2").unwrap();
        let explain = ExplainPlan::from_plan(&plan);
        assert_eq!(explain.stages, vec!["SCAN", "GROUP"]);
    }

    #[test]
    fn test_explain_rejected() {
        let err = parse("SELECT * LIMIT -1").unwrap_err();
        let explain = ExplainPlan::from_error(&err);

        assert!(!explain.accepted);
        assert_eq!(explain.rejection_code.as_deref(), Some("ROSTER_QUERY_LIMIT"));
        assert!(explain.to_string().contains("REJECTED"));
    }
}
