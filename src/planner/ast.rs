//! Query plan structures
//!
//! Defines the parsed, immutable query representation consumed by the
//! executor. A plan can be built by the parser or directly through the
//! builder methods.

use std::collections::BTreeSet;
use std::fmt;

/// Comparison operator with its literal operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// field = literal (case-insensitive)
    Eq(String),
    /// field != literal (case-insensitive)
    Ne(String),
    /// field > literal
    Gt(String),
    /// field < literal
    Lt(String),
    /// field >= literal
    Gte(String),
    /// field <= literal
    Lte(String),
    /// literal is a substring of field (case-insensitive)
    Like(String),
    /// field equals one of the candidates (case-insensitive)
    In(Vec<String>),
}

impl FilterOp {
    /// Returns true for the ordering operators
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOp::Gt(_) | FilterOp::Lt(_) | FilterOp::Gte(_) | FilterOp::Lte(_)
        )
    }

    /// Operator token as written in a query
    pub fn token(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "=",
            FilterOp::Ne(_) => "!=",
            FilterOp::Gt(_) => ">",
            FilterOp::Lt(_) => "<",
            FilterOp::Gte(_) => ">=",
            FilterOp::Lte(_) => "<=",
            FilterOp::Like(_) => "LIKE",
            FilterOp::In(_) => "IN",
        }
    }

    /// Literal rendered for explain output
    pub fn operand(&self) -> String {
        match self {
            FilterOp::Eq(v)
            | FilterOp::Ne(v)
            | FilterOp::Gt(v)
            | FilterOp::Lt(v)
            | FilterOp::Gte(v)
            | FilterOp::Lte(v)
            | FilterOp::Like(v) => format!("'{}'", v),
            FilterOp::In(values) => {
                let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                format!("({})", quoted.join(", "))
            }
        }
    }
}

/// A leaf condition: field, operator, literal
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: FilterOp,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.token(), self.op.operand())
    }
}

/// Boolean predicate tree from a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Leaf predicate
    pub fn condition(field: impl Into<String>, op: FilterOp) -> Self {
        Predicate::Condition(Condition::new(field, op))
    }

    /// Equality leaf
    pub fn eq(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::condition(field, FilterOp::Eq(literal.into()))
    }

    /// Greater-than leaf
    pub fn gt(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::condition(field, FilterOp::Gt(literal.into()))
    }

    /// Less-than leaf
    pub fn lt(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::condition(field, FilterOp::Lt(literal.into()))
    }

    /// Substring leaf
    pub fn like(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::condition(field, FilterOp::Like(literal.into()))
    }

    /// Conjunction of `self` and `other`
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Disjunction of `self` and `other`
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Leaf conditions in left-to-right order
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Predicate::Condition(c) => out.push(c),
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_conditions(out);
                r.collect_conditions(out);
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Condition(c) => write!(f, "{}", c),
            Predicate::And(l, r) => write!(f, "({} AND {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} OR {})", l, r),
        }
    }
}

/// Projection clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    All,
    /// Explicit field list, in request order
    Fields(Vec<String>),
}

impl Projection {
    pub fn is_all(&self) -> bool {
        matches!(self, Projection::All)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parsed query. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub projection: Projection,
    /// Collection named in FROM; informational only
    pub source: Option<String>,
    pub predicate: Option<Predicate>,
    pub group_by: Option<String>,
    /// Sort keys in priority order
    pub sort: Vec<SortSpec>,
    pub limit: Option<u64>,
}

impl QueryPlan {
    /// `SELECT *` with no other clauses
    pub fn select_all() -> Self {
        Self {
            projection: Projection::All,
            source: None,
            predicate: None,
            group_by: None,
            sort: Vec::new(),
            limit: None,
        }
    }

    /// `SELECT f1, f2, ...` with no other clauses
    pub fn select(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            projection: Projection::Fields(fields.into_iter().map(Into::into).collect()),
            ..Self::select_all()
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    /// Appends a sort key
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every field name the plan refers to, deduplicated
    pub fn referenced_fields(&self) -> BTreeSet<&str> {
        let mut fields = BTreeSet::new();
        if let Projection::Fields(list) = &self.projection {
            fields.extend(list.iter().map(String::as_str));
        }
        if let Some(predicate) = &self.predicate {
            fields.extend(predicate.conditions().into_iter().map(|c| c.field.as_str()));
        }
        if let Some(group) = &self.group_by {
            fields.insert(group.as_str());
        }
        fields.extend(self.sort.iter().map(|s| s.field.as_str()));
        fields
    }
}
