//! Query text parser
//!
//! Grammar (keywords case-insensitive):
//!
//! ```text
//! query      := "SELECT" projection [from] [where] [groupby] [orderby] [limit]
//! projection := "*" | field ("," field)*
//! from       := "FROM" name
//! where      := "WHERE" condition (("AND"|"OR") condition)*
//! condition  := field operator literal
//! operator   := ">=" | "<=" | "!=" | "=" | ">" | "<" | "LIKE" | "IN"
//! groupby    := "GROUP BY" field
//! orderby    := "ORDER BY" field ["ASC"|"DESC"] ("," field ["ASC"|"DESC"])*
//! limit      := "LIMIT" integer
//! ```
//!
//! Clauses must appear in the order above, each at most once. The body of a
//! clause is the text up to the next keyword. Keywords inside quoted
//! literals are ignored. A quote only opens a literal at the start of a
//! token, so an apostrophe inside a bare word (`O'Brien`) is literal text. AND binds tighter than OR; parentheses are not
//! supported.

use std::sync::OnceLock;

use regex::Regex;

use super::ast::{Condition, FilterOp, Predicate, Projection, QueryPlan, SortSpec};
use super::catalog::FieldCatalog;
use super::errors::{PlannerError, PlannerResult};

/// Operator tokens in match priority. `>=` must be tried before `>`.
const OPERATORS: [&str; 8] = [">=", "<=", "!=", "=", ">", "<", "LIKE", "IN"];

/// Statements the engine refuses outright
const MUTATION_KEYWORDS: [&str; 5] = ["INSERT", "UPDATE", "DELETE", "DROP", "CREATE"];

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("field pattern is valid"))
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+").expect("integer pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    OrderBy,
    Limit,
}

impl Clause {
    fn keyword(&self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
        }
    }
}

/// Byte range into the query text
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
struct ClauseSpan {
    clause: Clause,
    keyword: Span,
}

/// True when `c` at byte `i` opens a quoted run: a quote character not
/// preceded by a letter or digit
fn opens_quote(text: &str, i: usize, c: char) -> bool {
    (c == '\'' || c == '"')
        && !text[..i]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
}

/// Splits text into whitespace-separated words. A quoted run belongs to
/// the word it starts in, whitespace included.
fn scan_words(text: &str) -> PlannerResult<Vec<Span>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push(Span { start: s, end: i });
            }
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        if opens_quote(text, i, c) {
            quote = Some(c);
        }
    }

    if quote.is_some() {
        return Err(PlannerError::syntax("Unterminated quoted literal"));
    }
    if let Some(s) = start {
        words.push(Span {
            start: s,
            end: text.len(),
        });
    }
    Ok(words)
}

fn locate_clauses(text: &str, words: &[Span]) -> Vec<ClauseSpan> {
    let word = |i: usize| &text[words[i].start..words[i].end];
    let followed_by_by =
        |i: usize| i + 1 < words.len() && word(i + 1).eq_ignore_ascii_case("BY");

    let mut found = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let w = word(i);
        let matched = if w.eq_ignore_ascii_case("SELECT") {
            Some((Clause::Select, i))
        } else if w.eq_ignore_ascii_case("FROM") {
            Some((Clause::From, i))
        } else if w.eq_ignore_ascii_case("WHERE") {
            Some((Clause::Where, i))
        } else if w.eq_ignore_ascii_case("LIMIT") {
            Some((Clause::Limit, i))
        } else if w.eq_ignore_ascii_case("GROUP") && followed_by_by(i) {
            Some((Clause::GroupBy, i + 1))
        } else if w.eq_ignore_ascii_case("ORDER") && followed_by_by(i) {
            Some((Clause::OrderBy, i + 1))
        } else {
            None
        };

        match matched {
            Some((clause, last)) => {
                found.push(ClauseSpan {
                    clause,
                    keyword: Span {
                        start: words[i].start,
                        end: words[last].end,
                    },
                });
                i = last + 1;
            }
            None => i += 1,
        }
    }
    found
}

/// Finds `token` outside quoted runs
fn find_symbol(segment: &str, token: &str) -> Option<Span> {
    let mut quote: Option<char> = None;
    for (i, c) in segment.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if opens_quote(segment, i, c) {
            quote = Some(c);
            continue;
        }
        if segment[i..].starts_with(token) {
            return Some(Span {
                start: i,
                end: i + token.len(),
            });
        }
    }
    None
}

/// Finds `token` as a whole word, case-insensitively
fn find_word(segment: &str, token: &str) -> PlannerResult<Option<Span>> {
    Ok(scan_words(segment)?
        .into_iter()
        .find(|w| segment[w.start..w.end].eq_ignore_ascii_case(token)))
}

/// Splits on `sep` outside quoted runs
fn split_outside_quotes(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if opens_quote(text, i, c) => quote = Some(c),
            None if c == sep => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Removes one layer of matching quotes
fn strip_quotes(raw: &str) -> &str {
    let s = raw.trim();
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Canonical (lower-case) field name
fn field_name(raw: &str) -> PlannerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::syntax("Missing field name"));
    }
    let name = trimmed.to_lowercase();
    if !field_pattern().is_match(&name) {
        return Err(PlannerError::invalid_field(
            name,
            format!("Invalid field name '{}'", trimmed),
        ));
    }
    Ok(name)
}

fn parse_projection(body: &str) -> PlannerResult<Projection> {
    if body == "*" {
        return Ok(Projection::All);
    }
    let mut fields = Vec::new();
    for part in body.split(',') {
        if part.trim() == "*" {
            return Err(PlannerError::syntax(
                "'*' cannot be combined with other fields",
            ));
        }
        fields.push(field_name(part)?);
    }
    Ok(Projection::Fields(fields))
}

fn parse_from(body: &str) -> PlannerResult<String> {
    let mut tokens = body.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(name), None) => Ok(name.to_string()),
        _ => Err(PlannerError::syntax("FROM takes a single collection name")),
    }
}

fn parse_candidates(raw: &str) -> PlannerResult<Vec<String>> {
    let mut inner = raw.trim();
    if inner.starts_with('(') && inner.ends_with(')') && inner.len() >= 2 {
        inner = &inner[1..inner.len() - 1];
    }
    let candidates: Vec<String> = split_outside_quotes(inner, ',')
        .into_iter()
        .map(|c| strip_quotes(c).to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if candidates.is_empty() {
        return Err(PlannerError::syntax("IN requires at least one value"));
    }
    Ok(candidates)
}

fn parse_condition(segment: &str) -> PlannerResult<Condition> {
    for token in OPERATORS {
        let found = if token.chars().all(|c| c.is_ascii_alphabetic()) {
            find_word(segment, token)?
        } else {
            find_symbol(segment, token)
        };
        let Some(span) = found else {
            continue;
        };

        let field = field_name(&segment[..span.start])?;
        let raw = segment[span.end..].trim();
        if raw.is_empty() {
            return Err(PlannerError::invalid_field(
                field.clone(),
                format!("Missing literal in condition on '{}'", field),
            ));
        }

        let literal = strip_quotes(raw).to_string();
        let op = match token {
            ">=" => FilterOp::Gte(literal),
            "<=" => FilterOp::Lte(literal),
            "!=" => FilterOp::Ne(literal),
            "=" => FilterOp::Eq(literal),
            ">" => FilterOp::Gt(literal),
            "<" => FilterOp::Lt(literal),
            // SQL-style wildcards are implied by substring matching
            "LIKE" => FilterOp::Like(literal.trim_matches('%').to_string()),
            _ => FilterOp::In(parse_candidates(raw)?),
        };
        return Ok(Condition::new(field, op));
    }

    Err(PlannerError::syntax(format!("Invalid condition: {}", segment)))
}

fn parse_where(body: &str) -> PlannerResult<Predicate> {
    let mut groups: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut segment_start = 0;

    for word in scan_words(body)? {
        let text = &body[word.start..word.end];
        let is_and = text.eq_ignore_ascii_case("AND");
        let is_or = text.eq_ignore_ascii_case("OR");
        if !is_and && !is_or {
            continue;
        }
        current.push(body[segment_start..word.start].trim());
        if is_or {
            groups.push(std::mem::take(&mut current));
        }
        segment_start = word.end;
    }
    current.push(body[segment_start..].trim());
    groups.push(current);

    let mut disjunction: Option<Predicate> = None;
    for group in groups {
        let mut conjunction: Option<Predicate> = None;
        for segment in group {
            if segment.is_empty() {
                return Err(PlannerError::syntax("Empty condition in WHERE clause"));
            }
            let leaf = Predicate::Condition(parse_condition(segment)?);
            conjunction = Some(match conjunction {
                Some(p) => p.and(leaf),
                None => leaf,
            });
        }
        if let Some(conjunction) = conjunction {
            disjunction = Some(match disjunction {
                Some(p) => p.or(conjunction),
                None => conjunction,
            });
        }
    }

    disjunction.ok_or_else(|| PlannerError::syntax("WHERE requires an operand"))
}

fn parse_group_by(body: &str) -> PlannerResult<String> {
    let mut tokens = body.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(field), None) => field_name(field),
        _ => Err(PlannerError::syntax("GROUP BY takes a single field")),
    }
}

fn parse_order_by(body: &str) -> PlannerResult<Vec<SortSpec>> {
    let mut keys = Vec::new();
    for item in body.split(',') {
        let tokens: Vec<&str> = item.split_whitespace().collect();
        let key = match tokens.as_slice() {
            [field] => SortSpec::asc(field_name(field)?),
            [field, dir] if dir.eq_ignore_ascii_case("ASC") => SortSpec::asc(field_name(field)?),
            [field, dir] if dir.eq_ignore_ascii_case("DESC") => {
                SortSpec::desc(field_name(field)?)
            }
            [_, dir] => {
                return Err(PlannerError::syntax(format!(
                    "Invalid sort direction '{}'",
                    dir
                )))
            }
            [] => return Err(PlannerError::syntax("Empty sort key in ORDER BY")),
            _ => {
                return Err(PlannerError::syntax(format!(
                    "Invalid sort key '{}'",
                    item.trim()
                )))
            }
        };
        keys.push(key);
    }
    Ok(keys)
}

fn parse_limit(body: &str) -> PlannerResult<u64> {
    let token = integer_pattern()
        .find(body)
        .ok_or_else(|| {
            PlannerError::invalid_limit(format!(
                "LIMIT must be a non-negative integer, got '{}'",
                body
            ))
        })?
        .as_str();

    if token.starts_with('-') {
        return Err(PlannerError::invalid_limit(format!(
            "LIMIT must be non-negative, got {}",
            token
        )));
    }
    token
        .parse::<u64>()
        .map_err(|_| PlannerError::invalid_limit(format!("LIMIT {} is out of range", token)))
}

/// Parses query text into a plan, optionally checking fields against a
/// catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser<'a> {
    catalog: Option<&'a FieldCatalog>,
}

impl<'a> QueryParser<'a> {
    /// Parser that accepts any well-formed field name
    pub fn new() -> Self {
        Self { catalog: None }
    }

    /// Parser that rejects fields outside `catalog`
    pub fn with_catalog(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    /// Parses query text.
    ///
    /// Deterministic: the same text always yields the same plan or error.
    pub fn parse(&self, text: &str) -> PlannerResult<QueryPlan> {
        let words = scan_words(text)?;
        let clauses = locate_clauses(text, &words);

        match clauses.first() {
            Some(first)
                if first.clause == Clause::Select && text[..first.keyword.start].trim().is_empty() => {}
            _ => return Err(PlannerError::syntax("Query must start with SELECT")),
        }

        for pair in clauses.windows(2) {
            let (prev, next) = (pair[0].clause, pair[1].clause);
            if next == prev {
                return Err(PlannerError::syntax(format!(
                    "Duplicate {} clause",
                    next.keyword()
                )));
            }
            if next < prev {
                return Err(PlannerError::syntax(format!(
                    "{} must come before {}",
                    next.keyword(),
                    prev.keyword()
                )));
            }
        }

        let mut plan = QueryPlan::select_all();
        for (i, span) in clauses.iter().enumerate() {
            let body_end = clauses
                .get(i + 1)
                .map(|next| next.keyword.start)
                .unwrap_or(text.len());
            let body = text[span.keyword.end..body_end].trim();
            if body.is_empty() {
                return Err(PlannerError::syntax(format!(
                    "{} requires an operand",
                    span.clause.keyword()
                )));
            }

            match span.clause {
                Clause::Select => plan.projection = parse_projection(body)?,
                Clause::From => plan.source = Some(parse_from(body)?),
                Clause::Where => plan.predicate = Some(parse_where(body)?),
                Clause::GroupBy => plan.group_by = Some(parse_group_by(body)?),
                Clause::OrderBy => plan.sort = parse_order_by(body)?,
                Clause::Limit => plan.limit = Some(parse_limit(body)?),
            }
        }

        if let Some(catalog) = self.catalog {
            if let Some(unknown) = plan
                .referenced_fields()
                .into_iter()
                .find(|f| !catalog.contains(f))
            {
                return Err(PlannerError::unknown_field(unknown));
            }
        }

        Ok(plan)
    }
}

/// Parses query text without a field catalog
pub fn parse(text: &str) -> PlannerResult<QueryPlan> {
    QueryParser::new().parse(text)
}

/// Checks that text is a read-only SELECT, then parses it
pub fn validate(text: &str) -> PlannerResult<QueryPlan> {
    let words = scan_words(text)?;
    let starts_with_select = words
        .first()
        .map(|w| text[w.start..w.end].eq_ignore_ascii_case("SELECT"))
        .unwrap_or(false);
    if !starts_with_select {
        return Err(PlannerError::syntax("Query must start with SELECT"));
    }

    for w in &words {
        let word = &text[w.start..w.end];
        if let Some(keyword) = MUTATION_KEYWORDS
            .iter()
            .find(|k| word.eq_ignore_ascii_case(k))
        {
            return Err(PlannerError::unsupported(*keyword));
        }
    }

    parse(text)
}

/// Example queries for users
pub fn sample_queries() -> &'static [&'static str] {
    &[
        "SELECT * FROM students",
        "SELECT name, avg_grade FROM students WHERE avg_grade > 80",
        "SELECT * FROM students WHERE name LIKE 'John'",
        "SELECT * FROM students WHERE avg_grade >= 70 AND avg_grade <= 90",
        "SELECT * FROM students ORDER BY avg_grade DESC",
        "SELECT * FROM students ORDER BY name ASC LIMIT 5",
        "SELECT name FROM students WHERE courses LIKE 'Math'",
        "SELECT * FROM students GROUP BY course_count",
        "SELECT * FROM students WHERE course_count > 2",
    ]
}
