//! Query engine
//!
//! Binds a record source and a field resolver. `query` parses and executes in
//! one call and reports every failure as an [`ExecutionError`].

use crate::executor::{ExecutionError, ExecutionResult, FieldResolver, QueryExecutor, RecordSource};
use crate::observability::{Logger, MetricsRegistry};
use crate::planner::{FieldCatalog, PlannerResult, QueryParser, QueryPlan};

/// Parses and runs queries against a record source
pub struct QueryEngine<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    resolver: FieldResolver,
    catalog: Option<FieldCatalog>,
    metrics: MetricsRegistry,
}

impl<'a, S: RecordSource + ?Sized> QueryEngine<'a, S> {
    /// Engine that accepts any field name
    pub fn new(source: &'a S, resolver: FieldResolver) -> Self {
        Self {
            source,
            resolver,
            catalog: None,
            metrics: MetricsRegistry::new(),
        }
    }

    /// Rejects fields outside `catalog` at parse time
    pub fn with_catalog(mut self, catalog: FieldCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Rejects fields that appear on no current record and are not derived
    pub fn strict(self) -> Self {
        let mut catalog = FieldCatalog::default();
        for record in self.source.snapshot() {
            catalog.extend(record.field_names());
        }
        catalog.extend(self.resolver.derived_names());
        self.with_catalog(catalog)
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    pub fn catalog(&self) -> Option<&FieldCatalog> {
        self.catalog.as_ref()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Parses `text` with the engine's catalog, if any
    pub fn parse(&self, text: &str) -> PlannerResult<QueryPlan> {
        let parser = match &self.catalog {
            Some(catalog) => QueryParser::with_catalog(catalog),
            None => QueryParser::new(),
        };

        match parser.parse(text) {
            Ok(plan) => {
                Logger::trace("QUERY_PARSED", &[("query", text)]);
                Ok(plan)
            }
            Err(err) => {
                self.metrics.increment_queries_rejected();
                Logger::warn(
                    "QUERY_REJECTED",
                    &[
                        ("code", err.code().code()),
                        ("query", text),
                        ("reason", err.message()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Runs a parsed plan over a fresh snapshot
    pub fn execute(&self, plan: &QueryPlan) -> Result<ExecutionResult, ExecutionError> {
        let snapshot = self.source.snapshot();
        self.metrics.add_records_scanned(snapshot.len() as u64);

        match QueryExecutor::new(&self.resolver).execute(plan, &snapshot) {
            Ok(result) => {
                self.metrics.increment_queries_executed();
                self.metrics.add_rows_returned(result.returned_count as u64);
                Logger::info(
                    "QUERY_EXECUTED",
                    &[
                        ("matched", &result.matched_count.to_string()),
                        ("returned", &result.returned_count.to_string()),
                        ("scanned", &result.scanned_count.to_string()),
                    ],
                );
                Ok(result)
            }
            Err(err) => {
                self.metrics.increment_execution_failures();
                Logger::error(
                    "QUERY_FAILED",
                    &[("code", err.code().code()), ("reason", err.message())],
                );
                Err(err)
            }
        }
    }

    /// Parses and executes `text`
    pub fn query(&self, text: &str) -> Result<ExecutionResult, ExecutionError> {
        let plan = self.parse(text)?;
        self.execute(&plan)
    }
}
