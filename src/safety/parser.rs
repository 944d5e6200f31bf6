//! Parser-based classification.
//!
//! Uses sqlparser-rs with the SQLite dialect to decide read-only status
//! from the statement's syntax tree. This is a lower-fidelity substitute for
//! [`super::SqliteClassifier`]: it never sees the schema, so it cannot catch
//! writes hidden behind triggers or virtual tables, and any construct it does
//! not recognize is treated as a mutation.

use async_trait::async_trait;
use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::error::{DbError, Result};

use super::StatementClassifier;

/// Classifier that parses SQL instead of asking the engine.
#[derive(Debug)]
pub struct KeywordClassifier {
    dialect: SQLiteDialect,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    /// Creates a new parser-based classifier.
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Parses `sql` and classifies the single statement it contains.
    ///
    /// Empty or comment-only text is read-only.
    pub fn classify(&self, sql: &str) -> Result<bool> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| DbError::prepare(format!("SQL parse error: {e}")))?;

        match statements.as_slice() {
            // Nothing to run
            [] => Ok(true),
            [statement] => Ok(statement_is_read_only(statement)),
            _ => Err(DbError::prepare("expected a single statement")),
        }
    }
}

#[async_trait]
impl StatementClassifier for KeywordClassifier {
    async fn is_read_only(&self, sql: &str) -> Result<bool> {
        self.classify(sql)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Classifies a single parsed statement.
fn statement_is_read_only(statement: &Statement) -> bool {
    match statement {
        Statement::Query(query) => query_is_read_only(query),
        // Plain EXPLAIN only compiles the inner statement
        Statement::Explain {
            analyze, statement, ..
        } => !*analyze || statement_is_read_only(statement),
        Statement::ExplainTable { .. } => true,
        // `PRAGMA name` reads; `PRAGMA name = value` may write
        Statement::Pragma { value, .. } => value.is_none(),
        _ => false,
    }
}

/// Checks CTEs and the query body for data-modifying operations.
fn query_is_read_only(query: &Query) -> bool {
    let ctes_read_only = query.with.as_ref().map_or(true, |with| {
        with.cte_tables
            .iter()
            .all(|cte| query_is_read_only(&cte.query))
    });

    ctes_read_only && set_expr_is_read_only(&query.body)
}

fn set_expr_is_read_only(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => select_is_read_only(select),
        SetExpr::Query(query) => query_is_read_only(query),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_is_read_only(left) && set_expr_is_read_only(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        // INSERT/UPDATE and anything newer
        _ => false,
    }
}

fn select_is_read_only(select: &Select) -> bool {
    select.from.iter().all(table_with_joins_is_read_only)
}

fn table_with_joins_is_read_only(twj: &TableWithJoins) -> bool {
    table_factor_is_read_only(&twj.relation)
        && twj
            .joins
            .iter()
            .all(|join| table_factor_is_read_only(&join.relation))
}

fn table_factor_is_read_only(factor: &TableFactor) -> bool {
    match factor {
        TableFactor::Derived { subquery, .. } => query_is_read_only(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => table_with_joins_is_read_only(table_with_joins),
        _ => true,
    }
}
