//! Batch splitting and bookkeeping.

/// Statement separator.
const SEPARATOR: char = ';';

/// Splits a request body into statements on every `;`.
///
/// There is no awareness of quoting: a `;` inside a string literal splits
/// the statement. A trailing `;` yields a trailing empty statement, which is
/// dispatched like any other.
pub fn split_batch(body: &str) -> Vec<&str> {
    body.split(SEPARATOR).collect()
}

/// Which execution path a statement took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Query,
    Mutation,
}

/// Counts of what a completed batch ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub statements: usize,
    pub queries: usize,
    pub mutations: usize,
    /// Data rows written across all queries.
    pub rows: usize,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, route: Route) {
        self.statements += 1;
        match route {
            Route::Query => self.queries += 1,
            Route::Mutation => self.mutations += 1,
        }
    }
}
