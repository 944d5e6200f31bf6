//! Statement safety classification module.
//!
//! Decides, one statement at a time, whether SQL is read-only and may take
//! the row-streaming path, or must be executed as a mutation.

mod engine;
mod parser;

pub use engine::SqliteClassifier;
pub use parser::KeywordClassifier;

use crate::config::ClassifierKind;
use crate::db::Database;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait implemented by each read-only detection strategy.
///
/// Implementations must not cache verdicts; every call inspects the
/// statement afresh.
#[async_trait]
pub trait StatementClassifier: Send + Sync {
    /// Returns `Ok(true)` if `sql` cannot modify the database.
    ///
    /// Text that does not form exactly one valid statement is an error.
    async fn is_read_only(&self, sql: &str) -> Result<bool>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Builds the classifier selected in configuration.
pub fn classifier_for(kind: ClassifierKind, db: &Database) -> Arc<dyn StatementClassifier> {
    match kind {
        ClassifierKind::Engine => Arc::new(SqliteClassifier::new(db.clone())),
        ClassifierKind::Keyword => Arc::new(KeywordClassifier::new()),
    }
}
