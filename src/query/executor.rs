//! Query executor
//!
//! Runs a query through a [`QueryHandle`] and reduces the rows:
//! - zero rows: not found
//! - one row: its first column
//! - several rows: decided by the [`MultiRowPolicy`]
//!
//! Rows wider than one column contribute only their first column. Rows whose
//! first column is NULL are skipped.

use super::{QueryError, QueryHandle, Row};

/// What to do when a query returns more than one row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MultiRowPolicy {
    /// Use the first row the database returns
    #[default]
    FirstRow,

    /// Join every row's value with the delimiter
    Join(String),
}

/// Result of a successful query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(String),
    NotFound,
}

/// Executes queries against a single handle
pub struct QueryExecutor<H> {
    handle: H,
    policy: MultiRowPolicy,
}

impl<H: QueryHandle> QueryExecutor<H> {
    pub fn new(handle: H, policy: MultiRowPolicy) -> Self {
        Self { handle, policy }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Run `query` with `params` and classify the row set
    pub fn execute(&self, query: &str, params: &[String]) -> Result<Lookup, QueryError> {
        let rows = self.handle.execute(query, params)?;
        Ok(self.reduce(rows))
    }

    fn reduce(&self, rows: Vec<Row>) -> Lookup {
        let row_count = rows.len();
        let mut values = rows.into_iter().filter_map(|row| {
            if row.len() > 1 {
                tracing::debug!("Query returned {} columns, using the first", row.len());
            }
            row.into_iter().next().flatten()
        });

        let lookup = match &self.policy {
            MultiRowPolicy::FirstRow => values.next().map(Lookup::Found),
            MultiRowPolicy::Join(delimiter) => {
                let joined: Vec<String> = values.collect();
                if joined.is_empty() {
                    None
                } else {
                    Some(Lookup::Found(joined.join(delimiter)))
                }
            }
        };

        if row_count > 1 {
            tracing::debug!("Query returned {} rows, applying {:?}", row_count, self.policy);
        }
        lookup.unwrap_or(Lookup::NotFound)
    }
}
