//! Virtual tables
//!
//! A virtual table pairs a transform with a parameterized query. The
//! registry is built once at startup and read-only afterwards.

use std::collections::HashMap;

use crate::error::{Result, SocketmapError};
use crate::transform::Transform;

/// One configured lookup table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    /// Name used in requests
    pub name: String,

    /// Maps the key to query parameters
    pub transform: Transform,

    /// Query with driver-specific positional placeholders
    pub query: String,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, transform: Transform, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform,
            query: query.into(),
        }
    }
}

/// All configured tables, by name
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, TableDescriptor>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; names must be unique
    pub fn insert(&mut self, table: TableDescriptor) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(SocketmapError::Config(format!(
                "duplicate table: {}",
                table.name
            )));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
