//! Key transforms
//!
//! A transform turns the raw lookup key into the ordered parameters bound
//! into a table's query.
//!
//! ## Built-ins
//! - `all`: the key unchanged (default)
//! - `lowercase`: the key lowercased
//! - `local`: the part before the first `@`
//! - `domain`: the part after the first `@`
//! - `split`: both parts, `(local, domain)`
//!
//! Address-based transforms lowercase their output, and strip the recipient
//! delimiter extension from the local part when one is configured.
//!
//! Anything else must be registered with [`TransformRegistry::register`]
//! before the config is loaded. Names are resolved once, at load time.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;

/// Signature of an externally supplied transform
pub type TransformFn =
    dyn Fn(&str, &TransformOptions) -> Result<Vec<String>, TransformError> + Send + Sync;

/// Why a key could not be transformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("key has no '@': {0}")]
    MissingAt(String),

    #[error("transform {name} failed: {message}")]
    External { name: String, message: String },

    #[error("transform {0} panicked")]
    Panicked(String),

    #[error("unknown transform: {0}")]
    Unknown(String),
}

impl TransformError {
    /// Build a failure from inside an external transform
    pub fn external(name: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::External {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Reason suitable for the wire; external messages stay in the logs
    pub fn public_reason(&self) -> String {
        match self {
            TransformError::External { name, .. } | TransformError::Panicked(name) => {
                format!("transform {} failed", name)
            }
            other => other.to_string(),
        }
    }
}

/// Site settings transforms may consult
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Postfix `recipient_delimiter`, e.g. `+` for `user+tag@example.com`
    pub recipient_delimiter: Option<String>,
}

/// The built-in transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    All,
    Lowercase,
    Local,
    Domain,
    Split,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(Builtin::All),
            "lowercase" => Some(Builtin::Lowercase),
            "local" => Some(Builtin::Local),
            "domain" => Some(Builtin::Domain),
            "split" => Some(Builtin::Split),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::All => "all",
            Builtin::Lowercase => "lowercase",
            Builtin::Local => "local",
            Builtin::Domain => "domain",
            Builtin::Split => "split",
        }
    }

    fn apply(&self, key: &str, options: &TransformOptions) -> Result<Vec<String>, TransformError> {
        match self {
            Builtin::All => Ok(vec![key.to_string()]),
            Builtin::Lowercase => Ok(vec![key.to_lowercase()]),
            Builtin::Local => {
                let (local, _) = split_address(key)?;
                Ok(vec![strip_extension(local, options)])
            }
            Builtin::Domain => {
                let (_, domain) = split_address(key)?;
                Ok(vec![domain.to_lowercase()])
            }
            Builtin::Split => {
                let (local, domain) = split_address(key)?;
                Ok(vec![strip_extension(local, options), domain.to_lowercase()])
            }
        }
    }
}

fn split_address(key: &str) -> Result<(&str, &str), TransformError> {
    key.split_once('@')
        .ok_or_else(|| TransformError::MissingAt(key.to_string()))
}

fn strip_extension(local: &str, options: &TransformOptions) -> String {
    let local = match options.recipient_delimiter.as_deref() {
        Some(delimiter) if !delimiter.is_empty() => {
            local.split_once(delimiter).map_or(local, |(base, _)| base)
        }
        _ => local,
    };
    local.to_lowercase()
}

/// A resolved transform, ready to call
#[derive(Clone)]
pub enum Transform {
    Builtin(Builtin),
    External { name: String, func: Arc<TransformFn> },
}

impl Transform {
    pub fn name(&self) -> &str {
        match self {
            Transform::Builtin(builtin) => builtin.name(),
            Transform::External { name, .. } => name,
        }
    }

    /// Map a key to query parameters
    ///
    /// A panic inside an external transform is reported as an error rather
    /// than unwinding into the session.
    pub fn apply(&self, key: &str, options: &TransformOptions) -> Result<Vec<String>, TransformError> {
        match self {
            Transform::Builtin(builtin) => builtin.apply(key, options),
            Transform::External { name, func } => {
                panic::catch_unwind(AssertUnwindSafe(|| func(key, options)))
                    .unwrap_or_else(|_| Err(TransformError::Panicked(name.clone())))
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::Builtin(Builtin::All)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Transform::External { name, .. } => {
                f.debug_struct("External").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

/// Named transforms available to the config loader
#[derive(Clone, Default)]
pub struct TransformRegistry {
    external: HashMap<String, Arc<TransformFn>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external transform under `name`
    ///
    /// Built-in names take precedence and cannot be shadowed.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&str, &TransformOptions) -> Result<Vec<String>, TransformError> + Send + Sync + 'static,
    {
        let name = name.into();
        if Builtin::from_name(&name).is_some() {
            tracing::warn!("Ignoring external transform {:?}: shadows a built-in", name);
            return self;
        }
        self.external.insert(name, Arc::new(func));
        self
    }

    /// Resolve a transform name
    pub fn resolve(&self, name: &str) -> Result<Transform, TransformError> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(Transform::Builtin(builtin));
        }
        self.external
            .get(name)
            .map(|func| Transform::External {
                name: name.to_string(),
                func: Arc::clone(func),
            })
            .ok_or_else(|| TransformError::Unknown(name.to_string()))
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("external", &self.external.keys().collect::<Vec<_>>())
            .finish()
    }
}
