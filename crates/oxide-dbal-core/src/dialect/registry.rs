//! Explicit dialect registry.

use std::collections::HashMap;

use super::builtin::ALIASES;
use super::Dialect;
use crate::error::{Result, SqlError};

/// Maps dialect names to capability records.
///
/// Built once by the application and passed to whatever needs it; there
/// is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Dialect>,
    aliases: HashMap<String, String>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in dialect and alias.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for dialect in Dialect::BUILTIN {
            registry.register(dialect);
        }
        for (alias, target) in ALIASES {
            registry.alias(alias, target);
        }
        registry
    }

    /// Adds or replaces a dialect under its own name.
    pub fn register(&mut self, dialect: Dialect) {
        self.dialects
            .insert(dialect.name.to_ascii_lowercase(), dialect);
    }

    /// Adds an alternative name for a registered dialect.
    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases
            .insert(alias.to_ascii_lowercase(), target.to_ascii_lowercase());
    }

    /// Looks up a dialect by name or alias, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::UnknownDialect`] when nothing matches.
    pub fn get(&self, name: &str) -> Result<Dialect> {
        let key = name.to_ascii_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.dialects
            .get(key)
            .copied()
            .ok_or_else(|| SqlError::UnknownDialect(String::from(name)))
    }

    /// Names of the registered dialects, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
