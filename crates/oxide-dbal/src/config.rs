//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, Result};
use crate::transaction::ApplyOptions;

/// Settings for a [`Session`](crate::Session).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use oxide_dbal::SessionConfig;
///
/// let config =
///     SessionConfig::from_json(r#"{"dialect": "postgres", "commit_every": 50}"#).unwrap();
/// assert_eq!(config.dialect, "postgres");
/// assert_eq!(config.insert_batch_size, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Registry name of the dialect.
    pub dialect: String,
    /// Rows per driver call in bulk inserts.
    pub insert_batch_size: usize,
    /// Rows per merge statement, before the dialect's parameter ceiling.
    pub merge_batch_size: usize,
    /// Commit cadence for [`Session::apply`](crate::Session::apply); 0 disables commits.
    pub commit_every: usize,
    /// Errors tolerated by streams and batched writes.
    pub max_tolerated_errors: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dialect: String::from("sqlite"),
            insert_batch_size: 1000,
            merge_batch_size: 500,
            commit_every: 1000,
            max_tolerated_errors: 0,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Config`] for malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ExecError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that batch sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.dialect.trim().is_empty() {
            return Err(ExecError::Config(String::from("dialect must not be empty")));
        }
        for (name, value) in [
            ("insert_batch_size", self.insert_batch_size),
            ("merge_batch_size", self.merge_batch_size),
        ] {
            if value == 0 {
                return Err(ExecError::Config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// The commit cadence and tolerance as [`ApplyOptions`].
    #[must_use]
    pub const fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            commit_every: self.commit_every,
            max_tolerated_errors: self.max_tolerated_errors,
        }
    }
}
