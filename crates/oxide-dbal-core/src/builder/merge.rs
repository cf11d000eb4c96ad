//! Upsert builder.
//!
//! Depending on the dialect's [`ConflictStrategy`] a merge becomes
//!
//! - `INSERT ... ON CONFLICT (keys) DO UPDATE SET c = EXCLUDED.c`
//! - `INSERT ... ON DUPLICATE KEY UPDATE c = VALUES(c)`
//! - `MERGE INTO t USING (...) src ON (...) WHEN MATCHED ... WHEN NOT MATCHED ...`
//!
//! Rows are split over several statements so that no statement binds more
//! parameters than the dialect allows.

use super::marker_group;
use crate::dialect::{ConflictStrategy, Dialect, MergeSource, MergeSyntax};
use crate::error::{Result, SqlError};
use crate::placeholder::MarkerSequence;
use crate::row::Row;
use crate::statement::{Operation, Statement};

/// Default number of rows per merge statement.
pub const DEFAULT_MERGE_BATCH: usize = 500;

/// An upsert builder.
#[derive(Debug, Clone)]
pub struct Merge {
    table: String,
    rows: Vec<Row>,
    key_columns: Vec<String>,
    no_update: bool,
    batch_size: Option<usize>,
}

impl Merge {
    /// Starts a merge of `rows` into `table`, matching on `key_columns`.
    #[must_use]
    pub fn into_table(table: &str, rows: Vec<Row>, key_columns: &[&str]) -> Self {
        Self {
            table: String::from(table),
            rows,
            key_columns: key_columns.iter().map(|c| String::from(*c)).collect(),
            no_update: false,
            batch_size: None,
        }
    }

    /// Only inserts missing rows; existing rows are left untouched.
    #[must_use]
    pub const fn no_update(mut self, no_update: bool) -> Self {
        self.no_update = no_update;
        self
    }

    /// Caps the number of rows per statement.
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Uses `batch_size` unless one was set explicitly.
    #[must_use]
    pub fn default_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size.get_or_insert(batch_size);
        self
    }

    /// Builds the statements for `dialect`, in row order.
    ///
    /// Empty data (no rows, or only empty rows) yields no statements.
    ///
    /// # Errors
    ///
    /// Fails before building anything with [`SqlError::NoKeyColumns`],
    /// [`SqlError::MissingKeyColumn`] when a key is absent from the first
    /// row, or [`SqlError::InconsistentColumns`].
    pub fn build(self, dialect: &Dialect) -> Result<Vec<Statement>> {
        if self.key_columns.is_empty() {
            return Err(SqlError::NoKeyColumns);
        }
        let Some(first) = self.rows.first() else {
            return Ok(vec![]);
        };
        if self.rows.iter().all(Row::is_empty) {
            return Ok(vec![]);
        }
        if first.is_empty() {
            if let Some(index) = self.rows.iter().position(|r| !r.same_columns(first)) {
                return Err(SqlError::InconsistentColumns { index });
            }
        }
        if let Some(column) = self.key_columns.iter().find(|k| !first.contains(k)) {
            return Err(SqlError::MissingKeyColumn {
                column: column.clone(),
            });
        }
        if let Some(index) = self.rows.iter().position(|r| !r.same_columns(first)) {
            return Err(SqlError::InconsistentColumns { index });
        }

        let columns = first.columns().to_vec();
        let update: Vec<&String> = if self.no_update {
            vec![]
        } else {
            columns
                .iter()
                .filter(|c| !self.key_columns.contains(c))
                .collect()
        };
        let per_statement = dialect
            .upsert
            .rows_per_statement(columns.len(), self.batch_size.unwrap_or(DEFAULT_MERGE_BATCH));

        let shape = Shape {
            table: &self.table,
            columns: &columns,
            keys: &self.key_columns,
            update: &update,
        };
        let statements = self
            .rows
            .chunks(per_statement)
            .map(|chunk| {
                let mut markers = MarkerSequence::new(dialect.marker);
                let sql = match dialect.upsert.conflict {
                    ConflictStrategy::OnConflict { excluded } => {
                        shape.on_conflict(excluded, chunk.len(), &mut markers)
                    }
                    ConflictStrategy::OnDuplicateKey => {
                        shape.on_duplicate_key(chunk.len(), &mut markers)
                    }
                    ConflictStrategy::Merge(syntax) => {
                        shape.merge(syntax, chunk.len(), &mut markers)
                    }
                };
                Statement {
                    operation: Operation::Merge,
                    table: self.table.clone(),
                    columns: columns.clone(),
                    sql,
                    values: chunk.iter().flat_map(|r| r.values_for(&columns)).collect(),
                }
            })
            .collect();
        Ok(statements)
    }
}

/// Names that shape one upsert statement.
struct Shape<'a> {
    table: &'a str,
    columns: &'a [String],
    keys: &'a [String],
    update: &'a [&'a String],
}

impl Shape<'_> {
    fn insert_values(&self, rows: usize, markers: &mut MarkerSequence) -> String {
        let groups: Vec<String> = (0..rows)
            .map(|_| marker_group(markers, self.columns.len()))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            self.columns.join(", "),
            groups.join(", ")
        )
    }

    fn on_conflict(&self, excluded: &str, rows: usize, markers: &mut MarkerSequence) -> String {
        let insert = self.insert_values(rows, markers);
        let target = self.keys.join(", ");
        if self.update.is_empty() {
            return format!("{insert} ON CONFLICT ({target}) DO NOTHING");
        }
        let set: Vec<String> = self
            .update
            .iter()
            .map(|c| format!("{c} = {excluded}.{c}"))
            .collect();
        format!(
            "{insert} ON CONFLICT ({target}) DO UPDATE SET {}",
            set.join(", ")
        )
    }

    fn on_duplicate_key(&self, rows: usize, markers: &mut MarkerSequence) -> String {
        let insert = self.insert_values(rows, markers);
        let set: Vec<String> = if self.update.is_empty() {
            // A self-assignment keeps duplicates without raising an error.
            vec![format!("{0} = {0}", self.keys[0])]
        } else {
            self.update
                .iter()
                .map(|c| format!("{c} = VALUES({c})"))
                .collect()
        };
        format!("{insert} ON DUPLICATE KEY UPDATE {}", set.join(", "))
    }

    fn merge(&self, syntax: MergeSyntax, rows: usize, markers: &mut MarkerSequence) -> String {
        let columns = self.columns.join(", ");
        let source = match syntax.source {
            MergeSource::Values => {
                let groups: Vec<String> = (0..rows)
                    .map(|_| marker_group(markers, self.columns.len()))
                    .collect();
                format!(
                    "MERGE INTO {} AS tgt USING (VALUES {}) AS src ({columns})",
                    self.table,
                    groups.join(", ")
                )
            }
            MergeSource::SelectFromDual => {
                let selects: Vec<String> = (0..rows)
                    .map(|_| {
                        let fields: Vec<String> = self
                            .columns
                            .iter()
                            .map(|c| format!("{} AS {c}", markers.next_marker()))
                            .collect();
                        format!("SELECT {} FROM dual", fields.join(", "))
                    })
                    .collect();
                format!(
                    "MERGE INTO {} tgt USING ({}) src",
                    self.table,
                    selects.join(" UNION ALL ")
                )
            }
        };

        let on: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("tgt.{k} = src.{k}"))
            .collect();
        let mut sql = format!("{source} ON ({})", on.join(" AND "));
        if !self.update.is_empty() {
            let set: Vec<String> = self
                .update
                .iter()
                .map(|c| format!("tgt.{c} = src.{c}"))
                .collect();
            sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", set.join(", ")));
        }
        let inserted: Vec<String> = self.columns.iter().map(|c| format!("src.{c}")).collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({columns}) VALUES ({})",
            inserted.join(", ")
        ));
        if syntax.terminated {
            sql.push(';');
        }
        sql
    }
}
