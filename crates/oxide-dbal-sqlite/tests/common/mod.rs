#![allow(dead_code)]

use oxide_dbal::{RowStatus, Session, StreamItem};
use oxide_dbal_core::{Dialect, Row};
use oxide_dbal_sqlite::SqliteConnection;

pub const USERS: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT,
    active BOOLEAN NOT NULL DEFAULT 1
)";

/// Opens an in-memory database.
pub fn memory() -> SqliteConnection {
    SqliteConnection::memory().unwrap()
}

/// A session over `conn` with the `users` table created.
pub fn users_session(conn: &SqliteConnection) -> Session<&SqliteConnection> {
    let session = Session::new(conn, Dialect::SQLITE);
    session.execute(USERS, ()).unwrap();
    session
}

pub fn user(id: i64, email: &str, name: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("email", email)
        .with("name", name)
}

/// `count` users with ids from 1.
pub fn users(count: i64) -> Vec<Row> {
    (1..=count)
        .map(|i| user(i, &format!("u{i}@example.com"), &format!("User {i}")))
        .collect()
}

pub fn count(session: &Session<&SqliteConnection>, table: &str) -> i64 {
    session
        .query(&format!("SELECT COUNT(*) AS n FROM {table}"), ())
        .unwrap()
        .scalar()
        .and_then(oxide_dbal_core::SqlValue::as_i64)
        .unwrap()
}

/// Rows wrapped as fetched stream items, numbered from 1.
pub fn stream_items(rows: Vec<Row>) -> Vec<oxide_dbal::Result<StreamItem>> {
    rows.into_iter()
        .zip(1_u64..)
        .map(|(row, seq)| {
            Ok(StreamItem {
                seq,
                row,
                status: RowStatus::Ok,
            })
        })
        .collect()
}
