//! Sqlite connection plumbing for the context store.

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the async connection backing the context store.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(format!("{}/relay.db", db_path.trim_end_matches('/'))).await?;
    Ok(conn)
}

/// Create the schema if it doesn't already exist. The context table is
/// a plain key-value surface: one row per chat, value is a JSON array
/// of messages.
pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS chat_context (
            chat_id INTEGER PRIMARY KEY,
            context TEXT
        );
        ",
    )
}
