//! Persistence for per-chat conversation windows.
//!
//! The table is used strictly as a key-value surface: one row per chat,
//! value is the JSON-serialized message list. There is no
//! compare-and-swap, so two concurrent turns on the same chat race and
//! the later save wins.

use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};

use crate::openai::Message;

/// Load the stored window for a chat. A missing row, a NULL value, or
/// a value that fails to parse all yield an empty window; only a store
/// failure propagates, so the caller can run the turn without context.
pub async fn load_context(db: &Connection, chat_id: i64) -> Result<Vec<Message>, Error> {
    let raw = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT context FROM chat_context WHERE chat_id = ?1")?;
            let mut rows = stmt.query([chat_id])?;
            match rows.next()? {
                Some(row) => Ok(row.get::<_, Option<String>>(0)?),
                None => Ok(None),
            }
        })
        .await?;

    let context = raw
        .and_then(|value| serde_json::from_str(&value).ok())
        .unwrap_or_default();
    Ok(context)
}

/// Persist the window for a chat. Last write wins.
pub async fn save_context(db: &Connection, chat_id: i64, context: &[Message]) -> Result<()> {
    let serialized = serde_json::to_string(context)?;
    db.call(move |conn| {
        conn.execute(
            r"
            INSERT INTO chat_context (chat_id, context) VALUES (?1, ?2)
            ON CONFLICT(chat_id) DO UPDATE SET context = excluded.context
            ",
            params![chat_id, serialized],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Reset the window for a chat to empty.
pub async fn clear_context(db: &Connection, chat_id: i64) -> Result<()> {
    save_context(db, chat_id, &[]).await
}
