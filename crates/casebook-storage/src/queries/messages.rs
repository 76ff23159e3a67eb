// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and listing.

use casebook_core::types::{CaseId, Message, MessageId};
use casebook_core::CasebookError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: MessageId(row.get(0)?),
        case_id: CaseId(row.get(1)?),
        text: row.get(2)?,
        is_sender_customer: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

/// Insert on an existing connection or transaction and read the row back.
pub(crate) fn insert_in(
    conn: &rusqlite::Connection,
    case_id: i64,
    text: &str,
    is_sender_customer: bool,
) -> rusqlite::Result<Message> {
    conn.execute(
        "INSERT INTO messages (case_id, text, is_sender_customer) VALUES (?1, ?2, ?3)",
        params![case_id, text, is_sender_customer],
    )?;
    conn.query_row(
        "SELECT id, case_id, text, is_sender_customer, timestamp FROM messages WHERE id = ?1",
        params![conn.last_insert_rowid()],
        message_from_row,
    )
}

/// Append a message to a case. Returns `None` when the case does not exist.
pub async fn append_message(
    db: &Database,
    case_id: CaseId,
    text: &str,
    is_sender_customer: bool,
) -> Result<Option<Message>, CasebookError> {
    let text = text.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Message>> {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row("SELECT 1 FROM cases WHERE id = ?1", params![case_id.0], |_| {
                    Ok(())
                })
                .optional()?
                .is_some();
            if !exists {
                return Ok(None);
            }
            let message = insert_in(&tx, case_id.0, &text, is_sender_customer)?;
            tx.commit()?;
            Ok(Some(message))
        })
        .await
        .map_err(map_tr_err)
}

/// Messages of a case in chronological order. Ties keep insertion order.
pub async fn list_messages(db: &Database, case_id: CaseId) -> Result<Vec<Message>, CasebookError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Message>> {
            let mut stmt = conn.prepare(
                "SELECT id, case_id, text, is_sender_customer, timestamp
                 FROM messages WHERE case_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![case_id.0], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
