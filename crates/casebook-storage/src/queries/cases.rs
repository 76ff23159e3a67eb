// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case CRUD and the conditional status/handler updates.

use casebook_core::types::{Case, CaseId, CaseStatus, Message, NewCase, UserId};
use casebook_core::CasebookError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, parse_column, Database};
use crate::queries::messages;

const CASE_COLUMNS: &str = "id, status, category, title, customer_first_name, customer_last_name,
     customer_email, opened_at, closed_at, case_handler, chat_token, created_at";

pub(crate) fn case_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
    Ok(Case {
        id: CaseId(row.get(0)?),
        status: parse_column(row, 1)?,
        category: parse_column(row, 2)?,
        title: row.get(3)?,
        customer_first_name: row.get(4)?,
        customer_last_name: row.get(5)?,
        customer_email: row.get(6)?,
        opened_at: row.get(7)?,
        closed_at: row.get(8)?,
        handler: row.get::<_, Option<i64>>(9)?.map(UserId),
        chat_token: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn select_case(
    conn: &rusqlite::Connection,
    where_clause: &str,
    param: impl rusqlite::ToSql,
) -> rusqlite::Result<Option<Case>> {
    conn.query_row(
        &format!("SELECT {CASE_COLUMNS} FROM cases WHERE {where_clause}"),
        params![param],
        case_from_row,
    )
    .optional()
}

/// Insert a case and its first customer message in one transaction.
///
/// The chat token is a fresh v4 UUID; `opened_at` is stamped when the case
/// starts out `Open`.
pub async fn create_case(
    db: &Database,
    case: &NewCase,
    first_message: &str,
) -> Result<(Case, Message), CasebookError> {
    let case = case.clone();
    let first_message = first_message.to_string();
    let chat_token = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<(Case, Message)> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO cases (status, category, title, customer_first_name,
                     customer_last_name, customer_email, chat_token, opened_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                     CASE WHEN ?1 = 'Open' THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') END)",
                params![
                    case.status.to_string(),
                    case.category.to_string(),
                    case.title,
                    case.customer_first_name,
                    case.customer_last_name,
                    case.customer_email,
                    chat_token,
                ],
            )?;
            let case_id = tx.last_insert_rowid();
            let message = messages::insert_in(&tx, case_id, &first_message, true)?;
            let created = select_case(&tx, "id = ?1", case_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok((created, message))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_case(db: &Database, id: CaseId) -> Result<Option<Case>, CasebookError> {
    db.connection()
        .call(move |conn| select_case(conn, "id = ?1", id.0))
        .await
        .map_err(map_tr_err)
}

/// Exact match on the chat token.
pub async fn find_by_chat_token(db: &Database, token: &str) -> Result<Option<Case>, CasebookError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| select_case(conn, "chat_token = ?1", token))
        .await
        .map_err(map_tr_err)
}

/// All cases, newest first.
pub async fn list_cases(db: &Database) -> Result<Vec<Case>, CasebookError> {
    db.connection()
        .call(|conn| -> rusqlite::Result<Vec<Case>> {
            let mut stmt =
                conn.prepare(&format!("SELECT {CASE_COLUMNS} FROM cases ORDER BY id DESC"))?;
            let rows = stmt.query_map([], case_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Cases currently assigned to `handler`, newest first.
pub async fn list_cases_for_handler(
    db: &Database,
    handler: UserId,
) -> Result<Vec<Case>, CasebookError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Case>> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CASE_COLUMNS} FROM cases WHERE case_handler = ?1 ORDER BY id DESC"
            ))?;
            let rows = stmt.query_map(params![handler.0], case_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Compare-and-set on status. Returns whether the row was still in `from`.
pub async fn update_status(
    db: &Database,
    id: CaseId,
    from: CaseStatus,
    to: CaseStatus,
) -> Result<bool, CasebookError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let changed = conn.execute(
                "UPDATE cases SET
                     status = ?1,
                     opened_at = CASE WHEN ?1 = 'Open'
                         THEN COALESCE(opened_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                         ELSE opened_at END,
                     closed_at = CASE WHEN ?1 = 'Closed'
                         THEN COALESCE(closed_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                         ELSE closed_at END
                 WHERE id = ?2 AND status = ?3",
                params![to.to_string(), id.0, from.to_string()],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Claim a case for `handler`.
///
/// Matches only a case that is not closed and has no handler or already has
/// this one. An unopened case is opened by the same statement.
pub async fn assign_handler(
    db: &Database,
    id: CaseId,
    handler: UserId,
) -> Result<bool, CasebookError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let changed = conn.execute(
                "UPDATE cases SET
                     case_handler = ?1,
                     status = CASE WHEN status = 'Unopened' THEN 'Open' ELSE status END,
                     opened_at = COALESCE(opened_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 WHERE id = ?2
                   AND status != 'Closed'
                   AND (case_handler IS NULL OR case_handler = ?1)",
                params![handler.0, id.0],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}
