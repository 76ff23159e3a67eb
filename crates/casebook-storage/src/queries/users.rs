// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Back-office account CRUD and registration redemption.

use casebook_core::types::{NewUser, User, UserId, UserStatus, UserUpdate};
use casebook_core::CasebookError;
use rusqlite::{params, OptionalExtension};

use crate::database::{is_constraint_violation, map_tr_err, parse_column, Database};

const USER_COLUMNS: &str =
    "id, user_name, password_hash, role, email, active, status, register_token, created_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        user_name: row.get(1)?,
        password_hash: row.get(2)?,
        role: parse_column(row, 3)?,
        email: row.get(4)?,
        active: row.get(5)?,
        status: parse_column(row, 6)?,
        register_token: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn select_user(
    conn: &rusqlite::Connection,
    where_clause: &str,
    param: impl rusqlite::ToSql,
) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {where_clause}"),
        params![param],
        user_from_row,
    )
    .optional()
}

fn name_taken(user_name: &str) -> CasebookError {
    CasebookError::Conflict(format!("user name `{user_name}` is already taken"))
}

/// Insert an account. A pending account gets a fresh register token.
///
/// A user name that collides case-insensitively with an existing one is a
/// `Conflict`.
pub async fn create_user(db: &Database, user: &NewUser) -> Result<User, CasebookError> {
    let user = user.clone();
    let register_token =
        (user.status == UserStatus::Pending).then(|| uuid::Uuid::new_v4().to_string());
    db.connection()
        .call(move |conn| -> rusqlite::Result<Result<User, CasebookError>> {
            let inserted = conn.execute(
                "INSERT INTO users (user_name, password_hash, role, email, active, status, register_token)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.user_name,
                    user.password_hash,
                    user.role.to_string(),
                    user.email,
                    user.active,
                    user.status.to_string(),
                    register_token,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Ok(Err(name_taken(&user.user_name))),
                Err(e) => return Err(e),
            }
            let created = select_user(conn, "id = ?1", conn.last_insert_rowid())?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            Ok(Ok(created))
        })
        .await
        .map_err(map_tr_err)?
}

pub async fn get_user(db: &Database, id: UserId) -> Result<Option<User>, CasebookError> {
    db.connection()
        .call(move |conn| select_user(conn, "id = ?1", id.0))
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive lookup by user name.
pub async fn find_by_name(db: &Database, user_name: &str) -> Result<Option<User>, CasebookError> {
    let user_name = user_name.to_string();
    db.connection()
        .call(move |conn| select_user(conn, "user_name = ?1 COLLATE NOCASE", user_name))
        .await
        .map_err(map_tr_err)
}

/// Only pending accounts match; a redeemed token resolves to nothing.
pub async fn find_pending_by_register_token(
    db: &Database,
    token: &str,
) -> Result<Option<User>, CasebookError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            select_user(conn, "register_token = ?1 AND status = 'pending'", token)
        })
        .await
        .map_err(map_tr_err)
}

/// Redeem a pending account by user name. Returns false when nothing matched.
pub async fn complete_registration(
    db: &Database,
    user_name: &str,
    password_hash: &str,
) -> Result<bool, CasebookError> {
    let user_name = user_name.to_string();
    let password_hash = password_hash.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let changed = conn.execute(
                "UPDATE users SET password_hash = ?1, status = 'complete'
                 WHERE LOWER(user_name) = LOWER(?2) AND status = 'pending'",
                params![password_hash, user_name],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Redeem a pending account by register token. Returns false when nothing matched.
pub async fn complete_registration_by_token(
    db: &Database,
    token: &str,
    password_hash: &str,
) -> Result<bool, CasebookError> {
    let token = token.to_string();
    let password_hash = password_hash.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let changed = conn.execute(
                "UPDATE users SET password_hash = ?1, status = 'complete'
                 WHERE register_token = ?2 AND status = 'pending'",
                params![password_hash, token],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// All accounts ordered by id.
pub async fn list_users(db: &Database) -> Result<Vec<User>, CasebookError> {
    db.connection()
        .call(|conn| -> rusqlite::Result<Vec<User>> {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply the fields present in `update`. Returns `None` for an unknown id.
pub async fn update_user(
    db: &Database,
    id: UserId,
    update: &UserUpdate,
) -> Result<Option<User>, CasebookError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Result<Option<User>, CasebookError>> {
            let result = conn.execute(
                "UPDATE users SET
                     user_name = COALESCE(?1, user_name),
                     email = COALESCE(?2, email),
                     role = COALESCE(?3, role),
                     active = COALESCE(?4, active)
                 WHERE id = ?5",
                params![
                    update.user_name,
                    update.email,
                    update.role.map(|r| r.to_string()),
                    update.active,
                    id.0,
                ],
            );
            match result {
                Ok(0) => return Ok(Ok(None)),
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    let name = update.user_name.as_deref().unwrap_or_default();
                    return Ok(Err(name_taken(name)));
                }
                Err(e) => return Err(e),
            }
            Ok(Ok(select_user(conn, "id = ?1", id.0)?))
        })
        .await
        .map_err(map_tr_err)?
}

/// Delete an account. Cases it handled keep their history with no handler.
pub async fn delete_user(db: &Database, id: UserId) -> Result<bool, CasebookError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.0])?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}
