// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! on every open. Refinery records what it applied in
//! `refinery_schema_history`.

use casebook_core::CasebookError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations on a synchronous connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), CasebookError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(CasebookError::storage)?;
    for migration in report.applied_migrations() {
        tracing::info!(
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(())
}
