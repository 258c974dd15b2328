use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

/// Applies any `.sql` files under `migrations/` that have not run yet, in
/// filename order. Applied names are tracked in `schema_migrations`.
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create schema_migrations table")?;

    let dir = Path::new("migrations");
    if !dir.exists() {
        tracing::warn!("no migrations directory, skipping");
        return Ok(());
    }

    let mut names: Vec<String> = fs::read_dir(dir)
        .context("failed to read migrations directory")?
        .filter_map(|entry| {
            let name = entry.ok()?.file_name().to_string_lossy().into_owned();
            name.ends_with(".sql").then_some(name)
        })
        .collect();
    names.sort();

    for name in names {
        let applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE name = ?1)",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;
        if applied {
            continue;
        }

        let sql = fs::read_to_string(dir.join(&name))
            .with_context(|| format!("failed to read migration {name}"))?;
        conn.execute_batch(&sql)
            .with_context(|| format!("failed to apply migration {name}"))?;
        conn.execute("INSERT INTO schema_migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration {name}"))?;

        tracing::info!("applied migration {name}");
    }

    Ok(())
}
