use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use pitch_types::models::Mockup;

/// Bring the `proposals` table up to the current schema.
///
/// Safe to run on every start: the table is created only if absent, the
/// `mockups` column is added only if absent, and the legacy backfill only
/// touches rows whose `mockups` value was never populated.
pub fn run(conn: &mut Connection) -> Result<()> {
    // Pre-migration layout; later columns are added below.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS proposals (
            id            TEXT PRIMARY KEY,
            title         TEXT,
            markdown      TEXT,
            mockup        TEXT,
            passwordHash  TEXT,
            createdAt     TEXT
        );
        ",
    )?;

    let tx = conn.transaction()?;

    let added = !has_column(&tx, "proposals", "mockups")?;
    if added {
        info!("Adding mockups column to proposals");
        tx.execute_batch("ALTER TABLE proposals ADD COLUMN mockups TEXT DEFAULT '[]';")?;
    }

    let migrated = backfill_legacy_mockups(&tx, added)?;
    tx.commit()?;

    if migrated > 0 {
        info!("Migrated {} legacy single-mockup proposals", migrated);
    }
    info!("Database migrations complete");
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}

/// Copy each legacy `mockup` value into `mockups` as a one-element array.
///
/// Right after the column is added every row holds the `'[]'` default, so all
/// rows with legacy content qualify. On later starts only rows whose `mockups`
/// is NULL or blank do; a populated array is never overwritten. The legacy
/// column is left as is.
fn backfill_legacy_mockups(conn: &Connection, column_just_added: bool) -> Result<usize> {
    let mut select = conn.prepare(
        "SELECT id, mockup FROM proposals
         WHERE mockup IS NOT NULL AND mockup != ''
           AND (?1 OR mockups IS NULL OR trim(mockups) = '')",
    )?;
    let legacy = select
        .query_map([column_just_added], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut update = conn.prepare("UPDATE proposals SET mockups = ?2 WHERE id = ?1")?;
    for (id, html) in &legacy {
        let encoded = serde_json::to_string(&[Mockup::from_legacy(html.as_str())])?;
        update.execute((id, encoded))?;
    }

    Ok(legacy.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, StoreLocation};

    fn legacy_store(path: &std::path::Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE proposals (
                id TEXT PRIMARY KEY,
                title TEXT,
                markdown TEXT,
                mockup TEXT,
                passwordHash TEXT,
                createdAt TEXT
            );
            INSERT INTO proposals VALUES
                ('aaaa0001', 'Old', '# old', '<h1>legacy</h1>', 'x', '2023-01-01T00:00:00.000Z'),
                ('aaaa0002', 'Empty', '', '', 'x', '2023-01-02T00:00:00.000Z'),
                ('aaaa0003', 'Null', '', NULL, 'x', '2023-01-03T00:00:00.000Z');
            ",
        )
        .unwrap();
    }

    fn mockups_column(db: &Database, id: &str) -> Option<String> {
        db.get("SELECT mockups FROM proposals WHERE id = ?1", [id], |r| r.get(0))
            .unwrap()
            .flatten()
    }

    #[test]
    fn fresh_store_has_mockups_column() {
        let db = Database::open_in_memory().unwrap();
        let present = db
            .with_conn(|conn| has_column(conn, "proposals", "mockups"))
            .unwrap();
        assert!(present);
    }

    #[test]
    fn upgrades_legacy_table_and_backfills() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("proposals.db");
        legacy_store(&path);

        let db = Database::open(&StoreLocation::File(path)).unwrap();

        assert_eq!(
            mockups_column(&db, "aaaa0001").as_deref(),
            Some(r#"[{"title":"Mockup","html":"<h1>legacy</h1>"}]"#)
        );
        assert_eq!(mockups_column(&db, "aaaa0002").as_deref(), Some("[]"));
        assert_eq!(mockups_column(&db, "aaaa0003").as_deref(), Some("[]"));

        // Legacy column is kept as migration source
        let legacy: Option<String> = db
            .get("SELECT mockup FROM proposals WHERE id = 'aaaa0001'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(legacy.as_deref(), Some("<h1>legacy</h1>"));
    }

    #[test]
    fn rerun_does_not_overwrite_populated_arrays() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("proposals.db");
        legacy_store(&path);

        let db = Database::open(&StoreLocation::File(path.clone())).unwrap();
        // An author later cleared the mockups of the migrated row
        db.run("UPDATE proposals SET mockups = '[]' WHERE id = 'aaaa0001'", [])
            .unwrap();
        drop(db);

        let db = Database::open(&StoreLocation::File(path)).unwrap();
        assert_eq!(mockups_column(&db, "aaaa0001").as_deref(), Some("[]"));
    }

    #[test]
    fn rerun_fills_rows_left_null() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("proposals.db");
        legacy_store(&path);

        let db = Database::open(&StoreLocation::File(path.clone())).unwrap();
        db.run(
            "INSERT INTO proposals (id, title, markdown, mockup, mockups, passwordHash, createdAt)
             VALUES ('aaaa0004', 'Late', '', '<p>late</p>', NULL, 'x', '2023-01-04T00:00:00.000Z')",
            [],
        )
        .unwrap();
        drop(db);

        let db = Database::open(&StoreLocation::File(path)).unwrap();
        assert_eq!(
            mockups_column(&db, "aaaa0004").as_deref(),
            Some(r#"[{"title":"Mockup","html":"<p>late</p>"}]"#)
        );
    }

    #[test]
    fn migration_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap();
        assert!(has_column(&conn, "proposals", "mockups").unwrap());
    }
}
