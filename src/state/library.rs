use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::data::{Asset, AssetFields, Permission, Project, ProjectFields};
use super::error::{LedgerError, LedgerResult};

const PROJECT_COLUMNS: &str = "id, name, type, usage, status, notes, \
     use_legal_details, use_project_usage, use_tags, use_asset_notes";

const ASSET_COLUMNS: &str = "id, project_id, name, asset_type, author, source_url, \
     download_date, license_type, custom_license, allow_commercial, allow_modifications, \
     require_attribution, attribution_text, project_usage, internal_notes, tags, proof_path";

/// Columns introduced after the first schema version: (table, column, declaration).
/// Older stores get them added on open; existing rows are kept.
const LATER_COLUMNS: &[(&str, &str, &str)] = &[
    ("projects", "use_legal_details", "INTEGER DEFAULT 0"),
    ("projects", "use_project_usage", "INTEGER DEFAULT 0"),
    ("projects", "use_tags", "INTEGER DEFAULT 0"),
    ("projects", "use_asset_notes", "INTEGER DEFAULT 0"),
    ("assets", "tags", "TEXT"),
    ("assets", "proof_path", "TEXT"),
];

/// The Library manages the SQLite catalog database.
/// It stores projects and the assets they use. Every mutating call commits
/// before returning; there is no caching layer on top of it.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open (or create) the catalog stored at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> LedgerResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LedgerError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let conn = Connection::open(&db_path)?;
        info!(path = %db_path.display(), "database opened");

        Self::init(conn, Some(db_path))
    }

    /// Catalog that lives only as long as the returned value. Used by tests.
    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> LedgerResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let library = Library { conn, db_path };
        library.init_schema()?;
        Ok(library)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist,
    /// then adds columns that older stores are missing.
    fn init_schema(&self) -> LedgerResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL,
                type                TEXT,
                usage               TEXT,
                status              TEXT,
                notes               TEXT,
                use_legal_details   INTEGER DEFAULT 0,
                use_project_usage   INTEGER DEFAULT 0,
                use_tags            INTEGER DEFAULT 0,
                use_asset_notes     INTEGER DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS assets (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id          INTEGER NOT NULL,
                name                TEXT NOT NULL,
                asset_type          TEXT,
                author              TEXT,
                source_url          TEXT,
                download_date       TEXT,
                license_type        TEXT,
                custom_license      TEXT,
                allow_commercial    TEXT,
                allow_modifications TEXT,
                require_attribution TEXT,
                attribution_text    TEXT,
                project_usage       TEXT,
                internal_notes      TEXT,
                tags                TEXT,
                proof_path          TEXT,
                FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
            );",
        )?;

        for (table, column, declaration) in LATER_COLUMNS {
            if !self.has_column(table, column)? {
                self.conn.execute(
                    &format!("ALTER TABLE {table} ADD COLUMN {column} {declaration}"),
                    [],
                )?;
                info!(table, column, "added missing column to existing store");
            }
        }

        self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_assets_project_id ON assets(project_id);
             CREATE INDEX IF NOT EXISTS idx_assets_asset_type ON assets(asset_type);",
        )?;

        debug!("database schema initialized");
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> LedgerResult<bool> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.iter().any(|name| name == column))
    }

    /// Get the path to the database file (None for in-memory catalogs)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn project_count(&self) -> LedgerResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?)
    }

    pub fn asset_count(&self) -> LedgerResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?)
    }

    // ---- Projects ----

    /// All projects ordered by name (case-insensitive)
    pub fn list_projects(&self) -> LedgerResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name COLLATE NOCASE, id"
        ))?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> LedgerResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                [id],
                project_from_row,
            )
            .optional()?;
        Ok(project)
    }

    /// Insert a new project and return its ID
    pub fn create_project(&self, fields: &ProjectFields) -> LedgerResult<i64> {
        require_name(&fields.name, "Project name is required.")?;

        self.conn.execute(
            "INSERT INTO projects (
                name, type, usage, status, notes,
                use_legal_details, use_project_usage, use_tags, use_asset_notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                fields.name,
                nullable(&fields.project_type),
                nullable(&fields.usage),
                nullable(&fields.status),
                nullable(&fields.notes),
                fields.use_legal_details,
                fields.use_project_usage,
                fields.use_tags,
                fields.use_asset_notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, name = %fields.name, "project created");
        Ok(id)
    }

    /// Replace every mutable field of an existing project
    pub fn update_project(&self, id: i64, fields: &ProjectFields) -> LedgerResult<()> {
        require_name(&fields.name, "Project name is required.")?;

        let changed = self.conn.execute(
            "UPDATE projects SET
                name = ?1, type = ?2, usage = ?3, status = ?4, notes = ?5,
                use_legal_details = ?6, use_project_usage = ?7,
                use_tags = ?8, use_asset_notes = ?9
             WHERE id = ?10",
            params![
                fields.name,
                nullable(&fields.project_type),
                nullable(&fields.usage),
                nullable(&fields.status),
                nullable(&fields.notes),
                fields.use_legal_details,
                fields.use_project_usage,
                fields.use_tags,
                fields.use_asset_notes,
                id,
            ],
        )?;
        expect_row(changed, "Project", id)?;

        info!(id, "project updated");
        Ok(())
    }

    /// Delete a project together with all of its assets.
    /// Both deletes run in one transaction: either everything goes or nothing does.
    pub fn delete_project(&self, id: i64) -> LedgerResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let removed_assets = tx.execute("DELETE FROM assets WHERE project_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        expect_row(removed, "Project", id)?;
        tx.commit()?;

        info!(id, removed_assets, "project deleted");
        Ok(())
    }

    // ---- Assets ----

    /// Assets of one project ordered by name (case-insensitive)
    pub fn list_assets_by_project(&self, project_id: i64) -> LedgerResult<Vec<Asset>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets
             WHERE project_id = ?1
             ORDER BY name COLLATE NOCASE, id"
        ))?;
        let assets = stmt
            .query_map([project_id], asset_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assets)
    }

    pub fn get_asset(&self, id: i64) -> LedgerResult<Option<Asset>> {
        let asset = self
            .conn
            .query_row(
                &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"),
                [id],
                asset_from_row,
            )
            .optional()?;
        Ok(asset)
    }

    /// Insert an asset owned by `project_id` and return its ID
    pub fn create_asset(&self, project_id: i64, fields: &AssetFields) -> LedgerResult<i64> {
        require_name(&fields.name, "Asset name/description is required.")?;
        if self.get_project(project_id)?.is_none() {
            return Err(LedgerError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }

        self.conn.execute(
            "INSERT INTO assets (
                project_id, name, asset_type, author, source_url,
                download_date, license_type, custom_license,
                allow_commercial, allow_modifications, require_attribution,
                attribution_text, project_usage, internal_notes, tags, proof_path
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                project_id,
                fields.name,
                nullable(&fields.asset_type),
                nullable(&fields.author),
                nullable(&fields.source_url),
                nullable(&fields.download_date),
                nullable(&fields.license_type),
                nullable(&fields.custom_license),
                nullable(fields.allow_commercial.as_str()),
                nullable(fields.allow_modifications.as_str()),
                nullable(fields.require_attribution.as_str()),
                nullable(&fields.attribution_text),
                nullable(&fields.project_usage),
                nullable(&fields.internal_notes),
                nullable(&fields.tags),
                nullable(&fields.proof_path),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, project_id, name = %fields.name, "asset created");
        Ok(id)
    }

    /// Replace the mutable fields of an existing asset
    pub fn update_asset(&self, id: i64, fields: &AssetFields) -> LedgerResult<()> {
        require_name(&fields.name, "Asset name/description is required.")?;

        let changed = self.conn.execute(
            "UPDATE assets SET
                name = ?1, asset_type = ?2, author = ?3, source_url = ?4,
                download_date = ?5, license_type = ?6, custom_license = ?7,
                allow_commercial = ?8, allow_modifications = ?9, require_attribution = ?10,
                attribution_text = ?11, project_usage = ?12, internal_notes = ?13, tags = ?14,
                proof_path = ?15
             WHERE id = ?16",
            params![
                fields.name,
                nullable(&fields.asset_type),
                nullable(&fields.author),
                nullable(&fields.source_url),
                nullable(&fields.download_date),
                nullable(&fields.license_type),
                nullable(&fields.custom_license),
                nullable(fields.allow_commercial.as_str()),
                nullable(fields.allow_modifications.as_str()),
                nullable(fields.require_attribution.as_str()),
                nullable(&fields.attribution_text),
                nullable(&fields.project_usage),
                nullable(&fields.internal_notes),
                nullable(&fields.tags),
                nullable(&fields.proof_path),
                id,
            ],
        )?;
        expect_row(changed, "Asset", id)?;

        info!(id, "asset updated");
        Ok(())
    }

    /// Delete a single asset; the owning project is untouched
    pub fn delete_asset(&self, id: i64) -> LedgerResult<()> {
        let removed = self.conn.execute("DELETE FROM assets WHERE id = ?1", [id])?;
        expect_row(removed, "Asset", id)?;
        info!(id, "asset deleted");
        Ok(())
    }

    // ---- Asset types ----

    /// Count of assets per distinct non-empty asset_type, across all projects
    pub fn asset_type_usage(&self) -> LedgerResult<BTreeMap<String, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT asset_type, COUNT(*) FROM assets
             WHERE asset_type IS NOT NULL AND asset_type <> ''
             GROUP BY asset_type",
        )?;
        let usage = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(usage)
    }

    /// Set `asset_type = new` on every asset whose type is exactly `old`.
    /// Returns the number of assets changed.
    pub fn rename_asset_type(&self, old: &str, new: &str) -> LedgerResult<usize> {
        let changed = self.conn.execute(
            "UPDATE assets SET asset_type = ?1 WHERE asset_type = ?2",
            params![nullable(new), old],
        )?;
        info!(old, new, changed, "asset type reassigned");
        Ok(changed)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

fn nullable(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn require_name(name: &str, message: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation(message));
    }
    Ok(())
}

fn expect_row(changed: usize, entity: &'static str, id: i64) -> LedgerResult<()> {
    if changed == 0 {
        return Err(LedgerError::NotFound { entity, id });
    }
    Ok(())
}

fn text_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn flag_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0) != 0)
}

fn permission_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Permission> {
    let raw = text_at(row, idx)?;
    Ok(raw.parse().unwrap_or_else(|err| {
        warn!(%err, "ignoring unreadable permission value");
        Permission::Unset
    }))
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        fields: ProjectFields {
            name: row.get(1)?,
            project_type: text_at(row, 2)?,
            usage: text_at(row, 3)?,
            status: text_at(row, 4)?,
            notes: text_at(row, 5)?,
            use_legal_details: flag_at(row, 6)?,
            use_project_usage: flag_at(row, 7)?,
            use_tags: flag_at(row, 8)?,
            use_asset_notes: flag_at(row, 9)?,
        },
    })
}

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        project_id: row.get(1)?,
        fields: AssetFields {
            name: row.get(2)?,
            asset_type: text_at(row, 3)?,
            author: text_at(row, 4)?,
            source_url: text_at(row, 5)?,
            download_date: text_at(row, 6)?,
            license_type: text_at(row, 7)?,
            custom_license: text_at(row, 8)?,
            allow_commercial: permission_at(row, 9)?,
            allow_modifications: permission_at(row, 10)?,
            require_attribution: permission_at(row, 11)?,
            attribution_text: text_at(row, 12)?,
            project_usage: text_at(row, 13)?,
            internal_notes: text_at(row, 14)?,
            tags: text_at(row, 15)?,
            proof_path: text_at(row, 16)?,
        },
    })
}
