mod import;
mod schema;

pub use import::*;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::*;
use crate::tracker::{ContextResolver, StructureCreator, Tracker};

/// Env var overriding the database location.
pub const DATABASE_ENV: &str = "PUBLISH_LAUNCHER_DB";

/// Local SQLite mirror of the production-tracking site.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open `PUBLISH_LAUNCHER_DB`, or `tracking.db` in the platform data dir.
    pub fn open_default() -> Result<Self> {
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            return Self::open(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "publish-launcher")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().join("tracking.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Project, entity and task records
    // ============================================================

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO projects (id, name, root_path) VALUES (?, ?, ?)",
            (input.id, &input.name, &input.root_path),
        )?;

        Ok(Project {
            id: conn.last_insert_rowid(),
            name: input.name,
            root_path: input.root_path,
        })
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.lock()?;
        query_project(&conn, id)
    }

    pub fn create_entity(&self, input: CreateEntityInput) -> Result<Entity> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO entities (id, entity_type, code, project_id) VALUES (?, ?, ?, ?)",
            (input.id, &input.entity_type, &input.code, input.project_id),
        )?;

        Ok(Entity {
            id: conn.last_insert_rowid(),
            entity_type: input.entity_type,
            code: input.code,
            project_id: input.project_id,
        })
    }

    pub fn get_entity(&self, id: i64) -> Result<Option<Entity>> {
        let conn = self.lock()?;
        query_entity(&conn, id)
    }

    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (id, content, entity_id, project_id) VALUES (?, ?, ?, ?)",
            (input.id, &input.content, input.entity_id, input.project_id),
        )?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            content: input.content,
            entity_id: input.entity_id,
            project_id: input.project_id,
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.lock()?;
        query_task(&conn, id)
    }

    // ============================================================
    // Published files and versions
    // ============================================================

    pub fn create_published_file(&self, input: CreatePublishedFileInput) -> Result<PublishedFile> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO published_files
                (id, entity_type, code, local_path, url, task_id, linked_entity_type, linked_entity_id, project_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                input.id,
                input.kind.as_str(),
                &input.code,
                &input.path.local_path,
                &input.path.url,
                input.task_id,
                input.entity.as_ref().map(|e| e.entity_type.as_str()),
                input.entity.as_ref().map(|e| e.id),
                input.project_id,
            ),
        )?;

        Ok(PublishedFile {
            id: conn.last_insert_rowid(),
            kind: input.kind,
            code: input.code,
            path: input.path,
            task: input.task_id.map(|id| EntityRef::new(TASK_ENTITY_TYPE, id)),
            entity: input.entity,
        })
    }

    pub fn create_version(&self, input: CreateVersionInput) -> Result<Version> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO versions (id, code, project_id, tank_published_file_id) VALUES (?, ?, ?, ?)",
            (input.id, &input.code, input.project_id, input.tank_published_file),
        )?;
        let id = tx.last_insert_rowid();

        for (position, publish_id) in input.published_files.iter().enumerate() {
            tx.execute(
                "INSERT INTO version_published_files (version_id, published_file_id, position)
                 VALUES (?, ?, ?)",
                (id, publish_id, position as i64),
            )?;
        }
        tx.commit()?;

        Ok(Version {
            id,
            code: input.code,
            published_files: input.published_files,
            tank_published_file: input.tank_published_file,
        })
    }

    /// Append a publish to the end of a version's `published_files` link.
    /// Linking the same publish twice is a no-op.
    pub fn link_published_file(&self, version_id: i64, published_file_id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO version_published_files (version_id, published_file_id, position)
             SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
             FROM version_published_files WHERE version_id = ?1",
            (version_id, published_file_id),
        )?;
        Ok(rows > 0)
    }

    /// Point a legacy version at its single `TankPublishedFile`.
    pub fn set_tank_published_file(&self, version_id: i64, published_file_id: Option<i64>) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "UPDATE versions SET tank_published_file_id = ? WHERE id = ?",
            (published_file_id, version_id),
        )?;
        Ok(rows > 0)
    }

    fn folder_for(&self, entity_type: &str, entity_id: i64) -> Result<Option<PathBuf>> {
        let conn = self.lock()?;

        let (entity, leaf) = if entity_type == TASK_ENTITY_TYPE {
            let task = query_task(&conn, entity_id)?
                .ok_or_else(|| anyhow::anyhow!("Task {} not found", entity_id))?;
            let entity = match task.entity_id {
                Some(id) => query_entity(&conn, id)?,
                None => None,
            };
            match entity {
                Some(entity) => (entity, Some(task.content)),
                None => return Ok(None),
            }
        } else {
            let entity = query_entity(&conn, entity_id)?
                .filter(|e| e.entity_type == entity_type)
                .ok_or_else(|| anyhow::anyhow!("{} {} not found", entity_type, entity_id))?;
            (entity, None)
        };

        let root = match entity.project_id {
            Some(id) => query_project(&conn, id)?.and_then(|p| p.root_path),
            None => None,
        };
        let Some(root) = root else {
            return Ok(None);
        };

        let mut folder = PathBuf::from(root);
        folder.push(&entity.entity_type);
        folder.push(&entity.code);
        if let Some(leaf) = leaf {
            folder.push(leaf);
        }
        Ok(Some(folder))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl Tracker for Database {
    fn find_published_file(&self, kind: PublishedFileType, id: i64) -> Result<Option<PublishedFile>> {
        let conn = self.lock()?;
        query_published_file(&conn, kind, id)
    }

    fn find_published_files(&self, kind: PublishedFileType, ids: &[i64]) -> Result<Vec<PublishedFile>> {
        let conn = self.lock()?;
        let mut found = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(publish) = query_published_file(&conn, kind, id)? {
                found.push(publish);
            }
        }
        Ok(found)
    }

    fn find_version(&self, id: i64) -> Result<Option<Version>> {
        let conn = self.lock()?;
        let version = conn
            .query_row(
                "SELECT id, code, tank_published_file_id FROM versions WHERE id = ?",
                [id],
                |row| {
                    Ok(Version {
                        id: row.get(0)?,
                        code: row.get(1)?,
                        published_files: Vec::new(),
                        tank_published_file: row.get(2)?,
                    })
                },
            )
            .optional()?;

        let Some(mut version) = version else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT published_file_id FROM version_published_files
             WHERE version_id = ? ORDER BY position",
        )?;
        version.published_files = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(Some(version))
    }
}

impl ContextResolver for Database {
    fn context_from_entity(&self, entity_type: &str, id: i64) -> Result<LaunchContext> {
        let conn = self.lock()?;
        let mut context = LaunchContext::default();

        let (entity_id, project_id) = match entity_type {
            TASK_ENTITY_TYPE => {
                let task = query_task(&conn, id)?
                    .ok_or_else(|| anyhow::anyhow!("Task {} not found", id))?;
                context.task = Some(NamedRef::new(TASK_ENTITY_TYPE, task.id, task.content));
                (task.entity_id, task.project_id)
            }
            "Project" => (None, Some(id)),
            _ => (Some(id), None),
        };

        let mut project_id = project_id;
        if let Some(entity_id) = entity_id {
            let entity = query_entity(&conn, entity_id)?
                .ok_or_else(|| anyhow::anyhow!("{} {} not found", entity_type, entity_id))?;
            project_id = project_id.or(entity.project_id);
            context.entity = Some(NamedRef::new(entity.entity_type, entity.id, entity.code));
        }

        if let Some(project_id) = project_id {
            let project = query_project(&conn, project_id)?
                .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
            context.project = Some(NamedRef::new("Project", project.id, project.name));
        }

        Ok(context)
    }

    /// The project whose root is the longest prefix of `path`.
    fn context_from_path(&self, path: &str) -> Result<LaunchContext> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, root_path FROM projects WHERE root_path IS NOT NULL")?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let target = Path::new(path);
        let best = projects
            .into_iter()
            .filter_map(|p| {
                let depth = p
                    .root_path
                    .as_deref()
                    .map(Path::new)
                    .filter(|root| target.starts_with(root))?
                    .components()
                    .count();
                Some((depth, p))
            })
            .max_by_key(|(depth, _)| *depth);

        match best {
            Some((_, project)) => Ok(LaunchContext {
                project: Some(NamedRef::new("Project", project.id, project.name)),
                ..Default::default()
            }),
            None => {
                tracing::debug!("No project root contains {}, using an empty context", path);
                Ok(LaunchContext::default())
            }
        }
    }
}

impl StructureCreator for Database {
    fn create_structure(&self, entity_type: &str, entity_id: i64, engine: &str) -> Result<()> {
        let Some(folder) = self.folder_for(entity_type, entity_id)? else {
            tracing::warn!(
                "{} {} has no project root, skipping folder creation for {}",
                entity_type,
                entity_id,
                engine
            );
            return Ok(());
        };

        std::fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create {}", folder.display()))?;
        tracing::debug!("Ensured folders {} for {}", folder.display(), engine);
        Ok(())
    }
}

fn query_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT id, name, root_path FROM projects WHERE id = ?",
            [id],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        root_path: row.get(2)?,
    })
}

fn query_entity(conn: &Connection, id: i64) -> Result<Option<Entity>> {
    let entity = conn
        .query_row(
            "SELECT id, entity_type, code, project_id FROM entities WHERE id = ?",
            [id],
            |row| {
                Ok(Entity {
                    id: row.get(0)?,
                    entity_type: row.get(1)?,
                    code: row.get(2)?,
                    project_id: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(entity)
}

fn query_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            "SELECT id, content, entity_id, project_id FROM tasks WHERE id = ?",
            [id],
            |row| {
                Ok(Task {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    entity_id: row.get(2)?,
                    project_id: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(task)
}

fn query_published_file(
    conn: &Connection,
    kind: PublishedFileType,
    id: i64,
) -> Result<Option<PublishedFile>> {
    let publish = conn
        .query_row(
            "SELECT id, code, local_path, url, task_id, linked_entity_type, linked_entity_id
             FROM published_files WHERE id = ? AND entity_type = ?",
            (id, kind.as_str()),
            |row| {
                let linked_type: Option<String> = row.get(5)?;
                let linked_id: Option<i64> = row.get(6)?;
                Ok(PublishedFile {
                    id: row.get(0)?,
                    kind,
                    code: row.get(1)?,
                    path: PathDescriptor {
                        local_path: row.get(2)?,
                        url: row.get(3)?,
                    },
                    task: row
                        .get::<_, Option<i64>>(4)?
                        .map(|id| EntityRef::new(TASK_ENTITY_TYPE, id)),
                    entity: linked_type.zip(linked_id).map(|(t, id)| EntityRef::new(t, id)),
                })
            },
        )
        .optional()?;
    Ok(publish)
}
