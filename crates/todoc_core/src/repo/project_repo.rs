//! Project repository over the seeded `project` table.
//!
//! # Invariants
//! - Inserts use the ignore-on-conflict policy; existing rows are kept.
//! - Listing is ordered by ascending id.

use crate::model::project::{ArgbColor, Project, ProjectId};
use crate::repo::task_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for project reads and seeding.
pub trait ProjectRepository {
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Inserts projects, skipping ids that already exist. Returns rows added.
    fn insert_projects(&self, projects: &[Project]) -> RepoResult<usize>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        super::ensure_connection_ready(conn, &["project"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM project ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, color FROM project WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, ProjectId>("id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, i64>("color")?,
                    ))
                },
            )
            .optional()?;
        project
            .map(|(id, name, color)| build_project(id, name, color))
            .transpose()
    }

    fn insert_projects(&self, projects: &[Project]) -> RepoResult<usize> {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO project (id, name, color) VALUES (?1, ?2, ?3);")?;
        let mut inserted = 0;
        for project in projects {
            inserted += stmt.execute(params![
                project.id,
                project.name.as_str(),
                project.color.argb()
            ])?;
        }
        Ok(inserted)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    build_project(row.get("id")?, row.get("name")?, row.get("color")?)
}

fn build_project(id: ProjectId, name: String, color: i64) -> RepoResult<Project> {
    let color = u32::try_from(color).map_err(|_| {
        RepoError::InvalidData(format!("invalid color value `{color}` in project.color"))
    })?;
    if name.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name for project {id} in project.name"
        )));
    }
    Ok(Project::new(id, name, ArgbColor::from_argb(color)))
}
