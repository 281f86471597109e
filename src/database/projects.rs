use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::Table;
use crate::domain::Project;

pub struct ProjectsTable;

impl Table for ProjectsTable {
    type Record = Project;

    const NAME: &'static str = "projects";

    fn list(conn: &Connection) -> Result<Vec<Project>> {
        let sql = "SELECT id, name, description FROM projects ORDER BY name ASC";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list projects")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, project: &Project) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO projects (id, name, description) VALUES (?1, ?2, ?3)";

        conn.execute(sql, params![project.id, project.name, project.description])
            .context("Failed to upsert project")?;

        Ok(())
    }
}
