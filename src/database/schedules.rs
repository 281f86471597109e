use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::Table;
use crate::domain::ObservationSchedule;

pub struct SchedulesTable;

impl Table for SchedulesTable {
    type Record = ObservationSchedule;

    const NAME: &'static str = "observation_schedules";

    fn list(conn: &Connection) -> Result<Vec<ObservationSchedule>> {
        let sql = "SELECT id, project_id, analyst_id, title, scheduled_for, observer, notes FROM observation_schedules ORDER BY scheduled_for ASC";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], parse_schedule_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list observation schedules")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, schedule: &ObservationSchedule) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO observation_schedules (id, project_id, analyst_id, title, scheduled_for, observer, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

        conn.execute(
            sql,
            params![
                schedule.id,
                schedule.project_id,
                schedule.analyst_id,
                schedule.title,
                schedule.scheduled_for,
                schedule.observer,
                schedule.notes
            ],
        )
        .context("Failed to upsert observation schedule")?;

        Ok(())
    }
}

fn parse_schedule_row(row: &rusqlite::Row) -> rusqlite::Result<ObservationSchedule> {
    Ok(ObservationSchedule {
        id: row.get(0)?,
        project_id: row.get(1)?,
        analyst_id: row.get(2)?,
        title: row.get(3)?,
        scheduled_for: row.get(4)?,
        observer: row.get(5)?,
        notes: row.get(6)?,
    })
}
