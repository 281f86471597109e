use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::Table;
use crate::domain::ScoutingGame;

pub struct GamesTable;

impl Table for GamesTable {
    type Record = ScoutingGame;

    const NAME: &'static str = "scouting_games";

    fn list(conn: &Connection) -> Result<Vec<ScoutingGame>> {
        let sql = "SELECT id, title, competition, kickoff, analyst_id, observer, venue FROM scouting_games ORDER BY kickoff ASC";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], parse_game_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list scouting games")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, game: &ScoutingGame) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO scouting_games (id, title, competition, kickoff, analyst_id, observer, venue) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

        conn.execute(
            sql,
            params![
                game.id,
                game.title,
                game.competition,
                game.kickoff,
                game.analyst_id,
                game.observer,
                game.venue
            ],
        )
        .context("Failed to upsert scouting game")?;

        Ok(())
    }
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<ScoutingGame> {
    Ok(ScoutingGame {
        id: row.get(0)?,
        title: row.get(1)?,
        competition: row.get(2)?,
        kickoff: row.get(3)?,
        analyst_id: row.get(4)?,
        observer: row.get(5)?,
        venue: row.get(6)?,
    })
}
