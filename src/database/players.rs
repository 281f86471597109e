use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::columns::{enum_column, json_column, to_json};
use super::Table;
use crate::domain::Player;

const COLUMNS: &str = "id, name, club, nationality, competition, positions, foot, height_cm, birth_date, age, attributes, recommendation, scout_year, games_watched, ai_context, video_url, stats_url, agent, contact, created_at";

pub struct PlayersTable;

impl Table for PlayersTable {
    type Record = Player;

    const NAME: &'static str = "players";

    fn list(conn: &Connection) -> Result<Vec<Player>> {
        let sql = format!("SELECT {} FROM players ORDER BY created_at DESC", COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], parse_player_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list players")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, player: &Player) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO players ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            COLUMNS
        );

        conn.execute(
            &sql,
            params![
                player.id,
                player.name,
                player.club,
                player.nationality,
                player.competition,
                to_json(&player.positions)?,
                player.foot.as_str(),
                player.height_cm,
                player.birth_date,
                player.age,
                to_json(&player.attributes)?,
                player.recommendation.as_str(),
                player.scout_year,
                player.games_watched,
                player.ai_context,
                player.video_url,
                player.stats_url,
                player.agent,
                player.contact,
                player.created_at,
            ],
        )
        .with_context(|| format!("Failed to upsert player {}", player.id))?;

        Ok(())
    }
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        club: row.get(2)?,
        nationality: row.get(3)?,
        competition: row.get(4)?,
        positions: json_column(row, 5)?,
        foot: enum_column(row, 6)?,
        height_cm: row.get(7)?,
        birth_date: row.get(8)?,
        age: row.get(9)?,
        attributes: json_column(row, 10)?,
        recommendation: enum_column(row, 11)?,
        scout_year: row.get(12)?,
        games_watched: row.get(13)?,
        ai_context: row.get(14)?,
        video_url: row.get(15)?,
        stats_url: row.get(16)?,
        agent: row.get(17)?,
        contact: row.get(18)?,
        created_at: row.get(19)?,
    })
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Player>> {
    let sql = format!("SELECT {} FROM players WHERE id = ?1", COLUMNS);

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

/// Upsert every player in one transaction; either all land or none do
pub fn upsert_all(conn: &mut Connection, players: &[Player]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to start import transaction")?;
    for player in players {
        PlayersTable::upsert(&tx, player)?;
    }
    tx.commit().context("Failed to commit player import")?;
    Ok(players.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::ensure_schema;
    use crate::domain::models::{fixtures, Position};
    use chrono::{Duration, Utc};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let conn = conn();
        let mut player = fixtures::player("p1", "Ana", "X", Position::Ata, "2009-01-01");
        player.positions = vec![Position::Ata, Position::Pd];
        player.agent = Some("Agência".to_string());
        PlayersTable::upsert(&conn, &player).unwrap();

        player.club = "Y".to_string();
        player.agent = None;
        PlayersTable::upsert(&conn, &player).unwrap();

        let stored = find_by_id(&conn, "p1").unwrap().unwrap();
        assert_eq!(stored.club, "Y");
        assert_eq!(stored.agent, None);
        assert_eq!(stored.positions, vec![Position::Ata, Position::Pd]);
        assert_eq!(PlayersTable::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_list_newest_first_and_delete() {
        let conn = conn();
        let mut older = fixtures::player("old", "Ana", "X", Position::Ata, "2009-01-01");
        older.created_at = Utc::now() - Duration::days(3);
        let newer = fixtures::player("new", "Bia", "X", Position::Ata, "2009-01-01");
        PlayersTable::upsert(&conn, &older).unwrap();
        PlayersTable::upsert(&conn, &newer).unwrap();

        let ids: Vec<_> = PlayersTable::list(&conn).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["new", "old"]);

        PlayersTable::delete(&conn, "new").unwrap();
        assert!(find_by_id(&conn, "new").unwrap().is_none());
    }
}
