use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::Path;

use super::remote::RemoteStore;
use crate::domain::age::derive_ages;
use crate::domain::Player;
use crate::errors::AppError;

/// Parse and validate a JSON array of players; the first bad record rejects the file
pub fn parse_players(json: &str) -> Result<Vec<Player>, AppError> {
    let players: Vec<Player> =
        serde_json::from_str(json).map_err(|e| AppError::parse("player import", e))?;

    for (index, player) in players.iter().enumerate() {
        player
            .validate()
            .map_err(|e| AppError::parse("player import", format!("record {}: {}", index, e)))?;
    }

    Ok(players)
}

/// Import a players file in one transaction; nothing is written when any record is bad
pub fn import_players<P: AsRef<Path>>(path: P, store: &RemoteStore, today: NaiveDate) -> Result<usize, AppError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| AppError::parse(format!("import file {}", path.display()), e))?;

    let players = derive_ages(parse_players(&json)?, today);
    let count = store.upsert_players(&players)?;
    info!("Imported {} players from {}", count, path.display());

    Ok(count)
}
