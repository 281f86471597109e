use chrono::{Datelike, NaiveDate};

use super::models::Player;

const BIRTH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y-%m-%dT%H:%M:%S%.fZ"];

/// Completed years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    BIRTH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Refresh the derived age; records with an unreadable or future birth date pass through untouched
pub fn derive_age(mut player: Player, today: NaiveDate) -> Player {
    let age = parse_birth_date(&player.birth_date).and_then(|birth| u32::try_from(age_on(birth, today)).ok());
    if let Some(age) = age {
        player.age = Some(age);
    }
    player
}

pub fn derive_ages(players: Vec<Player>, today: NaiveDate) -> Vec<Player> {
    players
        .into_iter()
        .map(|player| derive_age(player, today))
        .collect()
}
