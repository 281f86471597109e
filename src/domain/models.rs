use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

pub type PlayerId = String;
pub type UserId = String;

/// Pitch position codes used on player records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Gol,
    Ld,
    Zag,
    Le,
    Vol,
    Mc,
    Mei,
    Pd,
    Pe,
    Ata,
}

impl Position {
    pub const ALL: [Position; 10] = [
        Position::Gol,
        Position::Ld,
        Position::Zag,
        Position::Le,
        Position::Vol,
        Position::Mc,
        Position::Mei,
        Position::Pd,
        Position::Pe,
        Position::Ata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Gol => "GOL",
            Position::Ld => "LD",
            Position::Zag => "ZAG",
            Position::Le => "LE",
            Position::Vol => "VOL",
            Position::Mc => "MC",
            Position::Mei => "MEI",
            Position::Pd => "PD",
            Position::Pe => "PE",
            Position::Ata => "ATA",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown position: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Foot {
    Right,
    Left,
    Both,
}

impl Foot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Foot::Right => "right",
            Foot::Left => "left",
            Foot::Both => "both",
        }
    }
}

impl FromStr for Foot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "right" => Ok(Foot::Right),
            "left" => Ok(Foot::Left),
            "both" => Ok(Foot::Both),
            other => anyhow::bail!("Unknown foot: {}", other),
        }
    }
}

/// Scouting verdict attached to every player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Elite,
    LikelyStarter,
    Monitoring,
    Development,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Elite => "elite",
            Recommendation::LikelyStarter => "likely_starter",
            Recommendation::Monitoring => "monitoring",
            Recommendation::Development => "development",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Elite => "Elite",
            Recommendation::LikelyStarter => "Likely starter",
            Recommendation::Monitoring => "Monitoring",
            Recommendation::Development => "Development",
        }
    }
}

impl FromStr for Recommendation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "elite" => Ok(Recommendation::Elite),
            "likely_starter" => Ok(Recommendation::LikelyStarter),
            "monitoring" => Ok(Recommendation::Monitoring),
            "development" => Ok(Recommendation::Development),
            other => anyhow::bail!("Unknown recommendation: {}", other),
        }
    }
}

/// Ratings on a 1..=5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub pace: u8,
    pub shooting: u8,
    pub passing: u8,
    pub dribbling: u8,
    pub defending: u8,
    pub physical: u8,
}

impl Attributes {
    pub fn named(&self) -> [(&'static str, u8); 6] {
        [
            ("pace", self.pace),
            ("shooting", self.shooting),
            ("passing", self.passing),
            ("dribbling", self.dribbling),
            ("defending", self.defending),
            ("physical", self.physical),
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.named().into_iter().find(|(_, v)| !(1..=5).contains(v)) {
            Some((attribute, value)) => Err(ValidationError::InvalidRating { attribute, value }),
            None => Ok(()),
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            pace: 3,
            shooting: 3,
            passing: 3,
            dribbling: 3,
            defending: 3,
            physical: 3,
        }
    }
}

/// Scouted player record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default = "new_record_id")]
    pub id: PlayerId,
    pub name: String,
    pub club: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub competition: String,
    pub positions: Vec<Position>,
    pub foot: Foot,
    #[serde(default)]
    pub height_cm: Option<u16>,
    pub birth_date: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub attributes: Attributes,
    pub recommendation: Recommendation,
    pub scout_year: i32,
    #[serde(default)]
    pub games_watched: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// First listed position; the one filters and slot search look at
    pub fn primary_position(&self) -> Option<Position> {
        self.positions.first().copied()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.club.trim().is_empty() {
            return Err(ValidationError::MissingField("club"));
        }
        if self.birth_date.trim().is_empty() {
            return Err(ValidationError::MissingField("birthDate"));
        }
        if !(1..=2).contains(&self.positions.len()) {
            return Err(ValidationError::InvalidPositions(self.positions.len()));
        }
        self.attributes.validate()
    }
}

/// Generate an id the same way the editor form does for new players
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Scout,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Scout => "scout",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "scout" => Ok(Role::Scout),
            other => anyhow::bail!("Unknown role: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            other => anyhow::bail!("Unknown approval status: {}", other),
        }
    }
}

/// Dashboard account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Match an analyst is sent to watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingGame {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub competition: String,
    pub kickoff: NaiveDateTime,
    pub analyst_id: UserId,
    #[serde(default)]
    pub observer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

/// Observation trip planned for an external project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSchedule {
    pub id: String,
    pub project_id: String,
    pub analyst_id: UserId,
    pub title: String,
    pub scheduled_for: NaiveDateTime,
    #[serde(default)]
    pub observer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Pending,
    Viewed,
    Completed,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Pending => "pending",
            WatchStatus::Viewed => "viewed",
            WatchStatus::Completed => "completed",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WatchStatus::Pending),
            "viewed" => Ok(WatchStatus::Viewed),
            "completed" => Ok(WatchStatus::Completed),
            other => anyhow::bail!("Unknown watchlist status: {}", other),
        }
    }
}

/// Request for an analyst to take a look at a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub player_id: PlayerId,
    pub assigned_analyst_id: UserId,
    #[serde(default)]
    pub requested_by: UserId,
    pub status: WatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
