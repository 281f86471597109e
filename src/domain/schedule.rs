use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::models::{ObservationSchedule, ScoutingGame};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const MATCH_DURATION_HOURS: i64 = 2;

/// Anything shown on the schedule pages: a local timestamp and an owning analyst
pub trait Scheduled {
    fn timestamp(&self) -> NaiveDateTime;
    fn owner_id(&self) -> &str;
}

impl Scheduled for ScoutingGame {
    fn timestamp(&self) -> NaiveDateTime {
        self.kickoff
    }

    fn owner_id(&self) -> &str {
        &self.analyst_id
    }
}

impl Scheduled for ObservationSchedule {
    fn timestamp(&self) -> NaiveDateTime {
        self.scheduled_for
    }

    fn owner_id(&self) -> &str {
        &self.analyst_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OwnerFilter {
    #[default]
    All,
    Analyst(String),
}

impl OwnerFilter {
    /// "all" (or nothing) is the sentinel for every analyst
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => OwnerFilter::All,
            Some(id) => OwnerFilter::Analyst(id.to_string()),
        }
    }

    pub fn matches(&self, owner_id: &str) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Analyst(id) => id == owner_id,
        }
    }
}

/// Optional inclusive day bounds picked in the date inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_explicit(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Concrete `[from, to]` bounds; `None` means open on that side
    pub fn bounds(&self, now: NaiveDateTime, window_days: i64) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        if self.is_explicit() {
            (self.start.map(start_of_day), self.end.map(end_of_day))
        } else {
            let today = now.date();
            let from = today - Duration::days(window_days);
            (Some(start_of_day(from)), Some(end_of_day(today)))
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime, now: NaiveDateTime, window_days: i64) -> bool {
        let (from, to) = self.bounds(now, window_days);
        from.is_none_or(|from| timestamp >= from) && to.is_none_or(|to| timestamp <= to)
    }
}

fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| start_of_day(day))
}

/// Owner + date window + ascending sort, as rendered on the schedule pages
pub fn schedule_view<T: Scheduled + Clone>(
    records: &[T],
    owner: &OwnerFilter,
    range: &DateRange,
    now: NaiveDateTime,
    window_days: i64,
) -> Vec<T> {
    let mut visible: Vec<T> = records
        .iter()
        .filter(|record| owner.matches(record.owner_id()))
        .filter(|record| range.contains(record.timestamp(), now, window_days))
        .cloned()
        .collect();
    sort_by_timestamp(&mut visible);
    visible
}

pub fn sort_by_timestamp<T: Scheduled>(records: &mut [T]) {
    records.sort_by_key(|record| record.timestamp());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Upcoming,
    InProgress,
    Finished,
}

impl GameStatus {
    pub fn at(kickoff: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self::with_duration(kickoff, now, Duration::hours(MATCH_DURATION_HOURS))
    }

    pub fn with_duration(kickoff: NaiveDateTime, now: NaiveDateTime, duration: Duration) -> Self {
        let elapsed = now - kickoff;
        if elapsed > duration {
            GameStatus::Finished
        } else if elapsed >= Duration::zero() {
            GameStatus::InProgress
        } else {
            GameStatus::Upcoming
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Upcoming => "Próximo",
            GameStatus::InProgress => "Em Andamento",
            GameStatus::Finished => "Finalizado",
        }
    }
}
