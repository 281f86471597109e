use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::models::{Foot, Player, Position, Recommendation};

pub const DEFAULT_MIN_AGE: u32 = 0;
pub const DEFAULT_MAX_AGE: u32 = 60;

/// Roster filter as chosen in the dashboard controls.
///
/// Every set-valued field treats the empty set as "no constraint". Values
/// inside one field are OR-ed, fields are AND-ed. An inverted age range is
/// accepted and simply matches nobody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search: String,
    pub positions: BTreeSet<Position>,
    pub min_age: u32,
    pub max_age: u32,
    pub recommendations: BTreeSet<Recommendation>,
    pub competitions: BTreeSet<String>,
    pub scout_years: BTreeSet<i32>,
    pub feet: BTreeSet<Foot>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_age_range(DEFAULT_MIN_AGE, DEFAULT_MAX_AGE)
    }
}

impl FilterState {
    pub fn with_age_range(min_age: u32, max_age: u32) -> Self {
        Self {
            search: String::new(),
            positions: BTreeSet::new(),
            min_age,
            max_age,
            recommendations: BTreeSet::new(),
            competitions: BTreeSet::new(),
            scout_years: BTreeSet::new(),
            feet: BTreeSet::new(),
        }
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.matches_search(player)
            && self.matches_position(player)
            && self.matches_age(player)
            && allows(&self.recommendations, &player.recommendation)
            && allows(&self.competitions, &player.competition)
            && allows(&self.scout_years, &player.scout_year)
            && allows(&self.feet, &player.foot)
    }

    fn matches_search(&self, player: &Player) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        player.name.to_lowercase().contains(&needle) || player.club.to_lowercase().contains(&needle)
    }

    fn matches_position(&self, player: &Player) -> bool {
        if self.positions.is_empty() {
            return true;
        }
        player
            .primary_position()
            .is_some_and(|position| self.positions.contains(&position))
    }

    fn matches_age(&self, player: &Player) -> bool {
        player
            .age
            .is_some_and(|age| self.min_age <= age && age <= self.max_age)
    }
}

fn allows<T: Ord>(allowed: &BTreeSet<T>, value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// Visible subset of `players`, in input order
pub fn filter(players: &[Player], state: &FilterState) -> Vec<Player> {
    players
        .iter()
        .filter(|player| state.matches(player))
        .cloned()
        .collect()
}

/// Distinct non-empty competitions, sorted
pub fn competitions(players: &[Player]) -> Vec<String> {
    players
        .iter()
        .map(|player| player.competition.as_str())
        .filter(|competition| !competition.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Parse comma-separated or repeated filter values, e.g. `ATA,MEI`
pub fn parse_codes<'a, T, I>(values: I) -> anyhow::Result<BTreeSet<T>>
where
    T: FromStr + Ord,
    anyhow::Error: From<T::Err>,
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| T::from_str(value).map_err(anyhow::Error::from))
        .collect()
}
