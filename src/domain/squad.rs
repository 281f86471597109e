use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::models::{Player, PlayerId};
use crate::errors::ValidationError;

pub const MAX_CANDIDATES_PER_SLOT: usize = 4;

/// Pitch positions of the shadow-team formation (4-3-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Gol,
    Ld,
    Zag1,
    Zag2,
    Le,
    Vol,
    Mc1,
    Mc2,
    Pd,
    Pe,
    Ata,
}

impl Slot {
    pub const ALL: [Slot; 11] = [
        Slot::Gol,
        Slot::Ld,
        Slot::Zag1,
        Slot::Zag2,
        Slot::Le,
        Slot::Vol,
        Slot::Mc1,
        Slot::Mc2,
        Slot::Pd,
        Slot::Pe,
        Slot::Ata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Gol => "gol",
            Slot::Ld => "ld",
            Slot::Zag1 => "zag1",
            Slot::Zag2 => "zag2",
            Slot::Le => "le",
            Slot::Vol => "vol",
            Slot::Mc1 => "mc1",
            Slot::Mc2 => "mc2",
            Slot::Pd => "pd",
            Slot::Pe => "pe",
            Slot::Ata => "ata",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown slot: {}", s))
    }
}

/// Ranked candidates per formation slot, index 0 being the first choice.
///
/// A player id appears at most once per slot but may sit in several slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShadowSquad {
    slots: BTreeMap<Slot, Vec<PlayerId>>,
}

impl ShadowSquad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self, slot: Slot) -> &[PlayerId] {
        self.slots.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, slot: Slot, player_id: &str) -> bool {
        self.candidates(slot).iter().any(|id| id == player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Vec::is_empty)
    }

    /// Append as lowest preference; already present is a no-op
    pub fn add(&mut self, slot: Slot, player_id: &str) -> Result<(), ValidationError> {
        if self.contains(slot, player_id) {
            return Ok(());
        }
        let candidates = self.slots.entry(slot).or_default();
        if candidates.len() >= MAX_CANDIDATES_PER_SLOT {
            return Err(ValidationError::SlotFull {
                slot,
                capacity: MAX_CANDIDATES_PER_SLOT,
            });
        }
        candidates.push(player_id.to_string());
        Ok(())
    }

    /// Returns whether anything was removed
    pub fn remove(&mut self, slot: Slot, player_id: &str) -> bool {
        let Some(candidates) = self.slots.get_mut(&slot) else {
            return false;
        };
        let before = candidates.len();
        candidates.retain(|id| id != player_id);
        let removed = candidates.len() != before;
        if candidates.is_empty() {
            self.slots.remove(&slot);
        }
        removed
    }

    /// Take the candidate at `from` and reinsert it at `to`.
    ///
    /// Out-of-bounds indices leave the squad untouched and return false.
    pub fn move_candidate(&mut self, slot: Slot, from: usize, to: usize) -> bool {
        let Some(candidates) = self.slots.get_mut(&slot) else {
            return false;
        };
        if from >= candidates.len() || to >= candidates.len() {
            return false;
        }
        let id = candidates.remove(from);
        candidates.insert(to, id);
        from != to
    }

    pub fn move_up(&mut self, slot: Slot, index: usize) -> bool {
        match index.checked_sub(1) {
            Some(to) => self.move_candidate(slot, index, to),
            None => false,
        }
    }

    pub fn move_down(&mut self, slot: Slot, index: usize) -> bool {
        self.move_candidate(slot, index, index + 1)
    }

    /// Make the candidate at `index` the first choice
    pub fn promote(&mut self, slot: Slot, index: usize) -> bool {
        self.move_candidate(slot, index, 0)
    }

    /// Candidates resolved to player records in rank order; ids of deleted players are skipped
    pub fn players_in_slot<'a>(&self, slot: Slot, players: &'a [Player]) -> Vec<&'a Player> {
        self.candidates(slot)
            .iter()
            .filter_map(|id| players.iter().find(|player| &player.id == id))
            .collect()
    }

    /// Players not yet in `slot` whose name, primary position or club contains `text`
    pub fn search_candidates<'a>(&self, slot: Slot, text: &str, players: &'a [Player]) -> Vec<&'a Player> {
        let needle = text.trim().to_lowercase();
        players
            .iter()
            .filter(|player| !self.contains(slot, &player.id))
            .filter(|player| matches_candidate_search(player, &needle))
            .collect()
    }
}

fn matches_candidate_search(player: &Player, needle: &str) -> bool {
    let position = player
        .primary_position()
        .map(|p| p.as_str().to_lowercase())
        .unwrap_or_default();

    player.name.to_lowercase().contains(needle)
        || position.contains(needle)
        || player.club.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{fixtures, Position};
    use proptest::prelude::*;

    fn squad_with(slot: Slot, ids: &[&str]) -> ShadowSquad {
        let mut squad = ShadowSquad::new();
        for id in ids {
            squad.add(slot, id).unwrap();
        }
        squad
    }

    #[test]
    fn test_promote_scenario() {
        let mut squad = ShadowSquad::new();
        squad.add(Slot::Gol, "p1").unwrap();
        squad.add(Slot::Gol, "p2").unwrap();

        assert!(squad.promote(Slot::Gol, 1));

        assert_eq!(squad.candidates(Slot::Gol), ["p2", "p1"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut squad = squad_with(Slot::Ata, &["p1"]);

        squad.add(Slot::Ata, "p1").unwrap();

        assert_eq!(squad.candidates(Slot::Ata).len(), 1);
    }

    #[test]
    fn test_fifth_candidate_is_rejected() {
        let mut squad = squad_with(Slot::Ata, &["p1", "p2", "p3", "p4"]);

        let result = squad.add(Slot::Ata, "p5");

        assert_eq!(
            result,
            Err(ValidationError::SlotFull { slot: Slot::Ata, capacity: 4 })
        );
        assert_eq!(squad.candidates(Slot::Ata), ["p1", "p2", "p3", "p4"]);
        // Re-adding a present id on a full slot is still a no-op, not an error
        assert!(squad.add(Slot::Ata, "p2").is_ok());
    }

    #[test]
    fn test_same_player_in_several_slots() {
        let mut squad = squad_with(Slot::Pd, &["p1"]);
        squad.add(Slot::Pe, "p1").unwrap();

        assert!(squad.contains(Slot::Pd, "p1"));
        assert!(squad.contains(Slot::Pe, "p1"));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut squad = squad_with(Slot::Vol, &["p1", "p2", "p3"]);

        assert!(squad.remove(Slot::Vol, "p2"));
        assert!(!squad.remove(Slot::Vol, "missing"));

        assert_eq!(squad.candidates(Slot::Vol), ["p1", "p3"]);
    }

    #[test]
    fn test_move_out_of_bounds_is_noop() {
        let mut squad = squad_with(Slot::Mc1, &["p1", "p2"]);

        assert!(!squad.move_candidate(Slot::Mc1, 0, 2));
        assert!(!squad.move_down(Slot::Mc1, 1));
        assert!(!squad.move_up(Slot::Mc1, 0));
        assert!(!squad.promote(Slot::Ata, 0));

        assert_eq!(squad.candidates(Slot::Mc1), ["p1", "p2"]);
    }

    #[test]
    fn test_single_step_moves() {
        let mut squad = squad_with(Slot::Le, &["p1", "p2", "p3"]);

        assert!(squad.move_down(Slot::Le, 0));
        assert_eq!(squad.candidates(Slot::Le), ["p2", "p1", "p3"]);

        assert!(squad.move_up(Slot::Le, 2));
        assert_eq!(squad.candidates(Slot::Le), ["p2", "p3", "p1"]);
    }

    #[test]
    fn test_players_in_slot_drops_dangling_ids() {
        let players = vec![
            fixtures::player("p1", "Ana", "X", Position::Gol, "2000-01-01"),
            fixtures::player("p3", "Caio", "Y", Position::Gol, "2000-01-01"),
        ];
        let squad = squad_with(Slot::Gol, &["p3", "deleted", "p1"]);

        let names: Vec<_> = squad
            .players_in_slot(Slot::Gol, &players)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();

        assert_eq!(names, vec!["Caio", "Ana"]);
    }

    #[test]
    fn test_search_candidates_excludes_slot_members() {
        let players = vec![
            fixtures::player("p1", "Ana", "Bahia", Position::Ata, "2000-01-01"),
            fixtures::player("p2", "Bruno", "Santos", Position::Ata, "2000-01-01"),
            fixtures::player("p3", "Caio", "Inter", Position::Zag, "2000-01-01"),
        ];
        let squad = squad_with(Slot::Ata, &["p1"]);

        let by_position: Vec<_> = squad
            .search_candidates(Slot::Ata, "ata", &players)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(by_position, vec!["p2"]);

        let by_club: Vec<_> = squad
            .search_candidates(Slot::Ata, "INTER", &players)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(by_club, vec!["p3"]);
    }

    #[test]
    fn test_serializes_as_slot_map() {
        let squad = squad_with(Slot::Gol, &["p1"]);

        let json = serde_json::to_string(&squad).unwrap();

        assert_eq!(json, r#"{"gol":["p1"]}"#);
    }

    proptest! {
        #[test]
        fn prop_promote_shifts_higher_ranked_down(len in 1usize..=4, pick in 0usize..4) {
            let k = pick % len;
            let ids: Vec<String> = (0..len).map(|i| format!("p{}", i)).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut squad = squad_with(Slot::Zag1, &refs);

            squad.promote(Slot::Zag1, k);
            let after = squad.candidates(Slot::Zag1);

            prop_assert_eq!(&after[0], &ids[k]);
            prop_assert_eq!(&after[1..=k], &ids[0..k]);
            prop_assert_eq!(&after[k + 1..], &ids[k + 1..]);
        }

        #[test]
        fn prop_capacity_never_exceeded(ids in prop::collection::vec(0u8..10, 0..20)) {
            let mut squad = ShadowSquad::new();
            for id in ids {
                let _ = squad.add(Slot::Pd, &format!("p{}", id));
            }
            let candidates = squad.candidates(Slot::Pd);
            prop_assert!(candidates.len() <= MAX_CANDIDATES_PER_SLOT);
            let mut unique = candidates.to_vec();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), candidates.len());
        }
    }
}
