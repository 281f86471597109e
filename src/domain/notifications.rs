use super::models::{WatchStatus, WatchlistItem};

/// Watchlist items still waiting on `viewer_id`
pub fn pending_for(items: &[WatchlistItem], viewer_id: &str) -> usize {
    items
        .iter()
        .filter(|item| item.assigned_analyst_id == viewer_id && item.status == WatchStatus::Pending)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, analyst: &str, status: WatchStatus) -> WatchlistItem {
        WatchlistItem {
            id: id.to_string(),
            player_id: "p1".to_string(),
            assigned_analyst_id: analyst.to_string(),
            requested_by: "admin".to_string(),
            status,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_counts_only_pending_items_for_viewer() {
        let items = vec![
            item("w1", "u1", WatchStatus::Pending),
            item("w2", "u1", WatchStatus::Viewed),
            item("w3", "u2", WatchStatus::Pending),
            item("w4", "u1", WatchStatus::Pending),
            item("w5", "u1", WatchStatus::Completed),
        ];

        assert_eq!(pending_for(&items, "u1"), 2);
        assert_eq!(pending_for(&items, "u2"), 1);
        assert_eq!(pending_for(&items, "nobody"), 0);
    }
}
