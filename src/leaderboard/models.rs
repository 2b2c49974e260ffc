use serde::{Deserialize, Serialize};

/// Per-user aggregate across all scored races
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTotals {
    pub user_id: String,
    pub username: String,
    pub total_points: i64,
    /// Number of breakdown entries awarded across all races
    pub correct_predictions: i64,
}

impl UserTotals {
    pub fn zero(user_id: &str, username: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub total_points: i64,
    pub correct_predictions: i64,
}

/// Orders totals best first. Ties on points fall back to correct picks, then
/// username so the listing is stable.
pub fn sort_standings(totals: &mut [UserTotals]) {
    totals.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(b.correct_predictions.cmp(&a.correct_predictions))
            .then(a.username.cmp(&b.username))
    });
}

/// Assigns competition ranks (1, 2, 2, 4) to already sorted totals
pub fn rank_standings(totals: Vec<UserTotals>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(totals.len());

    for (index, user) in totals.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(previous) if previous.total_points == user.total_points => previous.rank,
            _ => index as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            rank,
            user_id: user.user_id,
            username: user.username,
            total_points: user.total_points,
            correct_predictions: user.correct_predictions,
        });
    }

    entries
}
