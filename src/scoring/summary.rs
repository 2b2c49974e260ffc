use std::fmt::Write;

use super::{OutcomeCategory, ScoreCard};
use crate::predictions::{HeadToHeadPick, PredictionPicks};
use crate::results::{MatchupOutcome, RaceOutcome};

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn write_matchup(
    summary: &mut String,
    label: &str,
    pick: Option<&HeadToHeadPick>,
    result: Option<&MatchupOutcome>,
) {
    let (Some(pick), Some(result)) = (pick, result) else {
        return;
    };
    let _ = writeln!(summary, "- {label}: {} vs {}", result.first, result.second);
    let _ = writeln!(summary, "  Predicted winner: {}", pick.winner);
    let _ = writeln!(
        summary,
        "  Actual winner: {}",
        result.winner.as_deref().unwrap_or("Tie (no winner)")
    );
}

/// Plain-text report of what a user picked, what happened and which picks
/// earned points
pub fn render_summary(
    username: &str,
    picks: &PredictionPicks,
    outcome: &RaceOutcome,
    card: &ScoreCard,
) -> String {
    let mut summary = String::new();

    let _ = writeln!(summary, "===== SCORE SUMMARY FOR {username} =====");
    let _ = writeln!(summary);
    let _ = writeln!(summary, "PREDICTIONS vs RESULTS:");
    let _ = writeln!(
        summary,
        "- Pole Position: {} (Actual: {})",
        or_dash(picks.pole_position.as_deref()),
        or_dash(outcome.pole_position.as_deref())
    );
    let _ = writeln!(
        summary,
        "- Podium: {} (Actual: {})",
        picks.podium.join(", "),
        outcome.podium.join(", ")
    );
    let _ = writeln!(
        summary,
        "- Fastest Lap: {} (Actual: {})",
        or_dash(picks.fastest_lap.as_deref()),
        or_dash(outcome.fastest_lap.as_deref())
    );
    let _ = writeln!(
        summary,
        "- First Retirement: {} (Actual: {})",
        or_dash(picks.first_retirement.as_deref()),
        or_dash(outcome.first_retirement.as_deref())
    );
    write_matchup(
        &mut summary,
        "Driver Head-to-Head",
        picks.driver_head_to_head.as_ref(),
        outcome.driver_head_to_head.as_ref(),
    );
    write_matchup(
        &mut summary,
        "Team Head-to-Head",
        picks.team_head_to_head.as_ref(),
        outcome.team_head_to_head.as_ref(),
    );

    let _ = writeln!(summary);
    let _ = writeln!(summary, "POINTS EARNED:");
    if card.breakdown.is_empty() {
        let _ = writeln!(summary, "- none");
    }

    let mut podium_drivers_listed = false;
    for entry in &card.breakdown {
        match entry.category {
            OutcomeCategory::PodiumDriver => {
                if !podium_drivers_listed {
                    let _ = writeln!(summary, "- {}:", entry.category.label());
                    podium_drivers_listed = true;
                }
                let _ = writeln!(summary, "  * {} (+{} pt)", entry.subject, entry.points);
            }
            OutcomeCategory::AllPodiumCorrectOrder | OutcomeCategory::AllPodiumWrongOrder => {
                let _ = writeln!(
                    summary,
                    "- {} (+{} pts)",
                    entry.category.label(),
                    entry.points
                );
            }
            _ => {
                let _ = writeln!(
                    summary,
                    "- {}: {} (+{} pts)",
                    entry.category.label(),
                    entry.subject,
                    entry.points
                );
            }
        }
    }

    let _ = writeln!(summary);
    let _ = write!(summary, "TOTAL SCORE: {} points", card.points);

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::BreakdownEntry;
    use chrono::Utc;

    fn outcome() -> RaceOutcome {
        RaceOutcome {
            race_id: "monaco".into(),
            podium: vec!["lec".into(), "pia".into(), "sai".into()],
            pole_position: Some("lec".into()),
            fastest_lap: None,
            first_retirement: Some("per".into()),
            classification: vec![],
            driver_head_to_head: Some(MatchupOutcome {
                first: "ham".into(),
                second: "rus".into(),
                winner: None,
            }),
            team_head_to_head: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn summary_lists_picks_awards_and_total() {
        let picks = PredictionPicks {
            podium: vec!["lec".into(), "sai".into(), "nor".into()],
            pole_position: Some("lec".into()),
            driver_head_to_head: Some(HeadToHeadPick {
                first: "ham".into(),
                second: "rus".into(),
                winner: "ham".into(),
            }),
            ..PredictionPicks::default()
        };
        let card = ScoreCard::from_breakdown(vec![
            BreakdownEntry::new(OutcomeCategory::PolePosition, 2, "lec"),
            BreakdownEntry::new(OutcomeCategory::Winner, 6, "lec"),
            BreakdownEntry::new(OutcomeCategory::PodiumDriver, 1, "sai"),
        ]);

        let summary = render_summary("alice", &picks, &outcome(), &card);

        assert!(summary.starts_with("===== SCORE SUMMARY FOR alice ====="));
        assert!(summary.contains("- Podium: lec, sai, nor (Actual: lec, pia, sai)"));
        assert!(summary.contains("- Fastest Lap: - (Actual: -)"));
        assert!(summary.contains("Actual winner: Tie (no winner)"));
        assert!(summary.contains("- Race Winner (P1): lec (+6 pts)"));
        assert!(summary.contains("  * sai (+1 pt)"));
        assert!(summary.ends_with("TOTAL SCORE: 9 points"));
    }

    #[test]
    fn empty_card_says_none() {
        let picks = PredictionPicks {
            podium: vec!["a".into(), "b".into(), "c".into()],
            ..PredictionPicks::default()
        };
        let summary = render_summary("bob", &picks, &outcome(), &ScoreCard::default());
        assert!(summary.contains("POINTS EARNED:\n- none"));
        assert!(summary.ends_with("TOTAL SCORE: 0 points"));
    }
}
