use std::cmp::Ordering;

use tracing::{debug, info};

use super::models::{DriverClassification, HeadToHeadConfig, Matchup, MatchupOutcome, RaceOutcome};

/// Result of resolving a single matchup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchupResolution {
    Winner(String),
    Tie,
    /// A participant has no race data at all; nothing can be decided yet
    Incomplete,
}

/// Position a driver finished in, if they were running at the flag
fn running_position(classification: &[DriverClassification], driver_id: &str) -> Option<u32> {
    classification
        .iter()
        .find(|row| row.driver_id == driver_id)
        .filter(|row| row.status.is_running())
        .and_then(|row| row.position)
}

/// Mean recorded position of a team's cars, rounded to two decimals.
///
/// Every car with a position counts, whatever its status.
pub fn team_average_position(
    classification: &[DriverClassification],
    constructor_id: &str,
) -> Option<f64> {
    let positions: Vec<u32> = classification
        .iter()
        .filter(|row| row.constructor_id == constructor_id)
        .filter_map(|row| row.position)
        .collect();

    if positions.is_empty() {
        return None;
    }

    let total: u32 = positions.iter().sum();
    let average = f64::from(total) / positions.len() as f64;
    Some((average * 100.0).round() / 100.0)
}

/// Lower value wins; a defined value beats an undefined one.
fn decide<T: PartialOrd>(matchup: &Matchup, first: Option<T>, second: Option<T>) -> MatchupResolution {
    match (first, second) {
        (Some(a), Some(b)) => match a.partial_cmp(&b) {
            Some(Ordering::Less) => MatchupResolution::Winner(matchup.first.clone()),
            Some(Ordering::Greater) => MatchupResolution::Winner(matchup.second.clone()),
            _ => MatchupResolution::Tie,
        },
        (Some(_), None) => MatchupResolution::Winner(matchup.first.clone()),
        (None, Some(_)) => MatchupResolution::Winner(matchup.second.clone()),
        (None, None) => MatchupResolution::Tie,
    }
}

pub fn resolve_driver_matchup(
    matchup: &Matchup,
    classification: &[DriverClassification],
) -> MatchupResolution {
    let has_data = |driver_id: &str| classification.iter().any(|row| row.driver_id == driver_id);
    if !has_data(&matchup.first) || !has_data(&matchup.second) {
        return MatchupResolution::Incomplete;
    }

    let first = running_position(classification, &matchup.first);
    let second = running_position(classification, &matchup.second);
    debug!(
        first = %matchup.first,
        first_position = ?first,
        second = %matchup.second,
        second_position = ?second,
        "Resolving driver head-to-head"
    );

    decide(matchup, first, second)
}

pub fn resolve_team_matchup(
    matchup: &Matchup,
    classification: &[DriverClassification],
) -> MatchupResolution {
    let has_data = |team_id: &str| {
        classification
            .iter()
            .any(|row| row.constructor_id == team_id)
    };
    if !has_data(&matchup.first) || !has_data(&matchup.second) {
        return MatchupResolution::Incomplete;
    }

    let first = team_average_position(classification, &matchup.first);
    let second = team_average_position(classification, &matchup.second);
    debug!(
        first = %matchup.first,
        first_average = ?first,
        second = %matchup.second,
        second_average = ?second,
        "Resolving team head-to-head"
    );

    decide(matchup, first, second)
}

/// Turns a fresh resolution into the stored outcome, falling back to the
/// previously stored result only when the new inputs are incomplete.
/// Incomplete inputs with nothing to fall back on leave no result at all.
fn rebuild(
    matchup: &Matchup,
    resolution: MatchupResolution,
    previous: Option<&MatchupOutcome>,
) -> Option<MatchupOutcome> {
    let winner = match resolution {
        MatchupResolution::Winner(id) => Some(id),
        MatchupResolution::Tie => None,
        MatchupResolution::Incomplete => {
            return previous
                .filter(|outcome| outcome.same_pairing(matchup))
                .cloned();
        }
    };

    Some(MatchupOutcome {
        first: matchup.first.clone(),
        second: matchup.second.clone(),
        winner,
    })
}

/// Rebuilds both head-to-head fields of `outcome` from its classification.
///
/// A matchup that isn't configured is cleared.
pub fn resolve_head_to_head(config: &HeadToHeadConfig, outcome: &mut RaceOutcome) {
    outcome.driver_head_to_head = config.drivers.as_ref().and_then(|matchup| {
        let resolution = resolve_driver_matchup(matchup, &outcome.classification);
        rebuild(matchup, resolution, outcome.driver_head_to_head.as_ref())
    });

    outcome.team_head_to_head = config.teams.as_ref().and_then(|matchup| {
        let resolution = resolve_team_matchup(matchup, &outcome.classification);
        rebuild(matchup, resolution, outcome.team_head_to_head.as_ref())
    });

    info!(
        race_id = %outcome.race_id,
        driver_winner = ?outcome.driver_head_to_head.as_ref().map(|m| m.winner.as_deref()),
        team_winner = ?outcome.team_head_to_head.as_ref().map(|m| m.winner.as_deref()),
        "Head-to-head resolved"
    );
}
