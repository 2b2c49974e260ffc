use chrono::Utc;

use super::models::{DriverClassification, RaceOutcome};

/// Top three finishers ordered by position
pub fn podium_from(classification: &[DriverClassification]) -> Vec<String> {
    let mut top_three: Vec<(u32, &str)> = classification
        .iter()
        .filter_map(|row| match row.position {
            Some(position) if (1..=3).contains(&position) => {
                Some((position, row.driver_id.as_str()))
            }
            _ => None,
        })
        .collect();

    top_three.sort_by_key(|(position, _)| *position);
    top_three
        .into_iter()
        .map(|(_, driver_id)| driver_id.to_string())
        .collect()
}

/// Driver who set the rank-1 fastest lap
pub fn fastest_lap_from(classification: &[DriverClassification]) -> Option<String> {
    classification
        .iter()
        .find(|row| row.fastest_lap_rank == Some(1))
        .map(|row| row.driver_id.clone())
}

/// The last-placed entrant with a recorded position who wasn't disqualified.
///
/// Ties on position keep the first row seen.
pub fn first_retirement_from(classification: &[DriverClassification]) -> Option<String> {
    let mut last_placed: Option<(u32, &DriverClassification)> = None;

    for row in classification
        .iter()
        .filter(|row| !row.status.is_disqualified())
    {
        let Some(position) = row.position else {
            continue;
        };

        match last_placed {
            Some((highest, _)) if position <= highest => {}
            _ => last_placed = Some((position, row)),
        }
    }

    last_placed.map(|(_, row)| row.driver_id.clone())
}

impl RaceOutcome {
    /// Builds an outcome from the raw classification. Head-to-head fields
    /// start empty; the resolver fills them in.
    pub fn from_classification(
        race_id: &str,
        classification: Vec<DriverClassification>,
        pole_position: Option<String>,
    ) -> Self {
        Self {
            race_id: race_id.to_string(),
            podium: podium_from(&classification),
            pole_position,
            fastest_lap: fastest_lap_from(&classification),
            first_retirement: first_retirement_from(&classification),
            classification,
            driver_head_to_head: None,
            team_head_to_head: None,
            updated_at: Utc::now(),
        }
    }
}
