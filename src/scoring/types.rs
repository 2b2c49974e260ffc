use serde::Deserialize;

/// Query string for POST /races/:race_id/scores
#[derive(Debug, Default, Deserialize)]
pub struct ProcessScoresQuery {
    #[serde(default)]
    pub force: bool,
}
