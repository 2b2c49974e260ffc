mod head_to_head;
mod podium;
mod single_pick;

pub use head_to_head::HeadToHeadRule;
pub use podium::PodiumRule;
pub use single_pick::SinglePickRule;

use std::sync::Arc;

use super::ScoreRule;

/// The standard rule set, one rule per row of the point table
pub fn default_rules() -> Vec<Arc<dyn ScoreRule>> {
    vec![
        Arc::new(SinglePickRule::pole_position()),
        Arc::new(PodiumRule::new()),
        Arc::new(SinglePickRule::fastest_lap()),
        Arc::new(SinglePickRule::first_retirement()),
        Arc::new(HeadToHeadRule::drivers()),
        Arc::new(HeadToHeadRule::teams()),
    ]
}
