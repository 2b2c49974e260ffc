pub mod engine;
mod errors;
mod handlers;
pub mod models;
pub mod point_schedule;
pub mod rules;
pub mod service;
pub mod summary;
pub mod sweep_task;
pub mod types;

pub use engine::ScoringEngine;
pub use errors::ScoringError;
pub use handlers::{get_race_scores, process_race_scores, recompute_user_totals};
pub use models::*;
pub use point_schedule::PointSchedule;
pub use service::ScoringService;
pub use summary::render_summary;

use crate::predictions::PredictionPicks;
use crate::results::RaceOutcome;

/// Priority constants for score rules.
/// Lower values run first, which fixes the order of breakdown entries.
pub mod rule_priority {
    pub const POLE_POSITION: u32 = 100;
    pub const PODIUM: u32 = 200;
    pub const FASTEST_LAP: u32 = 300;
    pub const FIRST_RETIREMENT: u32 = 400;
    pub const DRIVER_HEAD_TO_HEAD: u32 = 500;
    pub const TEAM_HEAD_TO_HEAD: u32 = 600;
}

/// One independent way of earning points. Rules never see each other's
/// output; each returns the entries it awards.
pub trait ScoreRule: Send + Sync {
    fn evaluate(
        &self,
        picks: &PredictionPicks,
        outcome: &RaceOutcome,
        context: &RuleContext,
    ) -> Vec<BreakdownEntry>;

    fn priority(&self) -> u32;

    fn name(&self) -> &'static str;
}

pub struct RuleContext<'a> {
    pub schedule: &'a PointSchedule,
}

impl<'a> RuleContext<'a> {
    pub fn new(schedule: &'a PointSchedule) -> Self {
        Self { schedule }
    }

    pub fn award(&self, category: OutcomeCategory, subject: &str) -> BreakdownEntry {
        BreakdownEntry::new(category, self.schedule.points_for(category), subject)
    }
}
