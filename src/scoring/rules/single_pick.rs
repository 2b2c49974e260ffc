use crate::predictions::PredictionPicks;
use crate::results::RaceOutcome;
use crate::scoring::{rule_priority, BreakdownEntry, OutcomeCategory, RuleContext, ScoreRule};

type PickSelector = fn(&PredictionPicks) -> Option<&str>;
type OutcomeSelector = fn(&RaceOutcome) -> Option<&str>;

/// Awards points when a single driver pick equals the recorded value.
/// Nothing matches when either side is absent.
pub struct SinglePickRule {
    category: OutcomeCategory,
    priority: u32,
    name: &'static str,
    pick: PickSelector,
    actual: OutcomeSelector,
}

fn picked_pole(picks: &PredictionPicks) -> Option<&str> {
    picks.pole_position.as_deref()
}

fn actual_pole(outcome: &RaceOutcome) -> Option<&str> {
    outcome.pole_position.as_deref()
}

fn picked_fastest_lap(picks: &PredictionPicks) -> Option<&str> {
    picks.fastest_lap.as_deref()
}

fn actual_fastest_lap(outcome: &RaceOutcome) -> Option<&str> {
    outcome.fastest_lap.as_deref()
}

fn picked_first_retirement(picks: &PredictionPicks) -> Option<&str> {
    picks.first_retirement.as_deref()
}

fn actual_first_retirement(outcome: &RaceOutcome) -> Option<&str> {
    outcome.first_retirement.as_deref()
}

impl SinglePickRule {
    pub fn pole_position() -> Self {
        Self {
            category: OutcomeCategory::PolePosition,
            priority: rule_priority::POLE_POSITION,
            name: "pole_position",
            pick: picked_pole,
            actual: actual_pole,
        }
    }

    pub fn fastest_lap() -> Self {
        Self {
            category: OutcomeCategory::FastestLap,
            priority: rule_priority::FASTEST_LAP,
            name: "fastest_lap",
            pick: picked_fastest_lap,
            actual: actual_fastest_lap,
        }
    }

    pub fn first_retirement() -> Self {
        Self {
            category: OutcomeCategory::FirstRetirement,
            priority: rule_priority::FIRST_RETIREMENT,
            name: "first_retirement",
            pick: picked_first_retirement,
            actual: actual_first_retirement,
        }
    }
}

impl ScoreRule for SinglePickRule {
    fn evaluate(
        &self,
        picks: &PredictionPicks,
        outcome: &RaceOutcome,
        context: &RuleContext,
    ) -> Vec<BreakdownEntry> {
        match ((self.pick)(picks), (self.actual)(outcome)) {
            (Some(picked), Some(actual)) if picked == actual => {
                vec![context.award(self.category, picked)]
            }
            _ => Vec::new(),
        }
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
