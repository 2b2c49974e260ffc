use std::collections::HashSet;

use crate::predictions::PredictionPicks;
use crate::results::RaceOutcome;
use crate::scoring::{rule_priority, BreakdownEntry, OutcomeCategory, RuleContext, ScoreRule};

/// Exact positions first, then drivers on the podium in another slot, then
/// at most one of the two full-podium bonuses.
#[derive(Debug, Default)]
pub struct PodiumRule;

impl PodiumRule {
    pub fn new() -> Self {
        Self
    }
}

impl ScoreRule for PodiumRule {
    fn evaluate(
        &self,
        picks: &PredictionPicks,
        outcome: &RaceOutcome,
        context: &RuleContext,
    ) -> Vec<BreakdownEntry> {
        let predicted = &picks.podium;
        let actual = &outcome.podium;
        let mut entries = Vec::new();

        let mut exact = 0;
        for (index, category) in OutcomeCategory::PODIUM_POSITIONS.iter().enumerate() {
            if let (Some(picked), Some(finished)) = (predicted.get(index), actual.get(index)) {
                if picked == finished {
                    exact += 1;
                    entries.push(context.award(*category, picked));
                }
            }
        }

        for (index, picked) in predicted.iter().enumerate() {
            if actual.get(index) == Some(picked) {
                continue;
            }
            if actual.contains(picked) {
                entries.push(context.award(OutcomeCategory::PodiumDriver, picked));
            }
        }

        let predicted_set: HashSet<&String> = predicted.iter().collect();
        let actual_set: HashSet<&String> = actual.iter().collect();
        if predicted.len() == 3 && actual.len() == 3 && predicted_set == actual_set {
            let bonus = if exact == 3 {
                OutcomeCategory::AllPodiumCorrectOrder
            } else {
                OutcomeCategory::AllPodiumWrongOrder
            };
            entries.push(context.award(bonus, &predicted.join(", ")));
        }

        entries
    }

    fn priority(&self) -> u32 {
        rule_priority::PODIUM
    }

    fn name(&self) -> &'static str {
        "podium"
    }
}
