use std::sync::Arc;

use super::{
    rules::default_rules, PointSchedule, RuleContext, ScoreCard, ScoreRule, ScoringError,
};
use crate::predictions::PredictionPicks;
use crate::results::RaceOutcome;

/// Pure scorer: one prediction against one outcome. Holds no state between
/// calls, so the same inputs always give the same card.
pub struct ScoringEngine {
    schedule: PointSchedule,
    rules: Vec<Arc<dyn ScoreRule>>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(PointSchedule::default())
    }
}

impl ScoringEngine {
    pub fn new(schedule: PointSchedule) -> Self {
        Self::builder(schedule).build()
    }

    pub fn builder(schedule: PointSchedule) -> ScoringEngineBuilder {
        ScoringEngineBuilder::new(schedule)
    }

    pub fn schedule(&self) -> &PointSchedule {
        &self.schedule
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn score(
        &self,
        prediction_id: &str,
        picks: &PredictionPicks,
        outcome: &RaceOutcome,
    ) -> Result<ScoreCard, ScoringError> {
        picks
            .validate()
            .map_err(|reason| ScoringError::MalformedPrediction {
                prediction_id: prediction_id.to_string(),
                reason,
            })?;

        let context = RuleContext::new(&self.schedule);
        let breakdown = self
            .rules
            .iter()
            .flat_map(|rule| rule.evaluate(picks, outcome, &context))
            .collect();

        Ok(ScoreCard::from_breakdown(breakdown))
    }
}

pub struct ScoringEngineBuilder {
    schedule: PointSchedule,
    rules: Vec<Arc<dyn ScoreRule>>,
}

impl ScoringEngineBuilder {
    fn new(schedule: PointSchedule) -> Self {
        Self {
            schedule,
            rules: default_rules(),
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn ScoreRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(mut self) -> ScoringEngine {
        self.rules.sort_by_key(|rule| rule.priority());
        ScoringEngine {
            schedule: self.schedule,
            rules: self.rules,
        }
    }
}
