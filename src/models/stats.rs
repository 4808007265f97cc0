use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Quality label attached to an item after cohort analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClassification {
    TooDifficult,
    TooEasy,
    Miskeyed,
    PoorDiscrimination,
    Good,
}

impl fmt::Display for ItemClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemClassification::TooDifficult => "TOO DIFFICULT",
            ItemClassification::TooEasy => "TOO EASY",
            ItemClassification::Miskeyed => "MISKEYED? (Negative)",
            ItemClassification::PoorDiscrimination => "POOR DISCRIMINATION",
            ItemClassification::Good => "GOOD",
        };
        write!(f, "{}", label)
    }
}

/// Per-item cohort statistics. Derived, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStatistic {
    pub question_id: Uuid,
    pub attempts: usize,
    pub correct: usize,
    /// p-value: fraction of the cohort answering correctly
    pub difficulty: f64,
    /// Difference in correct-rate between upper and lower score groups
    pub discrimination: f64,
    pub classification: ItemClassification,
    /// Raw response frequencies, keyed by the rendered answer
    pub distractors: HashMap<String, usize>,
}

/// Per-topic earned/possible aggregate, cohort- or single-student-scoped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPerformance {
    pub topic: String,
    pub earned: u32,
    pub possible: u32,
    /// Rounded percentage; 0 when possible is 0
    pub percentage: u32,
}

impl TopicPerformance {
    pub fn new(topic: String, earned: u32, possible: u32) -> Self {
        let percentage = if possible == 0 {
            0
        } else {
            (earned as f64 / possible as f64 * 100.0).round() as u32
        };
        Self {
            topic,
            earned,
            possible,
            percentage,
        }
    }
}

/// Full cohort analysis output
#[derive(Debug, Clone, Serialize)]
pub struct CohortAnalysis {
    pub assessment_id: Uuid,
    pub submission_count: usize,
    pub items: Vec<ItemStatistic>,
    pub topics: Vec<TopicPerformance>,
}
