use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::question::{AnswerValue, AssembledQuestion, Difficulty, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Draft,
    Active,
}

/// Delivery behavior chosen by the author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySettings {
    pub one_at_a_time: bool,
    pub randomize_order: bool,
    pub shuffle_choices: bool,
    /// Minutes; 0 means untimed (count-up instead of countdown)
    pub time_limit_minutes: u32,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            one_at_a_time: false,
            randomize_order: false,
            shuffle_choices: false,
            time_limit_minutes: 0,
        }
    }
}

/// Type filter for a section's question pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeFilter {
    All,
    Only(QuestionType),
}

impl Default for TypeFilter {
    fn default() -> Self {
        TypeFilter::All
    }
}

/// Assembly input describing one section. Not persisted; the content
/// document echoes it back as a `SectionSummary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub title: String,
    pub course: String,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub type_filter: TypeFilter,
    /// Per-tier quotas; best-effort when a tier's pool is smaller
    #[serde(default)]
    pub distribution: Option<BTreeMap<Difficulty, usize>>,
    /// Flat sample size used when no distribution is declared
    #[serde(default)]
    pub count: Option<usize>,
    /// Overrides every drawn question's own point value
    #[serde(default)]
    pub points_per_question: Option<u32>,
}

/// Section configuration echoed into the content document (no answers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub title: String,
    pub course: String,
    pub topics: Option<Vec<String>>,
    pub type_filter: TypeFilter,
    pub question_count: usize,
}

/// Student/teacher-visible half of an assessment. Must never contain a
/// correct answer in any form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentContent {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub class_ids: Vec<Uuid>,
    pub status: AssessmentStatus,
    pub settings: DeliverySettings,
    pub sections: Vec<SectionSummary>,
    pub questions: Vec<AssembledQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Grading-only half of an assessment, sharing the content document's id.
/// Created and deleted together with the content document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentKey {
    pub assessment_id: Uuid,
    pub answers: HashMap<Uuid, AnswerValue>,
}
