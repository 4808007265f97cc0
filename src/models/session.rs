use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::question::AnswerValue;

/// Durable resume state for one in-progress delivery session, keyed by
/// (assessment, student). Permutations are generated once on first load
/// and reused verbatim on every resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    /// Elapsed time is recomputed from this on every tick, so a page
    /// reload does not reset the clock.
    pub started_at: DateTime<Utc>,
    pub current_index: usize,
    pub answers: HashMap<Uuid, AnswerValue>,
    /// Question id permutation, present iff randomize_order is set
    pub question_order: Option<Vec<Uuid>>,
    /// Per-question choice id permutations, present iff shuffle_choices is set
    pub choice_orders: Option<HashMap<Uuid, Vec<String>>>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(assessment_id: Uuid, student_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            assessment_id,
            student_id,
            started_at: now,
            current_index: 0,
            answers: HashMap::new(),
            question_order: None,
            choice_orders: None,
            updated_at: now,
        }
    }

    /// Store key namespaced by (assessment, student) to avoid
    /// cross-assessment bleed
    pub fn storage_key(assessment_id: Uuid, student_id: Uuid) -> String {
        format!("session:{}:{}", assessment_id, student_id)
    }
}
