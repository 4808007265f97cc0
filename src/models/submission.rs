use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::question::AnswerValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

/// One student's submitted answers for one assessment. Created once per
/// (assessment, student) pair; only grading mutates it afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub answers: HashMap<Uuid, AnswerValue>,
    pub submitted_at: DateTime<Utc>,
    pub score: Option<u32>,
    pub total_points: Option<u32>,
    pub status: SubmissionStatus,
    pub graded_at: Option<DateTime<Utc>>,
}

/// Fields grading writes back to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeUpdate {
    pub score: u32,
    pub total_points: u32,
    pub status: SubmissionStatus,
    pub graded_at: DateTime<Utc>,
}
