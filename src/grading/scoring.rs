use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::evaluator::is_correct;
use crate::errors::{AppError, Result};
use crate::models::{AssembledQuestion, GradeUpdate, SubmissionStatus};
use crate::store::{AssessmentStore, SubmissionStore};

/// Result of grading one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub score: u32,
    pub total_points: u32,
}

/// Grade one submission against its assessment's key and write the
/// result back. Idempotent: regrading unchanged inputs yields the same
/// score. A question whose resolved points are 0 contributes nothing
/// either way, which is how flagged items are excluded without deletion.
pub async fn grade_submission(
    assessments: &dyn AssessmentStore,
    submissions: &dyn SubmissionStore,
    submission_id: Uuid,
) -> Result<GradeOutcome> {
    let submission = submissions
        .get_submission(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", submission_id)))?;

    let assessment_id = submission.assessment_id;
    let content = assessments
        .get_content(assessment_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Assessment content {} not found", assessment_id))
        })?;
    let key = assessments.get_key(assessment_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("Assessment key {} not found", assessment_id))
    })?;

    let by_id: HashMap<Uuid, &AssembledQuestion> =
        content.questions.iter().map(|q| (q.id, q)).collect();

    let mut score = 0u32;
    let mut total_points = 0u32;

    for (question_id, key_answer) in &key.answers {
        let question = by_id.get(question_id).ok_or_else(|| AppError::Grading {
            assessment_id,
            question_id: Some(*question_id),
            message: "key entry has no matching content question".to_string(),
        })?;

        let points = question.resolved_points();
        total_points += points;

        if is_correct(
            question.question_type,
            submission.answers.get(question_id),
            key_answer,
        ) {
            score += points;
        }
    }

    submissions
        .update_submission(
            submission_id,
            GradeUpdate {
                score,
                total_points,
                status: SubmissionStatus::Graded,
                graded_at: Utc::now(),
            },
        )
        .await?;

    tracing::debug!(%submission_id, score, total_points, "Graded submission");

    Ok(GradeOutcome {
        score,
        total_points,
    })
}
