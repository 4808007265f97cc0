use futures::future::join_all;
use uuid::Uuid;

use super::scoring::grade_submission;
use crate::context::{require_teacher, UserContext};
use crate::errors::{AppError, Result};
use crate::store::{AssessmentStore, SubmissionStore};

/// One submission that could not be regraded
#[derive(Debug, Clone)]
pub struct RegradeFailure {
    pub submission_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RegradeReport {
    pub assessment_id: Uuid,
    pub regraded: usize,
    pub failures: Vec<RegradeFailure>,
}

/// Regrade every submission of an assessment, typically after an answer
/// key or point correction. Submissions are graded concurrently in
/// fixed-size chunks to bound store load. One submission's failure never
/// aborts the rest.
pub async fn regrade_assessment(
    ctx: &UserContext,
    assessments: &dyn AssessmentStore,
    submissions: &dyn SubmissionStore,
    assessment_id: Uuid,
    chunk_size: usize,
) -> Result<RegradeReport> {
    require_teacher(ctx)?;

    if assessments.get_content(assessment_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Assessment content {} not found",
            assessment_id
        )));
    }

    let all = submissions.list_submissions(assessment_id).await?;
    tracing::info!(%assessment_id, count = all.len(), "Starting regrade");

    let mut regraded = 0;
    let mut failures = Vec::new();

    for chunk in all.chunks(chunk_size.max(1)) {
        let gradings = chunk
            .iter()
            .map(|s| grade_submission(assessments, submissions, s.id));
        for (submission, result) in chunk.iter().zip(join_all(gradings).await) {
            match result {
                Ok(_) => regraded += 1,
                Err(err) => {
                    tracing::warn!(
                        submission_id = %submission.id,
                        error = %err,
                        "Regrade failed for one submission"
                    );
                    failures.push(RegradeFailure {
                        submission_id: submission.id,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    tracing::info!(%assessment_id, regraded, failed = failures.len(), "Regrade finished");

    Ok(RegradeReport {
        assessment_id,
        regraded,
        failures,
    })
}
