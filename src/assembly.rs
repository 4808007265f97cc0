use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::context::{require_teacher, UserContext};
use crate::errors::{AppError, Result};
use crate::models::{
    AnswerValue, AssembledQuestion, AssessmentContent, AssessmentKey, AssessmentStatus,
    DeliverySettings, Difficulty, Question, SectionSpec, SectionSummary, TypeFilter,
};
use crate::store::{AssessmentStore, QuestionFilter, QuestionRepository};

/// Assembly input: metadata plus the ordered section specs
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub title: String,
    pub class_ids: Vec<Uuid>,
    pub status: AssessmentStatus,
    pub settings: DeliverySettings,
    pub sections: Vec<SectionSpec>,
}

/// Stratified-sample questions per the section specs, split the result
/// into a sanitized content document and a key document, and persist both
/// atomically under one generated id.
pub async fn assemble(
    ctx: &UserContext,
    repo: &dyn QuestionRepository,
    assessments: &dyn AssessmentStore,
    request: AssemblyRequest,
) -> Result<Uuid> {
    require_teacher(ctx)?;

    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    let mut questions: Vec<AssembledQuestion> = Vec::new();
    let mut answers: HashMap<Uuid, AnswerValue> = HashMap::new();
    let mut sections: Vec<SectionSummary> = Vec::new();
    let mut selected: HashSet<Uuid> = HashSet::new();

    for (section_idx, section) in request.sections.iter().enumerate() {
        let pool = query_section_pool(repo, section).await?;
        // Overlapping section pools must not draw the same question twice;
        // each selected question id leaves the pool for later sections.
        let pool: Vec<Question> = pool
            .into_iter()
            .filter(|q| !selected.contains(&q.id))
            .collect();
        let picks = select_from_pool(section, pool);

        tracing::debug!(
            section = section_idx,
            picked = picks.len(),
            "Selected questions for section"
        );

        sections.push(SectionSummary {
            title: section.title.clone(),
            course: section.course.clone(),
            topics: section.topics.clone(),
            type_filter: section.type_filter,
            question_count: picks.len(),
        });

        for question in picks {
            selected.insert(question.id);
            let points = section.points_per_question.unwrap_or(question.points);
            let (assembled, key_answer) = question.split_for_assembly(section_idx, points);
            answers.insert(assembled.id, key_answer);
            questions.push(assembled);
        }
    }

    // Shortfall in individual sections is tolerated; an empty assessment is not.
    if questions.is_empty() {
        return Err(AppError::Assembly("no questions matched".to_string()));
    }

    let id = Uuid::new_v4();
    let content = AssessmentContent {
        id,
        title: request.title.trim().to_string(),
        author_id: ctx.user_id,
        class_ids: request.class_ids,
        status: request.status,
        settings: request.settings,
        sections,
        questions,
        created_at: Utc::now(),
    };
    let key = AssessmentKey {
        assessment_id: id,
        answers,
    };

    let question_count = content.questions.len();
    assessments.put_assessment(content, key).await?;
    tracing::info!(%id, question_count, "Assembled assessment");

    Ok(id)
}

async fn query_section_pool(
    repo: &dyn QuestionRepository,
    section: &SectionSpec,
) -> Result<Vec<Question>> {
    let filter = QuestionFilter {
        course: Some(section.course.clone()),
        topics: section.topics.clone(),
        question_type: None,
    };
    let pool = repo.query_questions(&filter).await?;

    // Type narrowing happens in memory, after the repository query
    Ok(match section.type_filter {
        TypeFilter::All => pool,
        TypeFilter::Only(qt) => pool
            .into_iter()
            .filter(|q| q.question_type == qt)
            .collect(),
    })
}

/// Draw this section's questions from its candidate pool. Quotas are
/// best-effort: a tier short on candidates yields what it has.
fn select_from_pool(section: &SectionSpec, pool: Vec<Question>) -> Vec<Question> {
    let mut rng = rand::thread_rng();

    match &section.distribution {
        Some(distribution) => {
            let mut picks = Vec::new();
            for tier in Difficulty::ALL {
                let quota = distribution.get(&tier).copied().unwrap_or(0);
                if quota == 0 {
                    continue;
                }
                let mut candidates: Vec<Question> = pool
                    .iter()
                    .filter(|q| q.difficulty == tier)
                    .cloned()
                    .collect();
                candidates.shuffle(&mut rng);
                candidates.truncate(quota);
                picks.extend(candidates);
            }
            picks
        }
        None => {
            // Flat fallback: one uniform sample from the whole pool
            let count = section.count.unwrap_or(0);
            let mut candidates = pool;
            candidates.shuffle(&mut rng);
            candidates.truncate(count);
            candidates
        }
    }
}
