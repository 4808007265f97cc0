//! Item and topic statistics over a cohort of submissions: per-item
//! difficulty (p-value), discrimination against upper/lower score groups,
//! quality classification, distractor histograms, and per-topic
//! earned/possible aggregates at cohort and single-student scope.

use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::context::{require_teacher, UserContext};
use crate::errors::Result;
use crate::grading::is_correct;
use crate::models::{
    AssessmentContent, AssessmentKey, CohortAnalysis, ItemClassification, ItemStatistic,
    Submission, TopicPerformance,
};

/// Upper/lower split fraction for cohorts of at least 20
const LARGE_COHORT_SPLIT: f64 = 0.27;
const LARGE_COHORT_MIN: usize = 20;

/// Compute item statistics and cohort topic aggregates for every
/// submission of an assessment, graded or not. Correctness is evaluated
/// fresh against the key, so the analysis reflects key corrections even
/// before a regrade has run.
pub fn analyze_cohort(
    ctx: &UserContext,
    content: &AssessmentContent,
    key: &AssessmentKey,
    submissions: &[Submission],
) -> Result<CohortAnalysis> {
    require_teacher(ctx)?;

    let n = submissions.len();
    if n == 0 {
        return Ok(CohortAnalysis {
            assessment_id: content.id,
            submission_count: 0,
            items: Vec::new(),
            topics: Vec::new(),
        });
    }

    // Per-submission correctness and correct-points totals in one pass
    let mut ranked: Vec<(HashMap<Uuid, bool>, u32)> = submissions
        .iter()
        .map(|submission| {
            let mut correct_map = HashMap::new();
            let mut total = 0u32;
            for question in &content.questions {
                let Some(key_answer) = key.answers.get(&question.id) else {
                    continue;
                };
                let correct = is_correct(
                    question.question_type,
                    submission.answers.get(&question.id),
                    key_answer,
                );
                if correct {
                    total += question.resolved_points();
                }
                correct_map.insert(question.id, correct);
            }
            (correct_map, total)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let split = if n >= LARGE_COHORT_MIN {
        LARGE_COHORT_SPLIT
    } else {
        0.5
    };
    let group_size = ((n as f64 * split).floor() as usize).max(1);
    let upper = &ranked[..group_size];
    let lower = &ranked[n - group_size..];

    let mut items = Vec::new();
    for question in &content.questions {
        if !key.answers.contains_key(&question.id) {
            continue;
        }

        let correct = ranked
            .iter()
            .filter(|(map, _)| map.get(&question.id).copied().unwrap_or(false))
            .count();
        let upper_correct = upper
            .iter()
            .filter(|(map, _)| map.get(&question.id).copied().unwrap_or(false))
            .count();
        let lower_correct = lower
            .iter()
            .filter(|(map, _)| map.get(&question.id).copied().unwrap_or(false))
            .count();

        let difficulty = correct as f64 / n as f64;
        let discrimination = (upper_correct as f64 - lower_correct as f64) / group_size as f64;

        let mut distractors: HashMap<String, usize> = HashMap::new();
        for submission in submissions {
            if let Some(answer) = submission.answers.get(&question.id) {
                *distractors.entry(answer.histogram_key()).or_insert(0) += 1;
            }
        }

        items.push(ItemStatistic {
            question_id: question.id,
            attempts: n,
            correct,
            difficulty,
            discrimination,
            classification: classify(difficulty, discrimination),
            distractors,
        });
    }

    let topics = topic_aggregates(content, key, submissions);

    tracing::debug!(
        assessment_id = %content.id,
        submissions = n,
        items = items.len(),
        "Analyzed cohort"
    );

    Ok(CohortAnalysis {
        assessment_id: content.id,
        submission_count: n,
        items,
        topics,
    })
}

/// Per-topic earned/possible for exactly one submission. No cohort split
/// and no discrimination at this scope. Touches the key, so it carries
/// the same role gate as the cohort analysis.
pub fn student_topic_performance(
    ctx: &UserContext,
    content: &AssessmentContent,
    key: &AssessmentKey,
    submission: &Submission,
) -> Result<Vec<TopicPerformance>> {
    require_teacher(ctx)?;
    Ok(topic_aggregates(content, key, std::slice::from_ref(submission)))
}

/// Label precedence: a negative discrimination marks the item regardless
/// of its difficulty; difficulty extremes hold otherwise; weak positive
/// discrimination is flagged last.
fn classify(difficulty: f64, discrimination: f64) -> ItemClassification {
    if discrimination < 0.0 {
        ItemClassification::Miskeyed
    } else if difficulty < 0.20 {
        ItemClassification::TooDifficult
    } else if difficulty > 0.90 {
        ItemClassification::TooEasy
    } else if discrimination < 0.10 {
        ItemClassification::PoorDiscrimination
    } else {
        ItemClassification::Good
    }
}

fn topic_aggregates(
    content: &AssessmentContent,
    key: &AssessmentKey,
    submissions: &[Submission],
) -> Vec<TopicPerformance> {
    let n = submissions.len() as u32;
    // BTreeMap keeps topic order stable across runs
    let mut possible: BTreeMap<&str, u32> = BTreeMap::new();
    let mut earned: BTreeMap<&str, u32> = BTreeMap::new();

    for question in &content.questions {
        let Some(key_answer) = key.answers.get(&question.id) else {
            continue;
        };
        let points = question.resolved_points();
        *possible.entry(question.topic.as_str()).or_insert(0) += points * n;

        for submission in submissions {
            if is_correct(
                question.question_type,
                submission.answers.get(&question.id),
                key_answer,
            ) {
                *earned.entry(question.topic.as_str()).or_insert(0) += points;
            }
        }
    }

    possible
        .into_iter()
        .map(|(topic, possible)| {
            let earned = earned.get(topic).copied().unwrap_or(0);
            TopicPerformance::new(topic.to_string(), earned, possible)
        })
        .collect()
}
