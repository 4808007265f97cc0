// End-to-end: assemble -> deliver -> submit -> grade -> analyze ->
// exclude an item and regrade, all over the in-memory store.
use std::collections::BTreeMap;

use exam_core::analysis::analyze_cohort;
use exam_core::assembly::{assemble, AssemblyRequest};
use exam_core::config::Config;
use exam_core::context::{UserContext, UserRole};
use exam_core::delivery::{DeliverySession, StudentIdentity, SubmitTrigger};
use exam_core::grading::{grade_submission, regrade_assessment};
use exam_core::models::{
    AnswerValue, AssessmentStatus, Choice, DeliverySettings, Difficulty, Question, QuestionType,
    SectionSpec, SubmissionStatus, TypeFilter,
};
use exam_core::store::{AssessmentStore, InMemoryStore, SubmissionStore};
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_core=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn mcq(course: &str, topic: &str, difficulty: Difficulty, correct: &str) -> Question {
    Question {
        id: Uuid::new_v4(),
        course: course.to_string(),
        topic: topic.to_string(),
        question_type: QuestionType::Mcq,
        difficulty,
        points: 1,
        text: "Pick one".to_string(),
        choices: vec![
            Choice {
                id: "choice_a".to_string(),
                text: "A".to_string(),
            },
            Choice {
                id: "choice_b".to_string(),
                text: "B".to_string(),
            },
        ],
        figures: vec![],
        correct_answer: AnswerValue::Text(correct.to_string()),
    }
}

fn identification(course: &str, topic: &str, variants: &[&str]) -> Question {
    Question {
        id: Uuid::new_v4(),
        course: course.to_string(),
        topic: topic.to_string(),
        question_type: QuestionType::Identification,
        difficulty: Difficulty::Moderate,
        points: 2,
        text: "Name it".to_string(),
        choices: vec![],
        figures: vec![],
        correct_answer: AnswerValue::List(variants.iter().map(|s| s.to_string()).collect()),
    }
}

fn student(name: &str) -> StudentIdentity {
    StudentIdentity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

/// Shape a correct student response from the key answer: identification
/// keys list accepted variants but students submit one string, and
/// matching keys are pairs while students submit definitions in term order.
fn correct_student_answer(question_type: QuestionType, key: &AnswerValue) -> AnswerValue {
    match (question_type, key) {
        (QuestionType::Identification, AnswerValue::List(variants)) => {
            AnswerValue::Text(variants[0].clone())
        }
        (QuestionType::Matching, AnswerValue::Pairs(pairs)) => {
            AnswerValue::List(pairs.iter().map(|p| p.definition.clone()).collect())
        }
        _ => key.clone(),
    }
}

async fn take_and_submit(
    store: &InMemoryStore,
    assessment_id: Uuid,
    who: StudentIdentity,
    answer_correctly: bool,
) -> Uuid {
    let content = store.get_content(assessment_id).await.unwrap().unwrap();
    let key = store.get_key(assessment_id).await.unwrap().unwrap();

    let mut machine = DeliverySession::start(store, store, store, assessment_id, who)
        .await
        .unwrap();
    for question in content.questions.clone() {
        let answer = if answer_correctly {
            correct_student_answer(question.question_type, key.answers.get(&question.id).unwrap())
        } else {
            AnswerValue::Text("wrong".to_string())
        };
        machine.record_answer(question.id, answer).await.unwrap();
    }
    machine.submit(SubmitTrigger::Manual).await.unwrap().id
}

#[tokio::test]
async fn test_full_assessment_lifecycle() {
    init_tracing();

    let store = InMemoryStore::new();
    let mut bank = Vec::new();
    for _ in 0..4 {
        bank.push(mcq("BIO101", "Cells", Difficulty::Easy, "choice_a"));
    }
    for _ in 0..3 {
        bank.push(mcq("BIO101", "Genetics", Difficulty::Difficult, "choice_b"));
    }
    bank.push(identification("BIO101", "Genetics", &["Mitosis", "The Mitosis"]));
    store.seed_questions(bank).await;

    let teacher = UserContext::new(Uuid::new_v4(), UserRole::Teacher);
    let request = AssemblyRequest {
        title: "Unit 1 Exam".to_string(),
        class_ids: vec![Uuid::new_v4()],
        status: AssessmentStatus::Active,
        settings: DeliverySettings::default(),
        sections: vec![
            SectionSpec {
                title: "Multiple Choice".to_string(),
                course: "BIO101".to_string(),
                topics: None,
                type_filter: TypeFilter::Only(QuestionType::Mcq),
                distribution: Some(BTreeMap::from([
                    (Difficulty::Easy, 2),
                    (Difficulty::Difficult, 2),
                ])),
                count: None,
                points_per_question: None,
            },
            SectionSpec {
                title: "Short Answers".to_string(),
                course: "BIO101".to_string(),
                topics: Some(vec!["Genetics".to_string()]),
                type_filter: TypeFilter::Only(QuestionType::Identification),
                distribution: None,
                count: Some(1),
                points_per_question: Some(4),
            },
        ],
    };

    let assessment_id = assemble(&teacher, &store, &store, request).await.unwrap();

    // Split invariant: sanitized content, complete key
    let content = store.get_content(assessment_id).await.unwrap().unwrap();
    let key = store.get_key(assessment_id).await.unwrap().unwrap();
    assert_eq!(content.questions.len(), 5);
    assert!(!serde_json::to_string(&content)
        .unwrap()
        .contains("correct_answer"));
    assert_eq!(key.answers.len(), 5);

    // Two students take it
    let ace = take_and_submit(&store, assessment_id, student("Ace"), true).await;
    let rook = take_and_submit(&store, assessment_id, student("Rook"), false).await;

    // 4 MCQs at 1 point + 1 identification at the 4-point section override
    let outcome = grade_submission(&store, &store, ace).await.unwrap();
    assert_eq!(outcome.total_points, 8);
    assert_eq!(outcome.score, 8);

    let outcome = grade_submission(&store, &store, rook).await.unwrap();
    assert_eq!(outcome.score, 0);

    let submissions = store.list_submissions(assessment_id).await.unwrap();
    assert!(submissions
        .iter()
        .all(|s| s.status == SubmissionStatus::Graded));

    let analysis = analyze_cohort(&teacher, &content, &key, &submissions).unwrap();
    assert_eq!(analysis.submission_count, 2);
    assert_eq!(analysis.items.len(), 5);
    assert!(analysis.topics.iter().any(|t| t.topic == "Cells"));
    assert!(analysis.topics.iter().any(|t| t.topic == "Genetics"));
    for item in &analysis.items {
        assert!((item.difficulty - 0.5).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_item_exclusion_drops_only_that_question() {
    init_tracing();

    let store = InMemoryStore::new();
    store
        .seed_questions(vec![
            mcq("CHEM200", "Acids", Difficulty::Easy, "choice_a"),
            mcq("CHEM200", "Acids", Difficulty::Easy, "choice_b"),
        ])
        .await;

    let teacher = UserContext::new(Uuid::new_v4(), UserRole::Teacher);
    let assessment_id = assemble(
        &teacher,
        &store,
        &store,
        AssemblyRequest {
            title: "Quiz".to_string(),
            class_ids: vec![],
            status: AssessmentStatus::Active,
            settings: DeliverySettings::default(),
            sections: vec![SectionSpec {
                title: "All".to_string(),
                course: "CHEM200".to_string(),
                topics: None,
                type_filter: TypeFilter::All,
                distribution: Some(BTreeMap::from([(Difficulty::Easy, 2)])),
                count: None,
                points_per_question: Some(3),
            }],
        },
    )
    .await
    .unwrap();

    let submission_id = take_and_submit(&store, assessment_id, student("Vera"), true).await;
    let before = grade_submission(&store, &store, submission_id).await.unwrap();
    assert_eq!(before.score, 6);
    assert_eq!(before.total_points, 6);

    // Weed out the first question: zero its points and regrade everyone
    let mut content = store.get_content(assessment_id).await.unwrap().unwrap();
    let key = store.get_key(assessment_id).await.unwrap().unwrap();
    let excluded = content.questions[0].id;
    content
        .questions
        .iter_mut()
        .find(|q| q.id == excluded)
        .unwrap()
        .section_points = Some(0);
    store.put_assessment(content, key).await.unwrap();

    let config = Config::default();
    let report = regrade_assessment(
        &teacher,
        &store,
        &store,
        assessment_id,
        config.grading.regrade_chunk_size,
    )
    .await
    .unwrap();
    assert_eq!(report.regraded, 1);
    assert!(report.failures.is_empty());

    let after = store.get_submission(submission_id).await.unwrap().unwrap();
    assert_eq!(after.score, Some(3));
    assert_eq!(after.total_points, Some(3));
}
