pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
    AssessmentContent, AssessmentKey, GradeUpdate, Question, QuestionType, SessionRecord,
    Submission,
};

/// Filter for querying the question bank
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Exact course match
    pub course: Option<String>,
    /// Topic membership; a single-element list is an exact topic match
    pub topics: Option<Vec<String>>,
    pub question_type: Option<QuestionType>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(course) = &self.course {
            if &question.course != course {
                return false;
            }
        }
        if let Some(topics) = &self.topics {
            if !topics.iter().any(|t| t == &question.topic) {
                return false;
            }
        }
        if let Some(qt) = self.question_type {
            if question.question_type != qt {
                return false;
            }
        }
        true
    }
}

/// Question bank, queryable by course/topic/type
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn query_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;
}

/// Content/key document pair storage. `put_assessment` writes both
/// documents as one atomic unit under a shared id; deletion removes both.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn put_assessment(&self, content: AssessmentContent, key: AssessmentKey) -> Result<Uuid>;
    async fn get_content(&self, id: Uuid) -> Result<Option<AssessmentContent>>;
    async fn get_key(&self, id: Uuid) -> Result<Option<AssessmentKey>>;
    async fn delete_assessment(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn list_submissions(&self, assessment_id: Uuid) -> Result<Vec<Submission>>;
    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>>;
    /// Lookup by the (assessment, student) pair the delivery boundary
    /// enforces uniqueness on
    async fn find_submission(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>>;
    async fn create_submission(&self, submission: Submission) -> Result<()>;
    async fn update_submission(&self, id: Uuid, update: GradeUpdate) -> Result<()>;
}

/// Durable resume state, backed by any client-side key/value store
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<SessionRecord>>;
    async fn put_session(&self, record: &SessionRecord) -> Result<()>;
    async fn clear_session(&self, assessment_id: Uuid, student_id: Uuid) -> Result<()>;
}
