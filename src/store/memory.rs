use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AssessmentStore, QuestionFilter, QuestionRepository, SessionStore, SubmissionStore,
};
use crate::errors::{AppError, Result};
use crate::models::{
    AssessmentContent, AssessmentKey, GradeUpdate, Question, SessionRecord, Submission,
};

/// In-memory implementation of every store capability, for tests and
/// local simulation. Content and key documents live in separate maps but
/// are written and deleted together, mirroring the remote store's
/// two-document transaction boundary.
#[derive(Default)]
pub struct InMemoryStore {
    questions: RwLock<Vec<Question>>,
    contents: RwLock<HashMap<Uuid, AssessmentContent>>,
    keys: RwLock<HashMap<Uuid, AssessmentKey>>,
    submissions: RwLock<HashMap<Uuid, Submission>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bank questions for tests
    pub async fn seed_questions(&self, questions: Vec<Question>) {
        self.questions.write().await.extend(questions);
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn query_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn put_assessment(&self, content: AssessmentContent, key: AssessmentKey) -> Result<Uuid> {
        if content.id != key.assessment_id {
            return Err(AppError::Store(
                "content and key documents must share one id".to_string(),
            ));
        }
        let id = content.id;
        let mut contents = self.contents.write().await;
        let mut keys = self.keys.write().await;
        contents.insert(id, content);
        keys.insert(id, key);
        Ok(id)
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<AssessmentContent>> {
        Ok(self.contents.read().await.get(&id).cloned())
    }

    async fn get_key(&self, id: Uuid) -> Result<Option<AssessmentKey>> {
        Ok(self.keys.read().await.get(&id).cloned())
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<()> {
        let mut contents = self.contents.write().await;
        let mut keys = self.keys.write().await;
        contents.remove(&id);
        keys.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn list_submissions(&self, assessment_id: Uuid) -> Result<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .filter(|s| s.assessment_id == assessment_id)
            .cloned()
            .collect())
    }

    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>> {
        Ok(self.submissions.read().await.get(&id).cloned())
    }

    async fn find_submission(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .find(|s| s.assessment_id == assessment_id && s.student_id == student_id)
            .cloned())
    }

    async fn create_submission(&self, submission: Submission) -> Result<()> {
        self.submissions
            .write()
            .await
            .insert(submission.id, submission);
        Ok(())
    }

    async fn update_submission(&self, id: Uuid, update: GradeUpdate) -> Result<()> {
        let mut submissions = self.submissions.write().await;
        let submission = submissions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;
        submission.score = Some(update.score);
        submission.total_points = Some(update.total_points);
        submission.status = update.status;
        submission.graded_at = Some(update.graded_at);
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn get_session(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<SessionRecord>> {
        let key = SessionRecord::storage_key(assessment_id, student_id);
        Ok(self.sessions.read().await.get(&key).cloned())
    }

    async fn put_session(&self, record: &SessionRecord) -> Result<()> {
        let key = SessionRecord::storage_key(record.assessment_id, record.student_id);
        self.sessions.write().await.insert(key, record.clone());
        Ok(())
    }

    async fn clear_session(&self, assessment_id: Uuid, student_id: Uuid) -> Result<()> {
        let key = SessionRecord::storage_key(assessment_id, student_id);
        self.sessions.write().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerValue, AssessmentStatus, DeliverySettings};
    use chrono::Utc;

    fn content_and_key(id: Uuid) -> (AssessmentContent, AssessmentKey) {
        (
            AssessmentContent {
                id,
                title: "Quiz".to_string(),
                author_id: Uuid::new_v4(),
                class_ids: vec![],
                status: AssessmentStatus::Active,
                settings: DeliverySettings::default(),
                sections: vec![],
                questions: vec![],
                created_at: Utc::now(),
            },
            AssessmentKey {
                assessment_id: id,
                answers: HashMap::from([(Uuid::new_v4(), AnswerValue::Text("a".to_string()))]),
            },
        )
    }

    #[tokio::test]
    async fn test_put_assessment_rejects_mismatched_ids() {
        let store = InMemoryStore::new();
        let (content, _) = content_and_key(Uuid::new_v4());
        let (_, key) = content_and_key(Uuid::new_v4());
        assert!(store.put_assessment(content, key).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_both_documents() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let (content, key) = content_and_key(id);
        store.put_assessment(content, key).await.unwrap();

        store.delete_assessment(id).await.unwrap();
        assert!(store.get_content(id).await.unwrap().is_none());
        assert!(store.get_key(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_keys_are_namespaced_per_assessment() {
        let store = InMemoryStore::new();
        let student = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .put_session(&SessionRecord::new(a, student, Utc::now()))
            .await
            .unwrap();

        assert!(store.get_session(a, student).await.unwrap().is_some());
        assert!(store.get_session(b, student).await.unwrap().is_none());
    }
}
