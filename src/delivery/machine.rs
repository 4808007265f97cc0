//! Client-side delivery state machine: question/choice ordering with
//! persisted determinism, answer capture, countdown/count-up timing with
//! single-shot auto-submit, and durable resume through a session store.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{
    AnswerValue, AssembledQuestion, AssessmentContent, Choice, SessionRecord, Submission,
    SubmissionStatus,
};
use crate::store::{AssessmentStore, SessionStore, SubmissionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    Loading,
    InProgress,
    Submitting,
    Submitted,
    /// Student already has a submission; no second take
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    /// Countdown reached zero; this path never auto-retries
    TimeExpiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Untimed assessment: seconds since the persisted start
    Elapsed(u64),
    /// Timed assessment: seconds left
    Remaining(u64),
    /// Time limit reached; emitted exactly once
    Expired,
}

#[derive(Debug, Clone)]
pub struct StudentIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One student's in-progress take of one assessment
pub struct DeliverySession<'a> {
    submissions: &'a dyn SubmissionStore,
    sessions: &'a dyn SessionStore,
    content: AssessmentContent,
    student: StudentIdentity,
    record: SessionRecord,
    phase: DeliveryPhase,
    submit_in_flight: bool,
    expiry_signaled: bool,
    auto_submit_spent: bool,
    /// Set when a session write failed; the next write retries persistence
    session_dirty: bool,
}

impl<'a> DeliverySession<'a> {
    /// Load content, enforce the one-submission-per-student boundary, and
    /// resume or initialize the durable session record. Order and choice
    /// permutations are generated exactly once and reused verbatim on
    /// every resume.
    pub async fn start(
        assessments: &'a dyn AssessmentStore,
        submissions: &'a dyn SubmissionStore,
        sessions: &'a dyn SessionStore,
        assessment_id: Uuid,
        student: StudentIdentity,
    ) -> Result<DeliverySession<'a>> {
        let content = assessments
            .get_content(assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Assessment content {} not found", assessment_id))
            })?;

        let mut machine = DeliverySession {
            submissions,
            sessions,
            student,
            record: SessionRecord::new(assessment_id, Uuid::nil(), Utc::now()),
            content,
            phase: DeliveryPhase::Loading,
            submit_in_flight: false,
            expiry_signaled: false,
            auto_submit_spent: false,
            session_dirty: false,
        };

        if submissions
            .find_submission(assessment_id, machine.student.id)
            .await?
            .is_some()
        {
            tracing::info!(%assessment_id, student_id = %machine.student.id, "Submission exists, locking session");
            machine.phase = DeliveryPhase::Locked;
            return Ok(machine);
        }

        // A failed read falls back to a fresh record; losing resume state
        // is recoverable, refusing to render is not.
        let existing = match sessions.get_session(assessment_id, machine.student.id).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "Session read failed, starting fresh");
                None
            }
        };

        machine.record = match existing {
            Some(record) => record,
            None => {
                let mut record =
                    SessionRecord::new(assessment_id, machine.student.id, Utc::now());
                let mut rng = rand::thread_rng();

                if machine.content.settings.randomize_order {
                    let mut order: Vec<Uuid> =
                        machine.content.questions.iter().map(|q| q.id).collect();
                    order.shuffle(&mut rng);
                    record.question_order = Some(order);
                }
                if machine.content.settings.shuffle_choices {
                    let mut orders: HashMap<Uuid, Vec<String>> = HashMap::new();
                    for question in &machine.content.questions {
                        if question.choices.is_empty() {
                            continue;
                        }
                        let mut ids: Vec<String> =
                            question.choices.iter().map(|c| c.id.clone()).collect();
                        ids.shuffle(&mut rng);
                        orders.insert(question.id, ids);
                    }
                    record.choice_orders = Some(orders);
                }
                record
            }
        };

        machine.phase = DeliveryPhase::InProgress;
        machine.persist_session().await;
        Ok(machine)
    }

    pub fn phase(&self) -> DeliveryPhase {
        self.phase
    }

    pub fn settings(&self) -> &crate::models::DeliverySettings {
        &self.content.settings
    }

    pub fn current_index(&self) -> usize {
        self.record.current_index
    }

    /// Questions in delivery order. A stale permutation entry pointing at
    /// a question no longer in the content document is skipped and
    /// flagged rather than aborting the whole render.
    pub fn questions(&self) -> Vec<&AssembledQuestion> {
        let by_id: HashMap<Uuid, &AssembledQuestion> =
            self.content.questions.iter().map(|q| (q.id, q)).collect();

        match &self.record.question_order {
            Some(order) => order
                .iter()
                .filter_map(|id| {
                    let question = by_id.get(id).copied();
                    if question.is_none() {
                        tracing::warn!(question_id = %id, "Skipping unknown question in persisted order");
                    }
                    question
                })
                .collect(),
            None => self.content.questions.iter().collect(),
        }
    }

    /// Questions currently rendered: one in one-at-a-time mode, all
    /// otherwise
    pub fn visible_questions(&self) -> Vec<&AssembledQuestion> {
        let questions = self.questions();
        if self.content.settings.one_at_a_time {
            questions
                .get(self.record.current_index)
                .map(|q| vec![*q])
                .unwrap_or_default()
        } else {
            questions
        }
    }

    /// Choices in the persisted shuffled order, or author order
    pub fn choices(&self, question_id: Uuid) -> Vec<Choice> {
        let Some(question) = self.content.questions.iter().find(|q| q.id == question_id)
        else {
            return Vec::new();
        };

        let order = self
            .record
            .choice_orders
            .as_ref()
            .and_then(|orders| orders.get(&question_id));
        match order {
            Some(ids) => {
                let by_id: HashMap<&str, &Choice> = question
                    .choices
                    .iter()
                    .map(|c| (c.id.as_str(), c))
                    .collect();
                ids.iter()
                    .filter_map(|id| by_id.get(id.as_str()).map(|c| (*c).clone()))
                    .collect()
            }
            None => question.choices.clone(),
        }
    }

    /// Capture one answer and persist the session record synchronously.
    /// A session-store failure is non-fatal: the in-memory answer stands
    /// and the next write retries.
    pub async fn record_answer(&mut self, question_id: Uuid, answer: AnswerValue) -> Result<()> {
        if self.phase != DeliveryPhase::InProgress {
            return Err(AppError::BadRequest(
                "Answers can only change while the session is in progress".to_string(),
            ));
        }
        if !self.content.questions.iter().any(|q| q.id == question_id) {
            tracing::warn!(%question_id, "Ignoring answer for unknown question");
            return Ok(());
        }

        self.record.answers.insert(question_id, answer);
        self.record.updated_at = Utc::now();
        self.persist_session().await;
        Ok(())
    }

    pub fn next(&mut self) {
        let last = self.questions().len().saturating_sub(1);
        self.record.current_index = (self.record.current_index + 1).min(last);
    }

    pub fn back(&mut self) {
        self.record.current_index = self.record.current_index.saturating_sub(1);
    }

    pub fn jump_to(&mut self, index: usize) {
        let last = self.questions().len().saturating_sub(1);
        self.record.current_index = index.min(last);
    }

    /// Persist the navigation position after a next/back/jump
    pub async fn save_position(&mut self) {
        self.record.updated_at = Utc::now();
        self.persist_session().await;
    }

    /// Submit is gated to the last index in one-at-a-time mode
    pub fn can_submit(&self) -> bool {
        if self.content.settings.one_at_a_time {
            let last = self.questions().len().saturating_sub(1);
            self.record.current_index == last
        } else {
            true
        }
    }

    /// Recompute timing from the persisted start timestamp, so a reload
    /// never resets the clock. For timed assessments, `Expired` is
    /// emitted at most once; re-fires while a submit is in flight report
    /// `Remaining(0)` instead of triggering a second submit.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let elapsed = (now - self.record.started_at).num_seconds().max(0) as u64;
        let limit_minutes = self.content.settings.time_limit_minutes;

        if limit_minutes == 0 {
            return TickOutcome::Elapsed(elapsed);
        }

        let remaining = u64::from(limit_minutes) * 60;
        let remaining = remaining.saturating_sub(elapsed);
        if remaining > 0 {
            return TickOutcome::Remaining(remaining);
        }

        if self.phase == DeliveryPhase::InProgress
            && !self.expiry_signaled
            && !self.submit_in_flight
        {
            self.expiry_signaled = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Remaining(0)
        }
    }

    /// Build and persist the submission, then discard the session record.
    /// On store failure the machine stays in `Submitting`; a manual
    /// retry is allowed, the expiry path is not.
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<Submission> {
        match self.phase {
            DeliveryPhase::Submitted => {
                return Err(AppError::BadRequest("Already submitted".to_string()))
            }
            DeliveryPhase::Locked => {
                return Err(AppError::BadRequest(
                    "A submission already exists for this student".to_string(),
                ))
            }
            DeliveryPhase::Loading => {
                return Err(AppError::BadRequest("Session not started".to_string()))
            }
            DeliveryPhase::InProgress | DeliveryPhase::Submitting => {}
        }
        if self.submit_in_flight {
            return Err(AppError::BadRequest("Submit already in flight".to_string()));
        }
        if trigger == SubmitTrigger::TimeExpiry && self.auto_submit_spent {
            return Err(AppError::BadRequest(
                "Auto-submit already attempted".to_string(),
            ));
        }
        if trigger == SubmitTrigger::Manual && !self.can_submit() {
            return Err(AppError::BadRequest(
                "Submit is only available on the last question".to_string(),
            ));
        }

        self.submit_in_flight = true;
        self.phase = DeliveryPhase::Submitting;
        if trigger == SubmitTrigger::TimeExpiry {
            self.auto_submit_spent = true;
        }

        // Re-check the uniqueness boundary; another device may have won
        let existing = match self
            .submissions
            .find_submission(self.content.id, self.student.id)
            .await
        {
            Ok(existing) => existing,
            Err(err) => {
                self.submit_in_flight = false;
                return Err(err);
            }
        };
        if existing.is_some() {
            self.submit_in_flight = false;
            self.phase = DeliveryPhase::Locked;
            return Err(AppError::BadRequest(
                "A submission already exists for this student".to_string(),
            ));
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            assessment_id: self.content.id,
            student_id: self.student.id,
            student_name: self.student.name.clone(),
            student_email: self.student.email.clone(),
            answers: self.record.answers.clone(),
            submitted_at: Utc::now(),
            score: None,
            total_points: None,
            status: SubmissionStatus::Submitted,
            graded_at: None,
        };

        if let Err(err) = self.submissions.create_submission(submission.clone()).await {
            tracing::error!(error = %err, "Submit failed");
            self.submit_in_flight = false;
            return Err(err);
        }

        if let Err(err) = self
            .sessions
            .clear_session(self.content.id, self.student.id)
            .await
        {
            // The submission is durable; a leftover session record is
            // harmless because start() locks on the existing submission.
            tracing::warn!(error = %err, "Failed to clear session record after submit");
        }

        self.submit_in_flight = false;
        self.phase = DeliveryPhase::Submitted;
        tracing::info!(assessment_id = %self.content.id, student_id = %self.student.id, "Submitted");
        Ok(submission)
    }

    async fn persist_session(&mut self) {
        match self.sessions.put_session(&self.record).await {
            Ok(()) => self.session_dirty = false,
            Err(err) => {
                tracing::warn!(error = %err, "Session write failed, continuing in memory");
                self.session_dirty = true;
            }
        }
    }

    /// True when the latest session write failed and resume state is at
    /// risk until a later write succeeds
    pub fn has_unsaved_state(&self) -> bool {
        self.session_dirty
    }
}
