use std::fmt;
use uuid::Uuid;

/// Application result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Missing content/key/submission - fatal to the current operation
    NotFound(String),
    /// Zero questions matched across all sections - assembly aborted
    Assembly(String),
    /// Malformed key or missing question metadata for a key entry
    Grading {
        assessment_id: Uuid,
        question_id: Option<Uuid>,
        message: String,
    },
    /// Durable session store unavailable - non-fatal, retried opportunistically
    SessionWrite(String),
    /// Remote document store failure
    Store(String),
    /// Caller lacks the role required for this operation
    Forbidden(String),
    /// Input validation failed
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Assembly(msg) => write!(f, "Assembly failed: {}", msg),
            AppError::Grading {
                assessment_id,
                question_id,
                message,
            } => match question_id {
                Some(qid) => write!(
                    f,
                    "Grading failed for assessment {} (question {}): {}",
                    assessment_id, qid, message
                ),
                None => write!(
                    f,
                    "Grading failed for assessment {}: {}",
                    assessment_id, message
                ),
            },
            AppError::SessionWrite(msg) => write!(f, "Session write failed: {}", msg),
            AppError::Store(msg) => write!(f, "Store error: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(format!("Serialization error: {}", err))
    }
}

impl AppError {
    /// True for errors the caller may retry without changing the request
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::SessionWrite(_) | AppError::Store(_))
    }
}
