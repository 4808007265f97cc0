pub mod assessment;
pub mod question;
pub mod session;
pub mod stats;
pub mod submission;

pub use assessment::{
    AssessmentContent, AssessmentKey, AssessmentStatus, DeliverySettings, SectionSpec,
    SectionSummary, TypeFilter,
};
pub use question::{
    AnswerValue, AssembledQuestion, Choice, Difficulty, MatchPair, Question, QuestionType,
};
pub use session::SessionRecord;
pub use stats::{CohortAnalysis, ItemClassification, ItemStatistic, TopicPerformance};
pub use submission::{GradeUpdate, Submission, SubmissionStatus};
