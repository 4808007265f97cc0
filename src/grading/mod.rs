pub mod evaluator;
pub mod regrade;
pub mod scoring;

pub use evaluator::is_correct;
pub use regrade::{regrade_assessment, RegradeFailure, RegradeReport};
pub use scoring::{grade_submission, GradeOutcome};
