use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question kind, drives evaluator dispatch and answer shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Mcq,
    MultiAnswer,
    TrueFalse,
    Identification,
    Matching,
    Ordering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
}

impl Difficulty {
    /// Fixed tier order used by stratified sampling
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Difficult];
}

/// One selectable choice for MCQ / MULTI_ANSWER questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
}

/// One term/definition pair of a MATCHING key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub term: String,
    pub definition: String,
}

/// Answer payload, student- or key-side. The JSON shape mirrors the
/// question type: scalar for MCQ/TRUE_FALSE, string list for
/// MULTI_ANSWER/IDENTIFICATION/ORDERING and for MATCHING student answers,
/// pair list for MATCHING keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
    Pairs(Vec<MatchPair>),
}

impl AnswerValue {
    /// Stable string rendering, used as a distractor histogram key
    pub fn histogram_key(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::List(items) => items.join(", "),
            AnswerValue::Pairs(pairs) => pairs
                .iter()
                .map(|p| format!("{}={}", p.term, p.definition))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Bank question. Owned by the question bank; a copy is embedded into
/// assessments at assembly time and is immutable from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub course: String,
    pub topic: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[serde(default = "default_points")]
    pub points: u32,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub figures: Vec<String>,
    pub correct_answer: AnswerValue,
}

fn default_points() -> u32 {
    1
}

/// Answer-stripped question copy embedded into a content document.
/// There is intentionally no answer field on this type: the content/key
/// split invariant holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledQuestion {
    pub id: Uuid,
    pub course: String,
    pub topic: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[serde(default = "default_points")]
    pub points: u32,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub figures: Vec<String>,
    pub section_idx: usize,
    /// Effective point value written at assembly (section override, else
    /// the question's own points). May be edited to 0 later to exclude
    /// the item from scoring.
    pub section_points: Option<u32>,
}

impl Question {
    /// Split into the sanitized content copy and the verbatim key answer
    pub fn split_for_assembly(
        self,
        section_idx: usize,
        section_points: u32,
    ) -> (AssembledQuestion, AnswerValue) {
        let assembled = AssembledQuestion {
            id: self.id,
            course: self.course,
            topic: self.topic,
            question_type: self.question_type,
            difficulty: self.difficulty,
            points: self.points,
            text: self.text,
            choices: self.choices,
            figures: self.figures,
            section_idx,
            section_points: Some(section_points),
        };
        (assembled, self.correct_answer)
    }
}

impl AssembledQuestion {
    /// Point value used by scoring: section override, else the question's
    /// own points (which defaults to 1 when the record carries none).
    /// Zero excludes the item from scoring entirely.
    pub fn resolved_points(&self) -> u32 {
        self.section_points.unwrap_or(self.points)
    }
}
