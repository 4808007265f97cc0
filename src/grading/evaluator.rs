//! Pure answer-correctness evaluation, dispatched by question type.
//! All string comparisons normalize via trim + lowercase. An absent
//! student answer is incorrect, never an error; so is a shape mismatch.

use crate::models::{AnswerValue, QuestionType};

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Evaluate one student answer against the key answer for a question of
/// the given type. Side-effect free.
pub fn is_correct(
    question_type: QuestionType,
    student: Option<&AnswerValue>,
    key: &AnswerValue,
) -> bool {
    let Some(student) = student else {
        return false;
    };

    match question_type {
        QuestionType::Mcq | QuestionType::TrueFalse => scalar_equal(student, key),
        QuestionType::MultiAnswer => multiset_equal(student, key),
        QuestionType::Identification => any_variant_equal(student, key),
        QuestionType::Matching => matching_equal(student, key),
        QuestionType::Ordering => ordering_equal(student, key),
    }
}

fn scalar_equal(student: &AnswerValue, key: &AnswerValue) -> bool {
    match (student, key) {
        (AnswerValue::Text(s), AnswerValue::Text(k)) => normalize(s) == normalize(k),
        _ => false,
    }
}

/// Order-independent list equality. Duplicates are not deduplicated: a
/// length mismatch alone fails the comparison.
fn multiset_equal(student: &AnswerValue, key: &AnswerValue) -> bool {
    let (AnswerValue::List(student), AnswerValue::List(key)) = (student, key) else {
        return false;
    };
    if student.len() != key.len() {
        return false;
    }
    let student: Vec<String> = student.iter().map(|s| normalize(s)).collect();
    let key: Vec<String> = key.iter().map(|k| normalize(k)).collect();
    student.iter().all(|s| key.contains(s)) && key.iter().all(|k| student.contains(k))
}

/// Key holds the accepted variants; any normalized match is correct
fn any_variant_equal(student: &AnswerValue, key: &AnswerValue) -> bool {
    let (AnswerValue::Text(student), AnswerValue::List(variants)) = (student, key) else {
        return false;
    };
    let student = normalize(student);
    variants.iter().any(|v| normalize(v) == student)
}

/// Student answer lists chosen definitions in term order; every position
/// must match its key definition. All-or-nothing, no partial credit.
fn matching_equal(student: &AnswerValue, key: &AnswerValue) -> bool {
    let (AnswerValue::List(student), AnswerValue::Pairs(pairs)) = (student, key) else {
        return false;
    };
    if student.len() != pairs.len() {
        return false;
    }
    student
        .iter()
        .zip(pairs.iter())
        .all(|(s, pair)| normalize(s) == normalize(&pair.definition))
}

/// Every position must hold the item the key puts there. All-or-nothing.
fn ordering_equal(student: &AnswerValue, key: &AnswerValue) -> bool {
    let (AnswerValue::List(student), AnswerValue::List(key)) = (student, key) else {
        return false;
    };
    if student.len() != key.len() {
        return false;
    }
    student
        .iter()
        .zip(key.iter())
        .all(|(s, k)| normalize(s) == normalize(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchPair;

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.to_string())
    }

    fn list(items: &[&str]) -> AnswerValue {
        AnswerValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    fn pairs(entries: &[(&str, &str)]) -> AnswerValue {
        AnswerValue::Pairs(
            entries
                .iter()
                .map(|(term, definition)| MatchPair {
                    term: term.to_string(),
                    definition: definition.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_mcq_normalizes_case_and_whitespace() {
        let key = text("choice_b");
        assert!(is_correct(QuestionType::Mcq, Some(&text("Choice_B ")), &key));
        assert!(!is_correct(QuestionType::Mcq, Some(&text("choice_a")), &key));
    }

    #[test]
    fn test_true_false_scalar() {
        let key = text("true");
        assert!(is_correct(QuestionType::TrueFalse, Some(&text(" True")), &key));
        assert!(!is_correct(QuestionType::TrueFalse, Some(&text("false")), &key));
    }

    #[test]
    fn test_absent_answer_is_incorrect_not_an_error() {
        assert!(!is_correct(QuestionType::Mcq, None, &text("choice_a")));
        assert!(!is_correct(QuestionType::Ordering, None, &list(&["a", "b"])));
    }

    #[test]
    fn test_multi_answer_is_order_independent() {
        let key = list(&["c1", "c3"]);
        assert!(is_correct(QuestionType::MultiAnswer, Some(&list(&["c3", "c1"])), &key));
        assert!(is_correct(QuestionType::MultiAnswer, Some(&list(&["c1", "c3"])), &key));
    }

    #[test]
    fn test_multi_answer_length_mismatch_fails() {
        let key = list(&["c1", "c3"]);
        assert!(!is_correct(QuestionType::MultiAnswer, Some(&list(&["c1"])), &key));
        assert!(!is_correct(
            QuestionType::MultiAnswer,
            Some(&list(&["c1", "c3", "c2"])),
            &key
        ));
    }

    #[test]
    fn test_identification_accepts_any_variant() {
        let key = list(&["Paris", "Paris City"]);
        assert!(is_correct(
            QuestionType::Identification,
            Some(&text("  paris")),
            &key
        ));
        assert!(is_correct(
            QuestionType::Identification,
            Some(&text("PARIS CITY")),
            &key
        ));
        assert!(!is_correct(
            QuestionType::Identification,
            Some(&text("London")),
            &key
        ));
    }

    #[test]
    fn test_matching_is_positional_all_or_nothing() {
        let key = pairs(&[("A", "X"), ("B", "Y")]);
        assert!(is_correct(QuestionType::Matching, Some(&list(&["X", "Y"])), &key));
        // One wrong position zeroes the whole item
        assert!(!is_correct(QuestionType::Matching, Some(&list(&["X", "Z"])), &key));
        // Permutation is not forgiven for matching
        assert!(!is_correct(QuestionType::Matching, Some(&list(&["Y", "X"])), &key));
    }

    #[test]
    fn test_ordering_is_positional_all_or_nothing() {
        let key = list(&["first", "second", "third"]);
        assert!(is_correct(
            QuestionType::Ordering,
            Some(&list(&["First ", "second", "THIRD"])),
            &key
        ));
        assert!(!is_correct(
            QuestionType::Ordering,
            Some(&list(&["second", "first", "third"])),
            &key
        ));
    }

    #[test]
    fn test_shape_mismatch_is_incorrect() {
        assert!(!is_correct(QuestionType::Mcq, Some(&list(&["c1"])), &text("c1")));
        assert!(!is_correct(
            QuestionType::MultiAnswer,
            Some(&text("c1")),
            &list(&["c1"])
        ));
    }
}
