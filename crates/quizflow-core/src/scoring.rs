//! Answer classification and session scoring.
//!
//! Comparison is set-based for every question kind: order, casing and
//! surrounding whitespace never matter. Partial answers are reported for
//! review but only exact matches count towards the score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answers::normalize;
use crate::model::{AnswerSelection, Question, UserAnswers};

/// How a user's answer relates to the canonical answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Correct,
    Partial,
    Incorrect,
    Unanswered,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Correct => write!(f, "correct"),
            Classification::Partial => write!(f, "partial"),
            Classification::Incorrect => write!(f, "incorrect"),
            Classification::Unanswered => write!(f, "unanswered"),
        }
    }
}

/// Classify a single answer against a question's canonical answers.
pub fn classify(question: &Question, user_answer: &AnswerSelection) -> Classification {
    if user_answer.is_empty() {
        return Classification::Unanswered;
    }

    let user = normalize(user_answer.iter());
    let correct = normalize(question.correct_answers());

    if user == correct {
        Classification::Correct
    } else if user.intersects(&correct) {
        Classification::Partial
    } else {
        Classification::Incorrect
    }
}

/// Numeric result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct_count: usize,
    pub total_count: usize,
    /// Whole-number percentage, rounded half up.
    pub percentage: u32,
}

/// Round-half-up percentage of `correct` out of `total`; zero when `total`
/// is zero.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // floor(100c/t + 1/2) without floating point.
    let scaled = (200 * correct as u64 + total as u64) / (2 * total as u64);
    scaled as u32
}

/// Score a set of answers against the questions they belong to.
pub fn score(questions: &[Question], answers: &UserAnswers) -> ScoreSummary {
    let correct_count = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| classify(q, answers.get(*i)) == Classification::Correct)
        .count();
    let total_count = questions.len();

    ScoreSummary {
        correct_count,
        total_count,
        percentage: percentage(correct_count, total_count),
    }
}

/// A question paired with the user's answer and its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedQuestion {
    pub index: usize,
    pub question: Question,
    pub user_answer: AnswerSelection,
    pub classification: Classification,
}

/// Grade every question for the review view.
pub fn grade(questions: &[Question], answers: &UserAnswers) -> Vec<GradedQuestion> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = answers.get(index).clone();
            GradedQuestion {
                index,
                classification: classify(question, &user_answer),
                question: question.clone(),
                user_answer,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn question(correct: &[&str]) -> Question {
        Question::new("Q", strings(&["A", "B", "C", "D"]), strings(correct))
    }

    fn selection(items: &[&str]) -> AnswerSelection {
        items.iter().copied().collect()
    }

    #[test]
    fn trailing_space_and_case_still_correct() {
        let q = Question::new("Capital?", strings(&["Paris", "Rome"]), strings(&["Paris"]));
        assert_eq!(classify(&q, &selection(&["paris "])), Classification::Correct);
    }

    #[test]
    fn multi_select_partial_credit() {
        let q = question(&["A", "B"]);
        assert_eq!(classify(&q, &selection(&["A"])), Classification::Partial);
        assert_eq!(classify(&q, &selection(&["A", "B"])), Classification::Correct);
        assert_eq!(classify(&q, &selection(&["B", "A"])), Classification::Correct);
        assert_eq!(classify(&q, &selection(&["C"])), Classification::Incorrect);
        assert_eq!(classify(&q, &selection(&[])), Classification::Unanswered);
    }

    #[test]
    fn extra_wrong_option_is_partial() {
        let q = question(&["A", "B"]);
        assert_eq!(
            classify(&q, &selection(&["A", "B", "C"])),
            Classification::Partial
        );
    }

    #[test]
    fn classify_is_deterministic() {
        let q = question(&["A", "C"]);
        let answer = selection(&["c", "D"]);
        let first = classify(&q, &answer);
        for _ in 0..10 {
            assert_eq!(classify(&q, &answer), first);
        }
    }

    #[test]
    fn question_without_canonical_answers_is_never_correct() {
        let q = question(&[]);
        assert_eq!(classify(&q, &selection(&["A"])), Classification::Incorrect);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(3, 5), 60);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn score_counts_only_correct() {
        let questions = vec![
            question(&["A"]),
            question(&["B"]),
            question(&["C"]),
            question(&["A", "B"]),
            question(&["D"]),
        ];
        let answers: UserAnswers = vec![
            selection(&["a"]),
            selection(&["B"]),
            selection(&["C "]),
            selection(&["A"]),
            selection(&[]),
        ]
        .into_iter()
        .collect();

        let summary = score(&questions, &answers);
        assert_eq!(summary.correct_count, 3);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.percentage, 60);

        let graded = grade(&questions, &answers);
        assert_eq!(graded[3].classification, Classification::Partial);
        assert_eq!(graded[4].classification, Classification::Unanswered);
    }

    #[test]
    fn empty_session_scores_zero() {
        let summary = score(&[], &UserAnswers::default());
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.percentage, 0);
    }
}
