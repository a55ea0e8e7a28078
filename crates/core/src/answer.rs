//! Answer normalization and the locally computed parts of grading.

use crate::model::{GeneratedQuestion, Question, QuizMode};

/// Message shown when the grading service could not be reached.
pub const GRADING_FALLBACK_MESSAGE: &str = "Error grading answer. Please try again.";

const STRIPPED_CHARS: [char; 4] = ['\'', ',', '.', '-'];

/// Canonical form used for answer comparison.
///
/// Lowercases, drops `' , . -` and trims surrounding whitespace. Trimming runs last so
/// the result is a fixed point: `normalize_answer(normalize_answer(a)) == normalize_answer(a)`.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    let stripped: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();
    stripped.trim().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultKind {
    /// No verdict: nothing answered yet, or the answer was revealed on skip.
    #[default]
    None,
    Correct,
    Incorrect,
}

/// Verdict returned by the remote grading service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVerdict {
    pub is_correct: bool,
    pub feedback_message: String,
    pub points_awarded: Option<u32>,
    pub shared_capital_info: Option<String>,
}

/// Settled result for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub kind: ResultKind,
    pub message: String,
    pub points: u32,
}

impl GradeOutcome {
    #[must_use]
    pub fn correct(message: impl Into<String>, points: u32) -> Self {
        Self {
            kind: ResultKind::Correct,
            message: message.into(),
            points,
        }
    }

    #[must_use]
    pub fn incorrect(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Incorrect,
            message: message.into(),
            points: 0,
        }
    }

    /// Neutral, unscored outcome used when the player skips.
    #[must_use]
    pub fn revealed(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::None,
            message: message.into(),
            points: 0,
        }
    }

    /// Outcome used when the grading call failed; never scores.
    #[must_use]
    pub fn grading_failed() -> Self {
        Self::incorrect(GRADING_FALLBACK_MESSAGE)
    }

    #[must_use]
    pub fn from_remote(verdict: &RemoteVerdict) -> Self {
        let mut message = verdict.feedback_message.clone();
        if let Some(info) = verdict
            .shared_capital_info
            .as_deref()
            .map(str::trim)
            .filter(|info| !info.is_empty())
        {
            message.push_str(&format!(" ({info})"));
        }

        if verdict.is_correct {
            Self::correct(message, points_for(true, verdict.points_awarded))
        } else {
            Self::incorrect(message)
        }
    }
}

/// Points a verdict is worth: the awarded amount when given, else one per correct answer.
#[must_use]
pub fn points_for(is_correct: bool, points_awarded: Option<u32>) -> u32 {
    match (is_correct, points_awarded) {
        (false, _) => 0,
        (true, Some(points)) => points,
        (true, None) => 1,
    }
}

/// Judge a generated-quiz answer locally.
#[must_use]
pub fn judge_generated(question: &GeneratedQuestion, selected: &str) -> GradeOutcome {
    if normalize_answer(selected) == normalize_answer(question.correct_answer()) {
        GradeOutcome::correct("Correct!", 1)
    } else {
        GradeOutcome::incorrect(format!(
            "Incorrect! The correct answer is {}.",
            question.correct_answer()
        ))
    }
}

/// Correct-answer disclosure shown on skip.
#[must_use]
pub fn disclose(question: &Question, mode: &QuizMode) -> String {
    match (question, mode.scored()) {
        (Question::Standard(q), Some(scored)) => q.disclosure(scored),
        (Question::Standard(q), None) => q.disclosure(crate::model::ScoredMode::Capital),
        (Question::Generated(q), _) => q.disclosure(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, StandardQuestion};

    fn generated() -> GeneratedQuestion {
        GeneratedQuestion::new(
            QuestionId::new(1),
            "What is the capital of France?",
            vec!["Paris".into(), "Rome".into(), "Berlin".into(), "Madrid".into()],
            "Paris",
            Some("Paris hosted the 1900 Olympics.".into()),
        )
        .unwrap()
    }

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize_answer(" Nassau. "), normalize_answer("nassau"));
        assert_eq!(normalize_answer("Port-au-Prince"), "portauprince");
        assert_eq!(normalize_answer("St. John's"), "st johns");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [" Nassau. ", "a .", "  -Rome-  ", "", "Ñuñoa", "N'Djamena"] {
            let once = normalize_answer(raw);
            assert_eq!(normalize_answer(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn generated_judging_matches_normalized_answer() {
        let q = generated();
        let outcome = judge_generated(&q, "  paris. ");
        assert_eq!(outcome.kind, ResultKind::Correct);
        assert_eq!(outcome.points, 1);
        assert_eq!(outcome.message, "Correct!");
    }

    #[test]
    fn generated_judging_reports_correct_answer_on_miss() {
        let outcome = judge_generated(&generated(), "Rome");
        assert_eq!(outcome.kind, ResultKind::Incorrect);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.message, "Incorrect! The correct answer is Paris.");
    }

    #[test]
    fn remote_verdict_uses_awarded_points() {
        let verdict = RemoteVerdict {
            is_correct: true,
            feedback_message: "Correct!".into(),
            points_awarded: Some(2),
            shared_capital_info: Some("Also the capital of Vatican City".into()),
        };
        let outcome = GradeOutcome::from_remote(&verdict);
        assert_eq!(outcome.kind, ResultKind::Correct);
        assert_eq!(outcome.points, 2);
        assert_eq!(
            outcome.message,
            "Correct! (Also the capital of Vatican City)"
        );
    }

    #[test]
    fn remote_verdict_ignores_points_when_incorrect() {
        let verdict = RemoteVerdict {
            is_correct: false,
            feedback_message: "Not quite.".into(),
            points_awarded: Some(3),
            shared_capital_info: None,
        };
        let outcome = GradeOutcome::from_remote(&verdict);
        assert_eq!(outcome.kind, ResultKind::Incorrect);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.message, "Not quite.");
    }

    #[test]
    fn points_default_to_one() {
        assert_eq!(points_for(true, None), 1);
        assert_eq!(points_for(true, Some(0)), 0);
        assert_eq!(points_for(false, None), 0);
    }

    #[test]
    fn skip_disclosure_per_mode() {
        let q: Question =
            StandardQuestion::new(QuestionId::new(9), "Jamaica", "Kingston", "North America")
                .unwrap()
                .into();
        assert_eq!(
            disclose(&q, &QuizMode::Country),
            "Kingston is the capital of Jamaica."
        );
        assert_eq!(
            disclose(&q, &QuizMode::Capital),
            "The capital(s) of Jamaica are: Kingston."
        );
        let g: Question = generated().into();
        assert_eq!(
            disclose(&g, &QuizMode::generated("Geography").unwrap()),
            "The correct answer is Paris."
        );
    }
}
