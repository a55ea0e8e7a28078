use std::fmt;

use crate::answer::{GradeOutcome, ResultKind};
use crate::model::{Question, QuizMode};

use super::TransitionError;

/// Shown when the question source answered with nothing to play.
pub const EMPTY_QUIZ_MESSAGE: &str = "Could not load trivia questions. Please try again later.";

/// Shown when the source returned questions of the wrong kind for the mode.
pub const MISMATCHED_QUIZ_MESSAGE: &str =
    "Received questions that do not match the selected game mode.";

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ModeSelect,
    Loading,
    /// Questions could not be loaded; the player may retry or return to the menu.
    LoadFailed,
    Active,
    /// The current question has an answer; the grade may still be pending.
    Answered,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::ModeSelect => "selecting a mode",
            Phase::Loading => "loading questions",
            Phase::LoadFailed => "showing a load error",
            Phase::Active => "waiting for an answer",
            Phase::Answered => "showing an answer",
            Phase::Complete => "showing the final score",
        };
        f.write_str(label)
    }
}

/// Displayed verdict for the current question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerResult {
    pub kind: ResultKind,
    pub message: Option<String>,
}

/// What the question provider is asked for when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub mode: QuizMode,
    /// Ask the generator for a novel set instead of a cached one.
    pub fresh: bool,
}

/// Aggregated view of session progress, useful for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub score: u32,
    /// One-based position of the current question, capped at `total`.
    pub position: usize,
    pub total: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one quiz run.
///
/// Mutated only through `SessionContext`, which gates asynchronous results by token.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    request: Option<LoadRequest>,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    awaiting_grade: bool,
    awaiting_fact: bool,
    result: AnswerResult,
    pending_fact: Option<String>,
    load_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::ModeSelect,
            request: None,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            awaiting_grade: false,
            awaiting_fact: false,
            result: AnswerResult::default(),
            pending_fact: None,
            load_error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn mode(&self) -> Option<&QuizMode> {
        self.request.as_ref().map(|request| &request.mode)
    }

    #[must_use]
    pub fn request(&self) -> Option<&LoadRequest> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.phase == Phase::Answered
    }

    #[must_use]
    pub fn is_awaiting_grade(&self) -> bool {
        self.awaiting_grade
    }

    #[must_use]
    pub fn is_awaiting_fact(&self) -> bool {
        self.awaiting_fact
    }

    #[must_use]
    pub fn result(&self) -> &AnswerResult {
        &self.result
    }

    #[must_use]
    pub fn pending_fact(&self) -> Option<&str> {
        self.pending_fact.as_deref()
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The session is over once every question has been advanced past.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Active | Phase::Answered => self.questions.get(self.current_index),
            _ => None,
        }
    }

    #[must_use]
    pub fn current_prompt(&self) -> Option<String> {
        let mode = self.mode()?;
        self.current_question().map(|question| question.prompt(mode))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        SessionProgress {
            score: self.score,
            position: (self.current_index + 1).min(total),
            total,
            is_complete: self.phase == Phase::Complete,
        }
    }

    pub(crate) fn expect_phase(
        &self,
        expected: Phase,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    /// Clear all per-session state and wait for questions.
    pub(crate) fn begin_loading(&mut self, request: LoadRequest) {
        *self = Self {
            phase: Phase::Loading,
            request: Some(request),
            ..Self::new()
        };
    }

    pub(crate) fn install(&mut self, questions: Vec<Question>) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Loading, "install questions")?;

        if questions.is_empty() {
            return self.fail_load(EMPTY_QUIZ_MESSAGE.to_string());
        }
        let fits = self
            .mode()
            .is_some_and(|mode| questions.iter().all(|question| question.fits(mode)));
        if !fits {
            return self.fail_load(MISMATCHED_QUIZ_MESSAGE.to_string());
        }

        self.questions = questions;
        self.current_index = 0;
        self.phase = Phase::Active;
        Ok(())
    }

    pub(crate) fn fail_load(&mut self, message: String) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Loading, "report a load failure")?;
        self.questions.clear();
        self.load_error = Some(message);
        self.phase = Phase::LoadFailed;
        Ok(())
    }

    /// Lock the current question while a remote grade and fact are in flight.
    pub(crate) fn begin_remote_grade(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Active, "submit an answer")?;
        self.phase = Phase::Answered;
        self.awaiting_grade = true;
        self.awaiting_fact = true;
        Ok(())
    }

    pub(crate) fn settle_grade(
        &mut self,
        outcome: GradeOutcome,
        fact: Option<String>,
    ) -> Result<(), TransitionError> {
        if self.phase != Phase::Answered || !self.awaiting_grade {
            return Err(TransitionError::InvalidPhase {
                action: "apply a grade",
                phase: self.phase,
            });
        }
        self.awaiting_grade = false;
        self.awaiting_fact = false;
        self.apply_outcome(outcome);
        self.pending_fact = fact;
        Ok(())
    }

    /// Answer synchronously (local judging or skip).
    pub(crate) fn settle_locally(
        &mut self,
        outcome: GradeOutcome,
        fact: Option<String>,
        fact_follows: bool,
    ) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Active, "answer")?;
        self.phase = Phase::Answered;
        self.awaiting_fact = fact_follows;
        self.apply_outcome(outcome);
        self.pending_fact = fact;
        Ok(())
    }

    pub(crate) fn backfill_fact(&mut self, fact: Option<String>) -> Result<(), TransitionError> {
        if self.phase != Phase::Answered || !self.awaiting_fact || self.awaiting_grade {
            return Err(TransitionError::InvalidPhase {
                action: "show a fact",
                phase: self.phase,
            });
        }
        self.awaiting_fact = false;
        self.pending_fact = fact;
        Ok(())
    }

    /// Move past the answered question. Returns `true` when that was the last one.
    pub(crate) fn advance(&mut self) -> Result<bool, TransitionError> {
        self.expect_phase(Phase::Answered, "advance")?;
        if self.awaiting_grade {
            return Err(TransitionError::GradePending);
        }

        self.current_index += 1;
        self.awaiting_fact = false;
        self.result = AnswerResult::default();
        self.pending_fact = None;
        self.phase = if self.is_over() {
            Phase::Complete
        } else {
            Phase::Active
        };
        Ok(self.phase == Phase::Complete)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    fn apply_outcome(&mut self, outcome: GradeOutcome) {
        self.score = self.score.saturating_add(outcome.points);
        self.result = AnswerResult {
            kind: outcome.kind,
            message: Some(outcome.message),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, StandardQuestion};

    fn standard(id: u64, name: &str, capital: &str) -> Question {
        StandardQuestion::new(QuestionId::new(id), name, capital, "Europe")
            .unwrap()
            .into()
    }

    fn loading(mode: QuizMode) -> Session {
        let mut session = Session::new();
        session.begin_loading(LoadRequest { mode, fresh: false });
        session
    }

    #[test]
    fn new_session_selects_mode() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::ModeSelect);
        assert!(session.mode().is_none());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn empty_questions_fail_the_load() {
        let mut session = loading(QuizMode::Capital);
        session.install(Vec::new()).unwrap();
        assert_eq!(session.phase(), Phase::LoadFailed);
        assert_eq!(session.load_error(), Some(EMPTY_QUIZ_MESSAGE));
    }

    #[test]
    fn mismatched_questions_fail_the_load() {
        let mut session = loading(QuizMode::generated("Formula 1").unwrap());
        session
            .install(vec![standard(1, "France", "Paris")])
            .unwrap();
        assert_eq!(session.phase(), Phase::LoadFailed);
        assert_eq!(session.load_error(), Some(MISMATCHED_QUIZ_MESSAGE));
    }

    #[test]
    fn advance_requires_settled_grade() {
        let mut session = loading(QuizMode::Capital);
        session
            .install(vec![standard(1, "France", "Paris")])
            .unwrap();
        session.begin_remote_grade().unwrap();
        assert!(matches!(
            session.advance(),
            Err(TransitionError::GradePending)
        ));

        session
            .settle_grade(GradeOutcome::correct("Correct!", 1), None)
            .unwrap();
        assert!(session.advance().unwrap());
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(session.current_index(), 1);
        assert!(session.is_over());
    }

    #[test]
    fn progress_reports_one_based_position() {
        let mut session = loading(QuizMode::Country);
        session
            .install(vec![standard(1, "France", "Paris"), standard(2, "Italy", "Rome")])
            .unwrap();
        let progress = session.progress();
        assert_eq!(progress.position, 1);
        assert_eq!(progress.total, 2);
        assert_eq!(
            session.current_prompt().as_deref(),
            Some("Paris is the capital of which country?")
        );
    }
}
