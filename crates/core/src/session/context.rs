use crate::answer::{GradeOutcome, disclose, judge_generated};
use crate::model::{HighScores, Question, QuestionId, QuizMode, ScoredMode};

use super::state::{LoadRequest, Phase, Session};
use super::token::{Ticket, TokenIssuer};
use super::TransitionError;

/// A request issued by the session, tagged with the ticket its result must carry back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued<T> {
    pub ticket: Ticket,
    pub request: T,
}

/// Remote grading request for a typed standard-mode answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRequest {
    pub question_id: QuestionId,
    /// The answer exactly as typed; the grader does its own normalization.
    pub answer: String,
    pub mode: ScoredMode,
}

/// Asynchronous result delivered back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    QuestionsLoaded(Vec<Question>),
    LoadFailed(String),
    Graded {
        outcome: GradeOutcome,
        fact: Option<String>,
    },
    FactFetched(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub ticket: Ticket,
    pub event: SessionEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The question was already answered; nothing happened.
    Ignored,
    /// Judged locally and settled immediately.
    Judged(GradeOutcome),
    /// Awaiting the remote grade and fact for this request.
    Remote(Issued<GradeRequest>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    Ignored,
    /// The answer was disclosed; a fact lookup follows when a request is present.
    Revealed { fact_request: Option<Issued<QuestionId>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Complete {
        score: u32,
        /// Set when this run beat the stored best for its mode.
        new_high_score: Option<ScoredMode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// Issued for a superseded session or an earlier question; dropped.
    Stale,
}

/// Everything a running quiz needs: the session, its token issuer and the
/// high-score snapshot, passed explicitly instead of living in globals.
#[derive(Debug, Default)]
pub struct SessionContext {
    session: Session,
    tokens: TokenIssuer,
    high_scores: HighScores,
}

impl SessionContext {
    #[must_use]
    pub fn new(high_scores: HighScores) -> Self {
        Self {
            session: Session::new(),
            tokens: TokenIssuer::new(),
            high_scores,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Start a session for `mode`, superseding anything in flight.
    pub fn select_mode(&mut self, mode: QuizMode) -> Issued<LoadRequest> {
        self.start(LoadRequest { mode, fresh: false })
    }

    /// Play the finished mode again; generated quizzes ask for a fresh set.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidPhase` unless the session is complete.
    pub fn replay(&mut self) -> Result<Issued<LoadRequest>, TransitionError> {
        self.session.expect_phase(Phase::Complete, "replay")?;
        let mode = self
            .session
            .mode()
            .cloned()
            .ok_or(TransitionError::NoMode)?;
        let fresh = mode.is_generated();
        Ok(self.start(LoadRequest { mode, fresh }))
    }

    /// Re-issue the request that just failed.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidPhase` unless the last load failed.
    pub fn retry(&mut self) -> Result<Issued<LoadRequest>, TransitionError> {
        self.session.expect_phase(Phase::LoadFailed, "retry")?;
        let request = self
            .session
            .request()
            .cloned()
            .ok_or(TransitionError::NoMode)?;
        Ok(self.start(request))
    }

    /// Return to mode selection, invalidating every in-flight result.
    pub fn to_menu(&mut self) {
        self.tokens.mint();
        self.session.clear();
    }

    /// Submit a typed answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidPhase` when no question is awaiting an answer.
    pub fn submit(&mut self, answer: &str) -> Result<Submission, TransitionError> {
        if self.session.is_answered() {
            return Ok(Submission::Ignored);
        }
        self.session.expect_phase(Phase::Active, "submit an answer")?;

        match self.current_question()? {
            Question::Generated(question) => {
                let outcome = judge_generated(&question, answer);
                self.session.settle_locally(
                    outcome.clone(),
                    question.fact().map(str::to_string),
                    false,
                )?;
                Ok(Submission::Judged(outcome))
            }
            Question::Standard(question) => {
                let mode = self.scored_mode()?;
                self.session.begin_remote_grade()?;
                Ok(Submission::Remote(Issued {
                    ticket: self.ticket(),
                    request: GradeRequest {
                        question_id: question.id(),
                        answer: answer.to_string(),
                        mode,
                    },
                }))
            }
        }
    }

    /// Choose one of the current question's options.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NoOptions` for typed-answer questions and
    /// `TransitionError::UnknownOption` when `option` is not offered.
    pub fn select_option(&mut self, option: &str) -> Result<Submission, TransitionError> {
        if self.session.is_answered() {
            return Ok(Submission::Ignored);
        }
        self.session.expect_phase(Phase::Active, "select an option")?;

        match self.current_question()? {
            Question::Standard(_) => Err(TransitionError::NoOptions),
            Question::Generated(question) if !question.has_option(option) => {
                Err(TransitionError::UnknownOption {
                    option: option.to_string(),
                })
            }
            Question::Generated(_) => self.submit(option),
        }
    }

    /// Give up on the current question and reveal the answer without scoring.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidPhase` when no question is awaiting an answer.
    pub fn skip(&mut self) -> Result<Skip, TransitionError> {
        if self.session.is_answered() {
            return Ok(Skip::Ignored);
        }
        self.session.expect_phase(Phase::Active, "skip")?;

        let question = self.current_question()?;
        let mode = self.session.mode().cloned().ok_or(TransitionError::NoMode)?;
        let outcome = GradeOutcome::revealed(disclose(&question, &mode));

        match question {
            Question::Standard(question) => {
                self.session.settle_locally(outcome, None, true)?;
                Ok(Skip::Revealed {
                    fact_request: Some(Issued {
                        ticket: self.ticket(),
                        request: question.id(),
                    }),
                })
            }
            Question::Generated(question) => {
                self.session.settle_locally(
                    outcome,
                    question.fact().map(str::to_string),
                    false,
                )?;
                Ok(Skip::Revealed { fact_request: None })
            }
        }
    }

    /// Move to the next question or finish the session.
    ///
    /// On completion of a standard mode the high-score snapshot is raised when beaten;
    /// the caller persists it.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidPhase` unless the current question is answered,
    /// or `TransitionError::GradePending` while its grade is still in flight.
    pub fn advance(&mut self) -> Result<Advance, TransitionError> {
        let complete = self.session.advance()?;
        if !complete {
            return Ok(Advance::Next {
                index: self.session.current_index(),
            });
        }

        let score = self.session.score();
        let new_high_score = match self.session.mode().and_then(QuizMode::scored) {
            Some(mode) if self.high_scores.record(mode, score) => Some(mode),
            _ => None,
        };
        Ok(Advance::Complete {
            score,
            new_high_score,
        })
    }

    /// Apply an asynchronous result if it still belongs to the current question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when a current result does not fit the session phase.
    pub fn apply(&mut self, update: SessionUpdate) -> Result<Applied, TransitionError> {
        if !self.tokens.is_current(update.ticket.token)
            || update.ticket.index != self.session.current_index()
        {
            return Ok(Applied::Stale);
        }

        match update.event {
            SessionEvent::QuestionsLoaded(questions) => self.session.install(questions)?,
            SessionEvent::LoadFailed(message) => self.session.fail_load(message)?,
            SessionEvent::Graded { outcome, fact } => self.session.settle_grade(outcome, fact)?,
            SessionEvent::FactFetched(fact) => self.session.backfill_fact(fact)?,
        }
        Ok(Applied::Applied)
    }

    fn start(&mut self, request: LoadRequest) -> Issued<LoadRequest> {
        self.tokens.mint();
        self.session.begin_loading(request.clone());
        Issued {
            ticket: self.ticket(),
            request,
        }
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            token: self.tokens.current(),
            index: self.session.current_index(),
        }
    }

    fn current_question(&self) -> Result<Question, TransitionError> {
        self.session
            .current_question()
            .cloned()
            .ok_or(TransitionError::InvalidPhase {
                action: "read the current question",
                phase: self.session.phase(),
            })
    }

    fn scored_mode(&self) -> Result<ScoredMode, TransitionError> {
        self.session
            .mode()
            .and_then(QuizMode::scored)
            .ok_or(TransitionError::NoMode)
    }
}
