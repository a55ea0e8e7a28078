//! Drives a `SessionContext` against the remote services.
//!
//! Actions return the asynchronous work they started as a `PendingUpdate`. The caller
//! awaits it whenever it likes and feeds the result back through `apply`; anything
//! that finished after the player moved on is dropped there.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use quiz_core::model::{HighScores, QuestionId, QuizMode};
use quiz_core::session::{
    Advance, Applied, GradeRequest, Issued, LoadRequest, Session, SessionContext, SessionEvent,
    SessionUpdate, Skip, Submission,
};

use crate::error::ControllerError;
use crate::grader::AnswerGrader;
use crate::high_scores::HighScoreStore;
use crate::provider::QuestionProvider;
use crate::sources::{IssueReport, IssueType, ReportSink};

pub type PendingUpdate = Pin<Box<dyn Future<Output = SessionUpdate> + Send>>;

pub struct SessionController {
    provider: QuestionProvider,
    grader: AnswerGrader,
    high_scores: HighScoreStore,
    reports: Arc<dyn ReportSink>,
    context: SessionContext,
}

impl SessionController {
    /// Build a controller with an empty high-score snapshot.
    #[must_use]
    pub fn new(
        provider: QuestionProvider,
        grader: AnswerGrader,
        high_scores: HighScoreStore,
        reports: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            provider,
            grader,
            high_scores,
            reports,
            context: SessionContext::default(),
        }
    }

    /// Build a controller and read the stored high scores once.
    ///
    /// An unreadable store is logged and treated as empty.
    pub async fn start(
        provider: QuestionProvider,
        grader: AnswerGrader,
        high_scores: HighScoreStore,
        reports: Arc<dyn ReportSink>,
    ) -> Self {
        let snapshot = match high_scores.load_all().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "could not read high scores; starting from zero");
                HighScores::default()
            }
        };
        let mut controller = Self::new(provider, grader, high_scores, reports);
        controller.context = SessionContext::new(snapshot);
        controller
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.context.session()
    }

    #[must_use]
    pub fn high_scores(&self) -> &HighScores {
        self.context.high_scores()
    }

    pub fn select_mode(&mut self, mode: QuizMode) -> PendingUpdate {
        info!(%mode, "starting quiz");
        let issued = self.context.select_mode(mode);
        self.load(issued)
    }

    /// # Errors
    ///
    /// Returns `ControllerError` unless the session is complete.
    pub fn replay(&mut self) -> Result<PendingUpdate, ControllerError> {
        let issued = self.context.replay()?;
        info!(mode = %issued.request.mode, fresh = issued.request.fresh, "replaying quiz");
        Ok(self.load(issued))
    }

    /// # Errors
    ///
    /// Returns `ControllerError` unless the last load failed.
    pub fn retry(&mut self) -> Result<PendingUpdate, ControllerError> {
        let issued = self.context.retry()?;
        Ok(self.load(issued))
    }

    pub fn to_menu(&mut self) {
        self.context.to_menu();
    }

    /// Submit a typed answer. Remote grading is returned as pending work.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` when no question is awaiting an answer.
    pub fn submit_answer(&mut self, answer: &str) -> Result<Option<PendingUpdate>, ControllerError> {
        let submission = self.context.submit(answer)?;
        Ok(self.follow_up(submission))
    }

    /// # Errors
    ///
    /// Returns `ControllerError` for typed-answer questions or unknown options.
    pub fn select_option(&mut self, option: &str) -> Result<Option<PendingUpdate>, ControllerError> {
        let submission = self.context.select_option(option)?;
        Ok(self.follow_up(submission))
    }

    /// Reveal the answer; a fact lookup may follow.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` when no question is awaiting an answer.
    pub fn skip(&mut self) -> Result<Option<PendingUpdate>, ControllerError> {
        match self.context.skip()? {
            Skip::Revealed {
                fact_request: Some(issued),
            } => Ok(Some(self.fetch_fact(issued))),
            Skip::Revealed { fact_request: None } | Skip::Ignored => Ok(None),
        }
    }

    /// Move on; on completion a beaten high score is written to the store.
    ///
    /// A failing store is logged, never propagated.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` unless the current answer has settled.
    pub async fn advance(&mut self) -> Result<Advance, ControllerError> {
        let advance = self.context.advance()?;
        if let Advance::Complete {
            score,
            new_high_score: Some(mode),
        } = advance
        {
            match self.high_scores.set_if_greater(mode, score).await {
                Ok(_) => info!(%mode, score, "new high score"),
                Err(err) => warn!(%mode, score, error = %err, "could not store high score"),
            }
        }
        Ok(advance)
    }

    /// Apply a finished result; stale ones are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` when a current result does not fit the session.
    pub fn apply(&mut self, update: SessionUpdate) -> Result<Applied, ControllerError> {
        let ticket = update.ticket;
        let applied = self.context.apply(update)?;
        if applied == Applied::Stale {
            debug!(
                token = %ticket.token,
                index = ticket.index,
                current = %self.context.tokens().current(),
                "dropped stale result"
            );
        }
        Ok(applied)
    }

    /// Await pending work and apply its result.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` when a current result does not fit the session.
    pub async fn settle(&mut self, pending: PendingUpdate) -> Result<Applied, ControllerError> {
        let update = pending.await;
        self.apply(update)
    }

    /// Report a problem with the current question. Returns whether the report was sent.
    pub async fn report_issue(&self, issue_type: IssueType, note: &str) -> bool {
        let question = self.context.session().current_question();
        let report = IssueReport {
            issue_type,
            user_note: note.trim().to_string(),
            country_name: question.and_then(|q| q.country_name()).map(str::to_string),
            question_id: question.map(|q| q.id()),
        };

        match self.reports.submit_issue(&report).await {
            Ok(()) => {
                info!(issue = %issue_type, "issue reported");
                true
            }
            Err(err) => {
                warn!(issue = %issue_type, error = %err, "could not send issue report");
                false
            }
        }
    }

    fn follow_up(&self, submission: Submission) -> Option<PendingUpdate> {
        match submission {
            Submission::Remote(issued) => Some(self.grade(issued)),
            Submission::Judged(_) | Submission::Ignored => None,
        }
    }

    fn load(&self, issued: Issued<LoadRequest>) -> PendingUpdate {
        let provider = self.provider.clone();
        Box::pin(async move {
            let event = match provider.load(&issued.request).await {
                Ok(questions) => SessionEvent::QuestionsLoaded(questions),
                Err(err) => {
                    warn!(error = %err, status = err.status(), "could not load questions");
                    SessionEvent::LoadFailed(err.user_message())
                }
            };
            SessionUpdate {
                ticket: issued.ticket,
                event,
            }
        })
    }

    fn grade(&self, issued: Issued<GradeRequest>) -> PendingUpdate {
        let grader = self.grader.clone();
        Box::pin(async move {
            let graded = grader.grade_standard(&issued.request).await;
            SessionUpdate {
                ticket: issued.ticket,
                event: SessionEvent::Graded {
                    outcome: graded.outcome,
                    fact: graded.fact,
                },
            }
        })
    }

    fn fetch_fact(&self, issued: Issued<QuestionId>) -> PendingUpdate {
        let grader = self.grader.clone();
        Box::pin(async move {
            let fact = grader.fetch_fact(issued.request).await;
            SessionUpdate {
                ticket: issued.ticket,
                event: SessionEvent::FactFetched(fact),
            }
        })
    }
}
