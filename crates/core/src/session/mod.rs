//! Quiz session state machine.
//!
//! `Session` holds the state of one run; `SessionContext` is the only way to mutate it.
//! User actions are plain method calls. Results of asynchronous work come back as
//! `SessionUpdate`s and pass through `SessionContext::apply`, which drops anything
//! issued under an older token or for an earlier question.

mod context;
mod state;
mod token;

use thiserror::Error;

pub use context::{
    Advance, Applied, GradeRequest, Issued, SessionContext, SessionEvent, SessionUpdate, Skip,
    Submission,
};
pub use state::{
    AnswerResult, EMPTY_QUIZ_MESSAGE, LoadRequest, MISMATCHED_QUIZ_MESSAGE, Phase, Session,
    SessionProgress,
};
pub use token::{RequestToken, Ticket, TokenIssuer};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("cannot {action} while {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("the current answer is still being graded")]
    GradePending,

    #[error("no game mode is selected")]
    NoMode,

    #[error("this question is answered by typing, not by choosing an option")]
    NoOptions,

    #[error("{option:?} is not an option for the current question")]
    UnknownOption { option: String },
}
