use thiserror::Error;

use crate::model::QuestionError;
use crate::session::TransitionError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
