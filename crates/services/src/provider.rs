use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{info, instrument};

use quiz_core::model::{Question, QuizMode, ScoredMode};
use quiz_core::session::LoadRequest;

use crate::error::ProviderError;
use crate::sources::QuestionSource;

/// Turns remote records into validated questions for a session.
#[derive(Clone)]
pub struct QuestionProvider {
    source: Arc<dyn QuestionSource>,
    shuffle: bool,
}

impl QuestionProvider {
    /// Questions are used in the order the source returns them.
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            shuffle: false,
        }
    }

    /// Reshuffle standard questions locally on every load. Generated quizzes keep the
    /// generator's order.
    #[must_use]
    pub fn with_shuffle(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            shuffle: true,
        }
    }

    /// Load the question set a session asked for.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the source fails or returns an unusable set.
    pub async fn load(&self, request: &LoadRequest) -> Result<Vec<Question>, ProviderError> {
        match &request.mode {
            QuizMode::Capital => self.fetch_standard(ScoredMode::Capital).await,
            QuizMode::Country => self.fetch_standard(ScoredMode::Country).await,
            QuizMode::Generated { topic } => self.generate_quiz(topic, request.fresh).await,
        }
    }

    /// # Errors
    ///
    /// Returns `ProviderError` when the source fails or sends a malformed record.
    #[instrument(skip(self))]
    pub async fn fetch_standard(&self, mode: ScoredMode) -> Result<Vec<Question>, ProviderError> {
        let records = self.source.shuffled_countries().await?;
        let mut questions = records
            .into_iter()
            .map(|record| record.into_question().map(Question::from))
            .collect::<Result<Vec<_>, _>>()?;
        self.maybe_shuffle(&mut questions);
        info!(count = questions.len(), "loaded standard questions");
        Ok(questions)
    }

    /// # Errors
    ///
    /// Returns `ProviderError::EmptyQuiz` when nothing usable was generated.
    #[instrument(skip(self))]
    pub async fn generate_quiz(
        &self,
        topic: &str,
        fresh: bool,
    ) -> Result<Vec<Question>, ProviderError> {
        let records = self.source.generate_quiz(topic, fresh).await?;
        if records.is_empty() {
            return Err(ProviderError::EmptyQuiz {
                topic: topic.to_string(),
            });
        }
        let questions = records
            .into_iter()
            .map(|record| record.into_question().map(Question::from))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = questions.len(), "loaded generated questions");
        Ok(questions)
    }

    pub(crate) fn shuffles(&self) -> bool {
        self.shuffle
    }

    fn maybe_shuffle(&self, questions: &mut [Question]) {
        if self.shuffle {
            questions.shuffle(&mut rand::rng());
        }
    }
}
