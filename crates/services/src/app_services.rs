use std::sync::Arc;

use storage::repository::Storage;

use crate::config::ApiConfig;
use crate::controller::SessionController;
use crate::error::AppServicesError;
use crate::grader::AnswerGrader;
use crate::high_scores::HighScoreStore;
use crate::http::TriviaApiClient;
use crate::provider::QuestionProvider;
use crate::Clock;

/// Assembles the app-facing services over one API client and one storage backend.
#[derive(Clone)]
pub struct AppServices {
    client: Arc<TriviaApiClient>,
    provider: QuestionProvider,
    grader: AnswerGrader,
    high_scores: HighScoreStore,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or client setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(&storage, config, clock)
    }

    /// Build services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn with_storage(
        storage: &Storage,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let client = Arc::new(TriviaApiClient::new(config)?);
        let provider = QuestionProvider::with_shuffle(client.clone());
        let grader = AnswerGrader::new(client.clone(), client.clone());
        let high_scores = HighScoreStore::new(clock, Arc::clone(&storage.key_values));

        Ok(Self {
            client,
            provider,
            grader,
            high_scores,
        })
    }

    #[must_use]
    pub fn client(&self) -> Arc<TriviaApiClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn high_scores(&self) -> HighScoreStore {
        self.high_scores.clone()
    }

    /// A controller with the stored high scores loaded.
    pub async fn session_controller(&self) -> SessionController {
        SessionController::start(
            self.provider.clone(),
            self.grader.clone(),
            self.high_scores.clone(),
            self.client.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quiz_core::time::fixed_clock;

    use super::*;

    #[test]
    fn standard_questions_are_reshuffled_per_game() {
        let config = ApiConfig::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let services = AppServices::with_storage(&Storage::in_memory(), config, fixed_clock())
            .unwrap();
        assert!(services.provider.shuffles());
    }
}
