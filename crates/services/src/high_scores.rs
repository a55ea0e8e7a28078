use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::model::{HighScores, ScoredMode};
use storage::repository::KeyValueRepository;

use crate::error::HighScoreError;
use crate::Clock;

/// Best scores per standard mode, persisted as decimal text under fixed keys.
#[derive(Clone)]
pub struct HighScoreStore {
    clock: Clock,
    repo: Arc<dyn KeyValueRepository>,
}

impl HighScoreStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn KeyValueRepository>) -> Self {
        Self { clock, repo }
    }

    /// Stored best for `mode`; absent or unreadable values count as zero.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError` on persistence failures.
    pub async fn get(&self, mode: ScoredMode) -> Result<u32, HighScoreError> {
        let Some(record) = self.repo.get_value(mode.storage_key()).await? else {
            return Ok(0);
        };
        match record.value.trim().parse::<u32>() {
            Ok(score) => Ok(score),
            Err(_) => {
                warn!(key = %record.key, value = %record.value, "ignoring unreadable high score");
                Ok(0)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `HighScoreError` on persistence failures.
    pub async fn load_all(&self) -> Result<HighScores, HighScoreError> {
        let capital = self.get(ScoredMode::Capital).await?;
        let country = self.get(ScoredMode::Country).await?;
        Ok(HighScores::new(capital, country))
    }

    /// Persist `score` when it beats the stored best. Returns whether it was written.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError` on persistence failures.
    pub async fn set_if_greater(&self, mode: ScoredMode, score: u32) -> Result<bool, HighScoreError> {
        let current = self.get(mode).await?;
        if score <= current {
            return Ok(false);
        }
        self.repo
            .set_value(mode.storage_key(), &score.to_string(), self.clock.now())
            .await?;
        debug!(%mode, score, previous = current, "stored new high score");
        Ok(true)
    }
}
