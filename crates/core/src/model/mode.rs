use std::fmt;

use crate::model::QuestionError;

/// Topics offered on the mode menu for generated quizzes.
pub const PRESET_TOPICS: [&str; 3] = [
    "Formula 1",
    "World Football (Soccer)",
    "Credit Card Points and Miles",
];

/// Modes whose best score is kept across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoredMode {
    /// Shown a country, answer with its capital.
    Capital,
    /// Shown a capital, answer with its country.
    Country,
}

impl ScoredMode {
    pub const ALL: [ScoredMode; 2] = [ScoredMode::Capital, ScoredMode::Country];

    /// Name used on the wire when talking to the grading service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScoredMode::Capital => "capital",
            ScoredMode::Country => "country",
        }
    }

    /// Key under which the best score for this mode is persisted.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            ScoredMode::Capital => "trivia-high-score-capital",
            ScoredMode::Country => "trivia-high-score-country",
        }
    }
}

impl fmt::Display for ScoredMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active quiz variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuizMode {
    Capital,
    Country,
    /// Multiple-choice questions produced by the remote generator for a free-text topic.
    Generated { topic: String },
}

impl QuizMode {
    /// Build a generated-quiz mode for the given topic.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::BlankTopic` if the topic is empty after trimming.
    pub fn generated(topic: impl Into<String>) -> Result<Self, QuestionError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(QuestionError::BlankTopic);
        }
        Ok(Self::Generated { topic })
    }

    /// The scored mode this quiz counts towards, if any.
    #[must_use]
    pub fn scored(&self) -> Option<ScoredMode> {
        match self {
            QuizMode::Capital => Some(ScoredMode::Capital),
            QuizMode::Country => Some(ScoredMode::Country),
            QuizMode::Generated { .. } => None,
        }
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        matches!(self, QuizMode::Generated { .. })
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match self {
            QuizMode::Generated { topic } => Some(topic),
            QuizMode::Capital | QuizMode::Country => None,
        }
    }
}

impl From<ScoredMode> for QuizMode {
    fn from(mode: ScoredMode) -> Self {
        match mode {
            ScoredMode::Capital => QuizMode::Capital,
            ScoredMode::Country => QuizMode::Country,
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Capital => f.write_str("Guess the Capital"),
            QuizMode::Country => f.write_str("Guess the Country"),
            QuizMode::Generated { topic } => write!(f, "{topic} Trivia"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_mode_trims_topic() {
        let mode = QuizMode::generated("  Formula 1 ").unwrap();
        assert_eq!(mode.topic(), Some("Formula 1"));
        assert!(mode.is_generated());
        assert_eq!(mode.scored(), None);
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert_eq!(QuizMode::generated("   "), Err(QuestionError::BlankTopic));
    }

    #[test]
    fn standard_modes_are_scored() {
        assert_eq!(QuizMode::Capital.scored(), Some(ScoredMode::Capital));
        assert_eq!(QuizMode::Country.scored(), Some(ScoredMode::Country));
        assert_eq!(QuizMode::from(ScoredMode::Country), QuizMode::Country);
    }

    #[test]
    fn storage_keys_are_distinct_per_mode() {
        assert_eq!(ScoredMode::Capital.storage_key(), "trivia-high-score-capital");
        assert_eq!(ScoredMode::Country.storage_key(), "trivia-high-score-country");
    }
}
