use std::collections::HashSet;

use thiserror::Error;

use crate::answer::normalize_answer;
use crate::model::{QuestionId, QuizMode, ScoredMode};

/// Bounds on the number of options a generated question may carry.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("quiz topic must not be blank")]
    BlankTopic,

    #[error("question {id}: {field} must not be blank")]
    BlankField { id: QuestionId, field: &'static str },

    #[error("question {id} has {count} options (expected 2 to 6)")]
    OptionCount { id: QuestionId, count: usize },

    #[error("question {id} repeats the option {option:?}")]
    DuplicateOption { id: QuestionId, option: String },

    #[error("question {id}: correct answer {answer:?} is not among the options")]
    AnswerNotInOptions { id: QuestionId, answer: String },
}

//
// ─── STANDARD ──────────────────────────────────────────────────────────────────
//

/// A country from the static reference set.
///
/// `capital` keeps the source's pipe-delimited form so states with several
/// capitals (e.g. `Pretoria|Cape Town|Bloemfontein`) survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardQuestion {
    id: QuestionId,
    name: String,
    capital: String,
    continent: String,
}

impl StandardQuestion {
    /// # Errors
    ///
    /// Returns `QuestionError::BlankField` if the name or every capital is blank.
    pub fn new(
        id: QuestionId,
        name: impl Into<String>,
        capital: impl Into<String>,
        continent: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(QuestionError::BlankField { id, field: "name" });
        }
        let question = Self {
            id,
            name,
            capital: capital.into(),
            continent: continent.into().trim().to_string(),
        };
        if question.capitals().next().is_none() {
            return Err(QuestionError::BlankField {
                id,
                field: "capital",
            });
        }
        Ok(question)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw pipe-delimited capital text.
    #[must_use]
    pub fn capital_text(&self) -> &str {
        &self.capital
    }

    #[must_use]
    pub fn continent(&self) -> &str {
        &self.continent
    }

    /// Individual capitals in source order, blanks dropped.
    pub fn capitals(&self) -> impl Iterator<Item = &str> {
        self.capital
            .split('|')
            .map(str::trim)
            .filter(|capital| !capital.is_empty())
    }

    /// The capital used when a single one has to be shown.
    #[must_use]
    pub fn primary_capital(&self) -> &str {
        self.capitals().next().unwrap_or_default()
    }

    #[must_use]
    pub fn prompt(&self, mode: ScoredMode) -> String {
        match mode {
            ScoredMode::Capital => format!("What is the capital of {}?", self.name),
            ScoredMode::Country => {
                format!("{} is the capital of which country?", self.primary_capital())
            }
        }
    }

    /// Correct-answer text shown when the player skips.
    #[must_use]
    pub fn disclosure(&self, mode: ScoredMode) -> String {
        match mode {
            ScoredMode::Capital => format!(
                "The capital(s) of {} are: {}.",
                self.name,
                self.capitals().collect::<Vec<_>>().join(", ")
            ),
            ScoredMode::Country => {
                format!("{} is the capital of {}.", self.primary_capital(), self.name)
            }
        }
    }
}

//
// ─── GENERATED ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question produced by the quiz generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    fact: Option<String>,
}

impl GeneratedQuestion {
    /// Validate and build a generated question.
    ///
    /// Options are compared after answer normalization, so `"Paris"` and `"paris."`
    /// count as the same option.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the option count is outside
    /// `MIN_OPTIONS..=MAX_OPTIONS`, options repeat, or the correct answer is not an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        fact: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::BlankField {
                id,
                field: "question",
            });
        }

        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(QuestionError::OptionCount {
                id,
                count: options.len(),
            });
        }

        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(normalize_answer(option)) {
                return Err(QuestionError::DuplicateOption {
                    id,
                    option: option.clone(),
                });
            }
        }

        let correct_answer = correct_answer.into();
        if !seen.contains(&normalize_answer(&correct_answer)) {
            return Err(QuestionError::AnswerNotInOptions {
                id,
                answer: correct_answer,
            });
        }

        let fact = fact
            .map(|fact| fact.trim().to_string())
            .filter(|fact| !fact.is_empty());

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
            fact,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn fact(&self) -> Option<&str> {
        self.fact.as_deref()
    }

    /// Whether `candidate` names one of this question's options.
    #[must_use]
    pub fn has_option(&self, candidate: &str) -> bool {
        let candidate = normalize_answer(candidate);
        self.options
            .iter()
            .any(|option| normalize_answer(option) == candidate)
    }

    #[must_use]
    pub fn disclosure(&self) -> String {
        format!("The correct answer is {}.", self.correct_answer)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Standard(StandardQuestion),
    Generated(GeneratedQuestion),
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        match self {
            Question::Standard(q) => q.id(),
            Question::Generated(q) => q.id(),
        }
    }

    /// Whether this question's variant is the one `mode` plays with.
    #[must_use]
    pub fn fits(&self, mode: &QuizMode) -> bool {
        match self {
            Question::Standard(_) => mode.scored().is_some(),
            Question::Generated(_) => mode.is_generated(),
        }
    }

    /// Text shown to the player for this question under `mode`.
    #[must_use]
    pub fn prompt(&self, mode: &QuizMode) -> String {
        match (self, mode.scored()) {
            (Question::Standard(q), Some(scored)) => q.prompt(scored),
            (Question::Standard(q), None) => q.prompt(ScoredMode::Capital),
            (Question::Generated(q), _) => q.prompt().to_string(),
        }
    }

    /// Options to choose from, empty for typed-answer questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            Question::Standard(_) => &[],
            Question::Generated(q) => q.options(),
        }
    }

    /// Country name a problem report should reference, if any.
    #[must_use]
    pub fn country_name(&self) -> Option<&str> {
        match self {
            Question::Standard(q) => Some(q.name()),
            Question::Generated(_) => None,
        }
    }
}

impl From<StandardQuestion> for Question {
    fn from(question: StandardQuestion) -> Self {
        Question::Standard(question)
    }
}

impl From<GeneratedQuestion> for Question {
    fn from(question: GeneratedQuestion) -> Self {
        Question::Generated(question)
    }
}
