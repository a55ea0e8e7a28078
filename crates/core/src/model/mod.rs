mod high_score;
mod ids;
mod mode;
mod question;

pub use high_score::HighScores;
pub use ids::QuestionId;
pub use mode::{PRESET_TOPICS, QuizMode, ScoredMode};
pub use question::{
    GeneratedQuestion, MAX_OPTIONS, MIN_OPTIONS, Question, QuestionError, StandardQuestion,
};
