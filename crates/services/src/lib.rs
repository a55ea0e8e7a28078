#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod controller;
pub mod error;
pub mod grader;
pub mod high_scores;
pub mod http;
pub mod provider;
pub mod sources;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::ApiConfig;
pub use controller::{PendingUpdate, SessionController};
pub use error::{
    ApiError, AppServicesError, ConfigError, ControllerError, HighScoreError, ProviderError,
};
pub use grader::{AnswerGrader, Graded};
pub use high_scores::HighScoreStore;
pub use http::TriviaApiClient;
pub use provider::QuestionProvider;
pub use sources::{
    CountryRecord, FactSource, GeneratedRecord, GradeResponse, GradingSource, IssueReport,
    IssueType, QuestionSource, ReportSink,
};
