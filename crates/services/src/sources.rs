//! Remote collaborators as async traits, plus the wire records they exchange.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quiz_core::answer::RemoteVerdict;
use quiz_core::model::{GeneratedQuestion, QuestionError, QuestionId, StandardQuestion};
use quiz_core::session::GradeRequest;

use crate::error::ApiError;

#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// The full country list in server-shuffled order.
    async fn shuffled_countries(&self) -> Result<Vec<CountryRecord>, ApiError>;

    /// A generated multiple-choice quiz; `fresh` asks for a novel set.
    async fn generate_quiz(&self, topic: &str, fresh: bool)
    -> Result<Vec<GeneratedRecord>, ApiError>;
}

#[async_trait]
pub trait GradingSource: Send + Sync {
    async fn check_answer(&self, request: &GradeRequest) -> Result<GradeResponse, ApiError>;
}

#[async_trait]
pub trait FactSource: Send + Sync {
    /// `Ok(None)` when the service has no fact for this question.
    async fn fun_fact(&self, id: QuestionId) -> Result<Option<String>, ApiError>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn submit_issue(&self, report: &IssueReport) -> Result<(), ApiError>;
}

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: u64,
    pub name: String,
    /// One or more capitals joined with `|`.
    pub capital: String,
    #[serde(default)]
    pub continent: String,
}

impl CountryRecord {
    /// # Errors
    ///
    /// Returns `QuestionError` when the record has no name or capital.
    pub fn into_question(self) -> Result<StandardQuestion, QuestionError> {
        StandardQuestion::new(QuestionId::new(self.id), self.name, self.capital, self.continent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, alias = "fact", skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
}

impl GeneratedRecord {
    /// # Errors
    ///
    /// Returns `QuestionError` when the record is not a well-formed question.
    pub fn into_question(self) -> Result<GeneratedQuestion, QuestionError> {
        GeneratedQuestion::new(
            QuestionId::new(self.id),
            self.question,
            self.options,
            self.correct_answer,
            self.fun_fact,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResponse {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback_message: String,
    #[serde(default)]
    pub points_awarded: Option<i64>,
    #[serde(default)]
    pub shared_capital_info: Option<String>,
}

impl GradeResponse {
    /// Negative awards clamp to zero.
    #[must_use]
    pub fn into_verdict(self) -> RemoteVerdict {
        let points_awarded = self
            .points_awarded
            .map(|points| u32::try_from(points.max(0)).unwrap_or(u32::MAX));
        let feedback_message = if self.feedback_message.trim().is_empty() {
            if self.is_correct { "Correct!" } else { "Incorrect!" }.to_string()
        } else {
            self.feedback_message
        };
        RemoteVerdict {
            is_correct: self.is_correct,
            feedback_message,
            points_awarded,
            shared_capital_info: self.shared_capital_info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FactResponse {
    #[serde(default)]
    pub fact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    FactError,
    Typo,
    UiBug,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::FactError,
        IssueType::Typo,
        IssueType::UiBug,
        IssueType::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::FactError => "fact_error",
            IssueType::Typo => "typo",
            IssueType::UiBug => "ui_bug",
            IssueType::Other => "other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|issue| issue.as_str() == wanted)
            .ok_or_else(|| format!("unknown issue type {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    pub issue_type: IssueType,
    pub user_note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_record_reads_camel_case() {
        let json = r#"{"id":3,"question":"Who won in 2021?","options":["Max","Lewis"],
            "correctAnswer":"Max","fact":"Decided on the final lap."}"#;
        let record: GeneratedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.correct_answer, "Max");
        assert_eq!(record.fun_fact.as_deref(), Some("Decided on the final lap."));

        let question = record.into_question().unwrap();
        assert_eq!(question.options().len(), 2);
    }

    #[test]
    fn grade_response_clamps_negative_points() {
        let response = GradeResponse {
            is_correct: true,
            feedback_message: String::new(),
            points_awarded: Some(-3),
            shared_capital_info: None,
        };
        let verdict = response.into_verdict();
        assert_eq!(verdict.points_awarded, Some(0));
        assert_eq!(verdict.feedback_message, "Correct!");
    }

    #[test]
    fn issue_report_serializes_snake_case() {
        let report = IssueReport {
            issue_type: IssueType::FactError,
            user_note: "Wrong year".into(),
            country_name: Some("Jamaica".into()),
            question_id: Some(QuestionId::new(9)),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["issue_type"], "fact_error");
        assert_eq!(value["question_id"], 9);

        assert_eq!("UI bug".parse::<IssueType>(), Ok(IssueType::UiBug));
        assert!("spam".parse::<IssueType>().is_err());
    }
}
