use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use quiz_core::model::QuestionId;
use quiz_core::session::GradeRequest;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::sources::{
    CountryRecord, FactResponse, FactSource, GeneratedRecord, GradeResponse, GradingSource,
    IssueReport, QuestionSource, ReportSink,
};

/// HTTP/JSON client for the trivia backend; implements every remote source.
#[derive(Clone, Debug)]
pub struct TriviaApiClient {
    client: Client,
    config: ApiConfig,
}

impl TriviaApiClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.config
            .endpoint(path)
            .map_err(|err| ApiError::network(format!("invalid endpoint {path:?}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.client.get(url).send().await?;
        decode(checked(response)?).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.client.post(url).json(body).send().await?;
        decode(checked(response)?).await
    }
}

fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(%status, url = %response.url(), "trivia API returned an error status");
        Err(ApiError::http(status))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::malformed(err, status))
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    topic: &'a str,
    fresh: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateReply {
    Questions(Vec<GeneratedRecord>),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
struct CheckAnswerBody<'a> {
    country_id: QuestionId,
    user_answer: &'a str,
    mode: &'static str,
}

#[async_trait]
impl QuestionSource for TriviaApiClient {
    #[instrument(skip(self))]
    async fn shuffled_countries(&self) -> Result<Vec<CountryRecord>, ApiError> {
        let countries: Vec<CountryRecord> = self.get_json("trivia/?shuffle=true").await?;
        debug!(count = countries.len(), "fetched countries");
        Ok(countries)
    }

    #[instrument(skip(self))]
    async fn generate_quiz(
        &self,
        topic: &str,
        fresh: bool,
    ) -> Result<Vec<GeneratedRecord>, ApiError> {
        let body = GenerateBody { topic, fresh };
        let reply: GenerateReply = self.post_json("ai-quiz/generate/", &body).await?;
        match reply {
            GenerateReply::Questions(questions) => {
                debug!(count = questions.len(), "generated quiz");
                Ok(questions)
            }
            GenerateReply::Failed { error } => {
                warn!(%error, "quiz generation failed");
                Err(ApiError::new(error, 200))
            }
        }
    }
}

#[async_trait]
impl GradingSource for TriviaApiClient {
    #[instrument(skip(self, request), fields(question = %request.question_id, mode = %request.mode))]
    async fn check_answer(&self, request: &GradeRequest) -> Result<GradeResponse, ApiError> {
        let body = CheckAnswerBody {
            country_id: request.question_id,
            user_answer: &request.answer,
            mode: request.mode.as_str(),
        };
        self.post_json("trivia/check-answer/", &body).await
    }
}

#[async_trait]
impl FactSource for TriviaApiClient {
    #[instrument(skip(self))]
    async fn fun_fact(&self, id: QuestionId) -> Result<Option<String>, ApiError> {
        let response: FactResponse = self.get_json(&format!("trivia/{id}/fun-fact/")).await?;
        Ok(response
            .fact
            .map(|fact| fact.trim().to_string())
            .filter(|fact| !fact.is_empty()))
    }
}

#[async_trait]
impl ReportSink for TriviaApiClient {
    #[instrument(skip(self, report), fields(issue = %report.issue_type))]
    async fn submit_issue(&self, report: &IssueReport) -> Result<(), ApiError> {
        let url = self.endpoint("reports/")?;
        let response = self.client.post(url).json(report).send().await?;
        checked(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_reply_accepts_list_or_error() {
        let list: GenerateReply = serde_json::from_str(
            r#"[{"id":1,"question":"Q?","options":["a","b"],"correctAnswer":"a"}]"#,
        )
        .unwrap();
        assert!(matches!(list, GenerateReply::Questions(ref items) if items.len() == 1));

        let failed: GenerateReply =
            serde_json::from_str(r#"{"error":"topic is not allowed"}"#).unwrap();
        assert!(matches!(failed, GenerateReply::Failed { ref error } if error == "topic is not allowed"));
    }

    #[test]
    fn check_answer_body_uses_wire_names() {
        let body = CheckAnswerBody {
            country_id: QuestionId::new(42),
            user_answer: "roseau",
            mode: "capital",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["country_id"], 42);
        assert_eq!(value["user_answer"], "roseau");
        assert_eq!(value["mode"], "capital");
    }
}
