use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::answer::ResultKind;
use quiz_core::model::{QuestionId, QuizMode, ScoredMode};
use quiz_core::session::{Advance, Applied, GradeRequest, Phase};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    AnswerGrader, ApiError, CountryRecord, FactSource, GeneratedRecord, GradeResponse,
    GradingSource, HighScoreStore, IssueReport, IssueType, QuestionProvider, QuestionSource,
    ReportSink, SessionController,
};
use storage::repository::{InMemoryRepository, KeyValueRepository};

/// Scriptable stand-in for the trivia backend.
struct FakeApi {
    countries: Mutex<Result<Vec<CountryRecord>, ApiError>>,
    generated: Vec<GeneratedRecord>,
    verdict: Mutex<Result<GradeResponse, ApiError>>,
    fact: Option<String>,
    report_ok: bool,
    generate_calls: Mutex<Vec<(String, bool)>>,
    grade_calls: Mutex<Vec<GradeRequest>>,
    fact_calls: Mutex<Vec<QuestionId>>,
    reports: Mutex<Vec<IssueReport>>,
}

impl FakeApi {
    fn new(countries: Vec<CountryRecord>) -> Self {
        Self {
            countries: Mutex::new(Ok(countries)),
            generated: Vec::new(),
            verdict: Mutex::new(Ok(verdict(true, "Correct!"))),
            fact: Some("A fun fact.".into()),
            report_ok: true,
            generate_calls: Mutex::new(Vec::new()),
            grade_calls: Mutex::new(Vec::new()),
            fact_calls: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl QuestionSource for FakeApi {
    async fn shuffled_countries(&self) -> Result<Vec<CountryRecord>, ApiError> {
        self.countries.lock().unwrap().clone()
    }

    async fn generate_quiz(
        &self,
        topic: &str,
        fresh: bool,
    ) -> Result<Vec<GeneratedRecord>, ApiError> {
        self.generate_calls
            .lock()
            .unwrap()
            .push((topic.to_string(), fresh));
        Ok(self.generated.clone())
    }
}

#[async_trait]
impl GradingSource for FakeApi {
    async fn check_answer(&self, request: &GradeRequest) -> Result<GradeResponse, ApiError> {
        self.grade_calls.lock().unwrap().push(request.clone());
        self.verdict.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactSource for FakeApi {
    async fn fun_fact(&self, id: QuestionId) -> Result<Option<String>, ApiError> {
        self.fact_calls.lock().unwrap().push(id);
        Ok(self.fact.clone())
    }
}

#[async_trait]
impl ReportSink for FakeApi {
    async fn submit_issue(&self, report: &IssueReport) -> Result<(), ApiError> {
        self.reports.lock().unwrap().push(report.clone());
        if self.report_ok {
            Ok(())
        } else {
            Err(ApiError::network("connection refused"))
        }
    }
}

fn verdict(is_correct: bool, message: &str) -> GradeResponse {
    GradeResponse {
        is_correct,
        feedback_message: message.into(),
        points_awarded: None,
        shared_capital_info: None,
    }
}

fn country(id: u64, name: &str, capital: &str) -> CountryRecord {
    CountryRecord {
        id,
        name: name.into(),
        capital: capital.into(),
        continent: "North America".into(),
    }
}

fn capitals_quiz() -> GeneratedRecord {
    GeneratedRecord {
        id: 1,
        question: "What is the capital of France?".into(),
        options: vec!["Paris".into(), "Rome".into(), "Berlin".into(), "Madrid".into()],
        correct_answer: "Paris".into(),
        fun_fact: Some("Paris hosted the 1900 Olympics.".into()),
    }
}

async fn controller(
    api: &Arc<FakeApi>,
    repo: &Arc<InMemoryRepository>,
) -> SessionController {
    SessionController::start(
        QuestionProvider::new(api.clone()),
        AnswerGrader::new(api.clone(), api.clone()),
        HighScoreStore::new(fixed_clock(), repo.clone()),
        api.clone(),
    )
    .await
}

#[tokio::test]
async fn capital_answer_is_graded_remotely_with_fact() {
    let api = Arc::new(FakeApi::new(vec![country(7, "Dominica", "Roseau")]));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Capital);
    assert_eq!(controller.settle(load).await.unwrap(), Applied::Applied);
    assert_eq!(
        controller.session().current_prompt().as_deref(),
        Some("What is the capital of Dominica?")
    );

    let grade = controller.submit_answer("roseau").unwrap().unwrap();
    assert_eq!(controller.session().phase(), Phase::Answered);
    assert!(controller.session().is_awaiting_grade());
    controller.settle(grade).await.unwrap();

    let calls = api.grade_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].answer, "roseau");
    assert_eq!(calls[0].mode, ScoredMode::Capital);
    assert_eq!(calls[0].question_id, QuestionId::new(7));

    let session = controller.session();
    assert_eq!(session.score(), 1);
    assert_eq!(session.result().kind, ResultKind::Correct);
    assert_eq!(session.result().message.as_deref(), Some("Correct!"));
    assert_eq!(session.pending_fact(), Some("A fun fact."));
}

#[tokio::test]
async fn grading_failure_falls_back_but_still_fetches_fact() {
    let api = Arc::new(FakeApi::new(vec![country(7, "Dominica", "Roseau")]));
    *api.verdict.lock().unwrap() = Err(ApiError::network("timed out"));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Capital);
    controller.settle(load).await.unwrap();
    let grade = controller.submit_answer("Roseau").unwrap().unwrap();
    controller.settle(grade).await.unwrap();

    let session = controller.session();
    assert_eq!(session.phase(), Phase::Answered);
    assert_eq!(session.result().kind, ResultKind::Incorrect);
    assert_eq!(
        session.result().message.as_deref(),
        Some("Error grading answer. Please try again.")
    );
    assert_eq!(session.score(), 0);
    assert_eq!(api.fact_calls.lock().unwrap().as_slice(), &[QuestionId::new(7)]);
    assert_eq!(session.pending_fact(), Some("A fun fact."));
}

#[tokio::test]
async fn country_skip_reveals_answer_and_fetches_fact() {
    let api = Arc::new(FakeApi::new(vec![country(3, "Jamaica", "Kingston")]));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Country);
    controller.settle(load).await.unwrap();
    let fact = controller.skip().unwrap().unwrap();

    assert_eq!(
        controller.session().result().message.as_deref(),
        Some("Kingston is the capital of Jamaica.")
    );
    assert!(controller.session().is_awaiting_fact());
    controller.settle(fact).await.unwrap();

    let session = controller.session();
    assert_eq!(session.score(), 0);
    assert_eq!(session.result().kind, ResultKind::None);
    assert_eq!(session.pending_fact(), Some("A fun fact."));
    assert!(api.grade_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn high_score_is_persisted_when_beaten() {
    let countries = (1..=7)
        .map(|id| country(id, &format!("Country {id}"), &format!("Capital {id}")))
        .collect();
    let api = Arc::new(FakeApi::new(countries));
    let repo = Arc::new(InMemoryRepository::new());
    repo.set_value("trivia-high-score-capital", "5", fixed_now())
        .await
        .unwrap();
    let mut controller = controller(&api, &repo).await;
    assert_eq!(controller.high_scores().get(ScoredMode::Capital), 5);

    let load = controller.select_mode(QuizMode::Capital);
    controller.settle(load).await.unwrap();

    let mut last = None;
    while controller.session().phase() == Phase::Active {
        let grade = controller.submit_answer("anything").unwrap().unwrap();
        controller.settle(grade).await.unwrap();
        last = Some(controller.advance().await.unwrap());
    }

    assert_eq!(
        last,
        Some(Advance::Complete {
            score: 7,
            new_high_score: Some(ScoredMode::Capital),
        })
    );
    assert_eq!(controller.high_scores().get(ScoredMode::Capital), 7);

    let stored = HighScoreStore::new(fixed_clock(), repo.clone());
    assert_eq!(stored.get(ScoredMode::Capital).await.unwrap(), 7);
    assert_eq!(stored.get(ScoredMode::Country).await.unwrap(), 0);
}

#[tokio::test]
async fn superseded_replay_load_is_dropped() {
    let mut api = FakeApi::new(Vec::new());
    api.generated = vec![capitals_quiz()];
    let api = Arc::new(api);
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let mode = QuizMode::generated("European Capitals").unwrap();
    let load = controller.select_mode(mode.clone());
    controller.settle(load).await.unwrap();
    assert!(controller.select_option("Rome").unwrap().is_none());
    assert_eq!(controller.session().result().kind, ResultKind::Incorrect);
    assert_eq!(
        controller.session().pending_fact(),
        Some("Paris hosted the 1900 Olympics.")
    );
    assert!(matches!(
        controller.advance().await.unwrap(),
        Advance::Complete {
            score: 0,
            new_high_score: None
        }
    ));

    let stale = controller.replay().unwrap();
    assert!(controller.replay().is_err());
    let fresh = controller.select_mode(mode);

    assert_eq!(controller.settle(stale).await.unwrap(), Applied::Stale);
    assert_eq!(controller.session().phase(), Phase::Loading);
    assert_eq!(controller.settle(fresh).await.unwrap(), Applied::Applied);
    assert_eq!(controller.session().phase(), Phase::Active);

    assert_eq!(
        api.generate_calls.lock().unwrap().as_slice(),
        &[
            ("European Capitals".to_string(), false),
            ("European Capitals".to_string(), true),
            ("European Capitals".to_string(), false),
        ]
    );
    assert!(api.grade_calls.lock().unwrap().is_empty());
    assert_eq!(repo.get_value("trivia-high-score-capital").await.unwrap(), None);
}

#[tokio::test]
async fn failed_load_can_be_retried() {
    let api = Arc::new(FakeApi::new(Vec::new()));
    *api.countries.lock().unwrap() = Err(ApiError::network("connection refused"));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Country);
    controller.settle(load).await.unwrap();
    assert_eq!(controller.session().phase(), Phase::LoadFailed);
    assert!(
        controller
            .session()
            .load_error()
            .is_some_and(|message| message.contains("connection refused"))
    );

    *api.countries.lock().unwrap() = Ok(vec![country(3, "Jamaica", "Kingston")]);
    let retry = controller.retry().unwrap();
    controller.settle(retry).await.unwrap();
    assert_eq!(controller.session().phase(), Phase::Active);
}

#[tokio::test]
async fn returning_to_menu_drops_inflight_grade() {
    let api = Arc::new(FakeApi::new(vec![country(7, "Dominica", "Roseau")]));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Capital);
    controller.settle(load).await.unwrap();
    let grade = controller.submit_answer("roseau").unwrap().unwrap();
    controller.to_menu();

    assert_eq!(controller.settle(grade).await.unwrap(), Applied::Stale);
    assert_eq!(controller.session().phase(), Phase::ModeSelect);
    assert_eq!(controller.session().score(), 0);
}

#[tokio::test]
async fn issue_report_describes_current_question() {
    let api = Arc::new(FakeApi::new(vec![country(3, "Jamaica", "Kingston")]));
    let repo = Arc::new(InMemoryRepository::new());
    let mut controller = controller(&api, &repo).await;

    let load = controller.select_mode(QuizMode::Country);
    controller.settle(load).await.unwrap();
    assert!(
        controller
            .report_issue(IssueType::FactError, "  Capital is misspelled ")
            .await
    );

    let reports = api.reports.lock().unwrap().clone();
    assert_eq!(
        reports,
        vec![IssueReport {
            issue_type: IssueType::FactError,
            user_note: "Capital is misspelled".into(),
            country_name: Some("Jamaica".into()),
            question_id: Some(QuestionId::new(3)),
        }]
    );
}

#[tokio::test]
async fn failed_issue_report_returns_false() {
    let mut api = FakeApi::new(Vec::new());
    api.report_ok = false;
    let api = Arc::new(api);
    let repo = Arc::new(InMemoryRepository::new());
    let controller = controller(&api, &repo).await;

    assert!(!controller.report_issue(IssueType::UiBug, "Button overlaps").await);
    let reports = api.reports.lock().unwrap().clone();
    assert_eq!(reports[0].country_name, None);
    assert_eq!(reports[0].question_id, None);
}
