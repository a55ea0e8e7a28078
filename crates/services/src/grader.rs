use std::sync::Arc;

use tracing::{instrument, warn};

use quiz_core::answer::GradeOutcome;
use quiz_core::model::QuestionId;
use quiz_core::session::GradeRequest;

use crate::sources::{FactSource, GradingSource};

/// Grade and fact for one standard-mode answer, both settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graded {
    pub outcome: GradeOutcome,
    pub fact: Option<String>,
}

/// Remote grading with a concurrent fact lookup. Never fails: transport errors
/// become the fallback outcome or a missing fact.
#[derive(Clone)]
pub struct AnswerGrader {
    grading: Arc<dyn GradingSource>,
    facts: Arc<dyn FactSource>,
}

impl AnswerGrader {
    #[must_use]
    pub fn new(grading: Arc<dyn GradingSource>, facts: Arc<dyn FactSource>) -> Self {
        Self { grading, facts }
    }

    #[instrument(skip(self, request), fields(question = %request.question_id))]
    pub async fn grade_standard(&self, request: &GradeRequest) -> Graded {
        let (verdict, fact) = tokio::join!(
            self.grading.check_answer(request),
            self.fetch_fact(request.question_id)
        );

        let outcome = match verdict {
            Ok(response) => GradeOutcome::from_remote(&response.into_verdict()),
            Err(err) => {
                warn!(error = %err, status = err.status, "grading failed");
                GradeOutcome::grading_failed()
            }
        };
        Graded { outcome, fact }
    }

    pub async fn fetch_fact(&self, id: QuestionId) -> Option<String> {
        match self.facts.fun_fact(id).await {
            Ok(fact) => fact,
            Err(err) => {
                warn!(question = %id, error = %err, "fun fact unavailable");
                None
            }
        }
    }
}
