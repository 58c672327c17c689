use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;

use assay_core::{problem::ProblemId, EvaluationResult, Problem, Submission};

use crate::{
    error::{ApiError, Result},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn list_problems(State(state): State<AppState>) -> Result<Json<Vec<Problem>>> {
    let problems = state
        .catalog
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch problems", e))?;
    Ok(Json(problems))
}

pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Problem>> {
    // A non-numeric id can never match.
    let Ok(id) = id.parse::<ProblemId>() else {
        return Err(ApiError::ProblemNotFound);
    };
    state
        .catalog
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch problem", e))?
        .map(Json)
        .ok_or(ApiError::ProblemNotFound)
}

pub async fn evaluate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Submission>, JsonRejection>,
) -> Result<Json<EvaluationResult>> {
    let Json(submission) = payload?;

    if !state.evaluator.supports(&submission.language) {
        return Err(ApiError::UnsupportedLanguage(submission.language));
    }

    let problem = state
        .catalog
        .get(submission.problem_id)
        .await
        .map_err(|e| ApiError::internal("Failed to evaluate code", e))?
        .ok_or(ApiError::ProblemNotFound)?;

    let res = state.evaluator.evaluate(&submission, &problem).await;
    Ok(Json(res))
}
