use std::time::Duration;

use assay_core::{problem::ProblemId, EvaluationResult, Problem, Submission};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::{error::*, http};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EvalClient {
    base: Url,
    http: reqwest::Client,
}

impl EvalClient {
    /// Evaluations run every test case sequentially, so this is generous.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|source| Error::InvalidSyntaxUrl {
            url: base_url.to_owned(),
            source,
        })?;
        Ok(Self {
            base,
            http: http::build_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|source| Error::InvalidSyntaxUrl {
                url: format!("{}{}", self.base, path),
                source,
            })
    }

    pub async fn health(&self) -> Result<Health> {
        let resp = self.http.get(self.endpoint("/api/health")?).send().await?;
        http::decode(resp).await
    }

    pub async fn list_problems(&self) -> Result<Vec<Problem>> {
        let resp = self.http.get(self.endpoint("/api/problems")?).send().await?;
        http::decode(resp).await
    }

    /// `Ok(None)` if the server does not know the problem.
    pub async fn get_problem(&self, id: ProblemId) -> Result<Option<Problem>> {
        let url = self.endpoint(&format!("/api/problems/{}", id))?;
        let resp = self.http.get(url).send().await?;
        match http::decode(resp).await {
            Ok(p) => Ok(Some(p)),
            Err(e) if http::is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResult> {
        log::debug!("Submitting to {} (problem {})", self.base, submission.problem_id);
        let resp = self
            .http
            .post(self.endpoint("/api/evaluate")?)
            .json(submission)
            .send()
            .await?;
        http::decode(resp).await
    }
}
