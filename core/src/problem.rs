use std::collections::BTreeMap;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{assets, testing::TestCase};

pub type ProblemId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub complexity_level: u32,
    pub category: String,
    pub test_cases: Vec<TestCase>,

    /// filename => starter source text
    #[serde(default)]
    pub solution_template: BTreeMap<String, String>,
}

/// Where problems come from. Read-only from the point of view of evaluation.
#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Problem>>;

    /// `Ok(None)` when no problem has that id.
    async fn get(&self, id: ProblemId) -> anyhow::Result<Option<Problem>>;
}

/// The problems bundled into the binary.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    problems: Vec<Problem>,
}

impl BuiltinCatalog {
    const ASSET_NAME: &str = "problems.json";

    pub fn load() -> anyhow::Result<Self> {
        let json = assets::read_str(Self::ASSET_NAME)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let problems = serde_json::from_str(json).context("Malformed problem catalog JSON")?;
        Ok(Self { problems })
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

#[async_trait]
impl ProblemCatalog for BuiltinCatalog {
    async fn list(&self) -> anyhow::Result<Vec<Problem>> {
        Ok(self.problems.clone())
    }

    async fn get(&self, id: ProblemId) -> anyhow::Result<Option<Problem>> {
        Ok(self.problems.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn builtin_catalog_should_be_loadable() {
        let catalog = BuiltinCatalog::load().unwrap();
        let problems = catalog.list().await.unwrap();
        assert_eq!(problems.len(), 5);

        for p in &problems {
            assert!(!p.test_cases.is_empty(), "problem {} has no testcases", p.id);
            assert!(p.solution_template.contains_key("Main.java"));
        }
    }

    #[tokio::test]
    async fn get_by_id() {
        let catalog = BuiltinCatalog::load().unwrap();

        let p = catalog.get(5).await.unwrap().unwrap();
        assert_eq!(p.title, "Simple Property Counter");
        assert_eq!(p.difficulty, "Easy");
        let ids: Vec<_> = p.test_cases.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(p.test_cases[0].expected(), Some("Counter incremented to 3."));

        assert_eq!(catalog.get(404).await.unwrap(), None);
    }
}
