//! Heuristic code review: rule-based feedback and synthetic performance scores.

pub mod facts;
pub mod feedback;
pub mod metrics;
pub mod rules;

pub use facts::{SourceFacts, TestStats};
pub use feedback::{Category, QualityFeedback, Severity};
pub use metrics::PerformanceMetrics;
pub use rules::Rule;

use crate::testing::TestResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub feedback: Vec<QualityFeedback>,
    pub metrics: PerformanceMetrics,
}

pub fn analyze(code: &str, results: &[TestResult]) -> Analysis {
    let facts = SourceFacts::scan(code);
    let stats = TestStats::from_results(results);
    Analysis {
        feedback: rules::review(&rules::default_rules(), &facts, &stats),
        metrics: PerformanceMetrics::measure(&facts, &stats),
    }
}
