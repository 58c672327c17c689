pub mod action;
pub mod analysis;
mod assets;
pub mod config;
pub mod evaluation;
pub mod problem;
pub mod sandbox;
pub mod str_interp;
pub mod style;
pub mod testing;

pub use crate::config::Config;
pub use crate::evaluation::{EvaluationResult, Evaluator, Submission};
pub use crate::problem::{BuiltinCatalog, Problem, ProblemCatalog};
