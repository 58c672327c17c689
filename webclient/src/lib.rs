// exported modules
pub mod client;
pub mod error;

// re-exports
pub use client::{EvalClient, Health};
pub use error::*;
pub use url::Url;

// internal modules
mod http;
