pub mod domain;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use error::{ListwashError, Result};
pub use pipeline::{Pipeline, RunSummary};
