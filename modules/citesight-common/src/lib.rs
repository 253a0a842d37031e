pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;
pub mod types;

pub use config::AnalysisConfig;
pub use error::CiteSightError;
pub use types::*;
