pub mod analyzer;
pub mod report;

pub use analyzer::{Analyzer, SimulationTarget};
pub use report::assemble;
