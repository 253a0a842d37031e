pub mod ade;
pub mod arce;
pub mod composite;
pub mod engine;
pub mod gaps;
pub mod readability;
pub mod scoring;
pub mod tre;
pub mod tuning;

pub use ade::Ade;
pub use arce::Arce;
pub use composite::combine;
pub use engine::{EngineRegistry, ScoringEngine};
pub use gaps::GapAnalyzer;
pub use tre::Tre;
