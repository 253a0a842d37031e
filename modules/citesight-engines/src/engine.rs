// Engine seam: one capability, a registry of implementations keyed by id.
// Adding an engine (brand authority, review momentum) means one registry
// entry plus a weight-table row; composite and gap code are untouched.

use std::sync::Arc;

use citesight_common::{CiteSightError, EngineResult, PageModel};

use crate::{ade::Ade, arce::Arce, tre::Tre};

/// An independent scoring module evaluating one dimension of a page.
///
/// Implementations are pure functions of the page: no I/O, no shared
/// state, and no panics on sparse input. Missing data degrades the
/// affected metric toward its worst value instead.
pub trait ScoringEngine: Send + Sync {
    fn id(&self) -> &'static str;
    fn score(&self, page: &PageModel) -> EngineResult;
}

pub struct EngineRegistry {
    engines: Vec<Arc<dyn ScoringEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self { engines: Vec::new() }
    }

    /// Registry with the three shipping engines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Ade::default()));
        registry.register(Arc::new(Arce::default()));
        registry.register(Arc::new(Tre::default()));
        registry
    }

    /// Later registrations shadow earlier ones with the same id.
    pub fn register(&mut self, engine: Arc<dyn ScoringEngine>) {
        self.engines.retain(|e| e.id() != engine.id());
        self.engines.push(engine);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ScoringEngine>> {
        self.engines.iter().find(|e| e.id() == id).cloned()
    }

    /// Resolve an enabled-engine set, failing on any unknown id.
    pub fn select(&self, ids: &[String]) -> Result<Vec<Arc<dyn ScoringEngine>>, CiteSightError> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| CiteSightError::UnknownEngine(id.clone()))
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.id()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct FixedEngine(&'static str, f64);

    impl ScoringEngine for FixedEngine {
        fn id(&self) -> &'static str {
            self.0
        }

        fn score(&self, _page: &PageModel) -> EngineResult {
            EngineResult::new(self.0, self.1, BTreeMap::new())
        }
    }

    #[test]
    fn default_registry_carries_the_three_engines() {
        let registry = EngineRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["ade", "arce", "tre"]);
    }

    #[test]
    fn unknown_engine_id_is_an_error() {
        let registry = EngineRegistry::with_defaults();
        let err = registry
            .select(&["ade".to_string(), "sve".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, CiteSightError::UnknownEngine(id) if id == "sve"));
    }

    #[test]
    fn new_engines_plug_in_without_code_changes_elsewhere() {
        let mut registry = EngineRegistry::with_defaults();
        registry.register(Arc::new(FixedEngine("ere", 42.0)));
        let selected = registry
            .select(&["ade".to_string(), "ere".to_string()])
            .unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn re_registering_an_id_shadows_the_old_engine() {
        let mut registry = EngineRegistry::with_defaults();
        registry.register(Arc::new(FixedEngine("ade", 1.0)));
        assert_eq!(registry.ids().iter().filter(|id| **id == "ade").count(), 1);
    }
}
