//! Analysis orchestrator: page model in, assembled report out.
//!
//! Engines fan out as concurrent tasks over one immutable page; the
//! composite blocks on all of them. The simulation call is the only
//! network touchpoint and runs under a bounded timeout; on failure the
//! analysis proceeds without a result rather than failing.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{info, warn};

use citesight_common::{
    AnalysisConfig, AnalysisReport, CiteSightError, EngineResult, PageModel, SimulationResult,
};
use citesight_engines::{combine, EngineRegistry, GapAnalyzer, ScoringEngine};
use citesight_sim::{build_simulator, SimulationRequest, Simulator};

use crate::report;

/// Characters of page text handed to the simulation as context.
const PAGE_CONTEXT_CHARS: usize = 2000;

/// Who to ask about, in which category, for what use case.
#[derive(Debug, Clone)]
pub struct SimulationTarget {
    pub brand: String,
    pub category: String,
    pub use_case: String,
    /// Ground the query in a page excerpt instead of model knowledge only.
    pub include_page_context: bool,
}

pub struct Analyzer {
    config: AnalysisConfig,
    engines: Vec<Arc<dyn ScoringEngine>>,
    simulator: Option<Arc<dyn Simulator>>,
    gap_analyzer: GapAnalyzer,
}

impl Analyzer {
    /// Analyzer over the default engine registry. Fails fast on invalid
    /// configuration: bad weights, unknown engine ids, unknown provider.
    pub fn new(config: AnalysisConfig) -> Result<Self, CiteSightError> {
        Self::with_registry(config, EngineRegistry::with_defaults())
    }

    pub fn with_registry(
        config: AnalysisConfig,
        registry: EngineRegistry,
    ) -> Result<Self, CiteSightError> {
        config.validate()?;
        let engines = registry.select(&config.enabled_engines)?;
        let simulator = build_simulator(&config)?;
        let gap_analyzer = GapAnalyzer::new(&config);
        Ok(Self { config, engines, simulator, gap_analyzer })
    }

    /// Swap in a simulation backend directly (tests, embedders).
    pub fn with_simulator(mut self, simulator: Arc<dyn Simulator>) -> Self {
        self.simulator = Some(simulator);
        self
    }

    pub async fn analyze(
        &self,
        page: PageModel,
        target: Option<SimulationTarget>,
    ) -> Result<AnalysisReport, CiteSightError> {
        let page = Arc::new(page);
        info!(url = %page.url, engines = self.engines.len(), "starting analysis");

        let results = self.run_engines(&page).await?;
        let composite = combine(&results, &self.config)?;
        info!(score = composite.score, grade = %composite.grade, "composite computed");

        let simulation = self.run_simulation(&page, target).await;

        let gaps = self
            .gap_analyzer
            .analyze(&composite.engines, simulation.as_ref());

        let report = report::assemble(&page, composite, gaps, simulation)?;
        info!(
            analysis_id = %report.id,
            composite = report.composite_score,
            gap_count = report.gaps.len(),
            "analysis complete"
        );
        Ok(report)
    }

    /// Engines are pure and mutually independent; each runs in its own
    /// blocking task over the shared immutable page.
    async fn run_engines(
        &self,
        page: &Arc<PageModel>,
    ) -> Result<Vec<EngineResult>, CiteSightError> {
        let mut set = JoinSet::new();
        for (index, engine) in self.engines.iter().enumerate() {
            let engine = Arc::clone(engine);
            let page = Arc::clone(page);
            set.spawn_blocking(move || (index, engine.score(&page)));
        }

        let mut indexed = Vec::with_capacity(self.engines.len());
        while let Some(joined) = set.join_next().await {
            let (index, result) =
                joined.map_err(|e| CiteSightError::Anyhow(anyhow!("engine task failed: {e}")))?;
            indexed.push((index, result));
        }

        // Engines complete in any order; report output stays deterministic.
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    async fn run_simulation(
        &self,
        page: &Arc<PageModel>,
        target: Option<SimulationTarget>,
    ) -> Option<SimulationResult> {
        let target = target?;
        let Some(simulator) = &self.simulator else {
            info!("simulation requested but provider is none; skipping");
            return None;
        };

        let request = SimulationRequest {
            brand: target.brand,
            category: target.category,
            use_case: target.use_case,
            page_context: target.include_page_context.then(|| page_excerpt(page)),
        };

        match tokio::time::timeout(self.config.sim_timeout, simulator.simulate(&request)).await {
            Ok(Ok(result)) => {
                info!(
                    provider = simulator.provider(),
                    brand_cited = result.brand_cited,
                    citation_count = result.citation_count,
                    "simulation complete"
                );
                Some(result)
            }
            Ok(Err(e)) => {
                warn!(
                    provider = simulator.provider(),
                    error = %e,
                    "simulation failed; continuing without a result"
                );
                None
            }
            Err(_) => {
                warn!(
                    provider = simulator.provider(),
                    timeout = ?self.config.sim_timeout,
                    "simulation timed out; continuing without a result"
                );
                None
            }
        }
    }
}

fn page_excerpt(page: &PageModel) -> String {
    let text = &page.text;
    if text.len() <= PAGE_CONTEXT_CHARS {
        return text.clone();
    }
    let mut end = PAGE_CONTEXT_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesight_common::fixtures::product_page;

    #[test]
    fn excerpt_is_char_boundary_safe() {
        let mut page = product_page();
        page.text = "é".repeat(3000);
        let excerpt = page_excerpt(&page);
        assert!(excerpt.len() <= PAGE_CONTEXT_CHARS);
        assert!(!excerpt.is_empty());
    }

    #[test]
    fn unknown_engine_in_config_fails_construction() {
        let mut config = AnalysisConfig::default();
        config.enabled_engines.push("sve".to_string());
        assert!(matches!(
            Analyzer::new(config),
            Err(CiteSightError::UnknownEngine(_))
        ));
    }

    #[test]
    fn unknown_provider_fails_construction() {
        let mut config = AnalysisConfig::default();
        config.provider = "mystery".to_string();
        assert!(matches!(
            Analyzer::new(config),
            Err(CiteSightError::UnknownProvider(_))
        ));
    }
}
