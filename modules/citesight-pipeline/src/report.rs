//! Report assembly. Pure shape work: no scoring happens here, and a
//! mismatch between composite pieces is a programming defect surfaced as
//! an assembly error, not recovered.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use citesight_common::{
    AnalysisReport, CiteSightError, CompositeResult, EngineReport, Gap, PageModel, Severity,
    SimulationResult, Summary,
};
use citesight_engines::tuning::{
    STRENGTH_SCORE_FLOOR, TOP_RECOMMENDATION_COUNT, WEAKNESS_SCORE_CEILING,
};

pub fn assemble(
    page: &PageModel,
    composite: CompositeResult,
    gaps: Vec<Gap>,
    simulation: Option<SimulationResult>,
) -> Result<AnalysisReport, CiteSightError> {
    let mut engine_scores: BTreeMap<String, EngineReport> = BTreeMap::new();
    for result in &composite.engines {
        let weight = composite.weights.get(&result.engine).copied().ok_or_else(|| {
            CiteSightError::Assembly(format!(
                "engine '{}' has a result but no renormalized weight",
                result.engine
            ))
        })?;
        engine_scores.insert(
            result.engine.clone(),
            EngineReport {
                score: result.score,
                weight,
                grade: result.grade,
                details: result.metrics.clone(),
            },
        );
    }

    let summary = summarize(&composite, &gaps);

    Ok(AnalysisReport {
        id: Uuid::new_v4(),
        url: page.url.clone(),
        generated_at: Utc::now(),
        composite_score: composite.score,
        grade: composite.grade,
        engine_scores,
        gaps,
        simulation_results: simulation,
        summary,
    })
}

/// Gap counts by severity, standout engines either way, and the first
/// few critical/high remediations in ranked order.
fn summarize(composite: &CompositeResult, gaps: &[Gap]) -> Summary {
    let count = |severity: Severity| gaps.iter().filter(|g| g.severity == severity).count() as u32;

    let strengths = composite
        .engines
        .iter()
        .filter(|e| e.score >= STRENGTH_SCORE_FLOOR)
        .map(|e| e.engine.clone())
        .collect();
    let weaknesses = composite
        .engines
        .iter()
        .filter(|e| e.score < WEAKNESS_SCORE_CEILING)
        .map(|e| e.engine.clone())
        .collect();

    let top_recommendations = gaps
        .iter()
        .filter(|g| g.severity >= Severity::High)
        .take(TOP_RECOMMENDATION_COUNT)
        .map(|g| g.recommendation.clone())
        .collect();

    Summary {
        critical_gaps: count(Severity::Critical),
        high_gaps: count(Severity::High),
        medium_gaps: count(Severity::Medium),
        low_gaps: count(Severity::Low),
        strengths,
        weaknesses,
        top_recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesight_common::fixtures::product_page;
    use citesight_common::{EngineResult, GapSource, Grade};

    fn composite() -> CompositeResult {
        let engines = vec![
            EngineResult::new("ade", 85.0, BTreeMap::new()),
            EngineResult::new("tre", 40.0, BTreeMap::new()),
        ];
        let mut weights = BTreeMap::new();
        weights.insert("ade".to_string(), 0.6);
        weights.insert("tre".to_string(), 0.4);
        CompositeResult { score: 67.0, grade: Grade::D, engines, weights }
    }

    fn gap(gap_type: &str, severity: Severity) -> Gap {
        Gap {
            gap_type: gap_type.to_string(),
            severity,
            description: format!("{gap_type} description"),
            recommendation: format!("fix {gap_type}"),
            source: GapSource::Engine("tre".to_string()),
            snippet: None,
        }
    }

    #[test]
    fn report_carries_the_serialization_contract_fields() {
        let report = assemble(
            &product_page(),
            composite(),
            vec![gap("no_ssl", Severity::Critical), gap("no_reviews", Severity::Medium)],
            None,
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["grade"], "D");
        assert_eq!(json["engine_scores"]["ade"]["weight"], 0.6);
        assert_eq!(json["gaps"][0]["type"], "no_ssl");
        assert_eq!(json["gaps"][0]["engine_source"], "tre");
        assert!(json.get("simulation_results").is_none());
    }

    #[test]
    fn summary_counts_and_ranks() {
        let gaps = vec![
            gap("no_ssl", Severity::Critical),
            gap("no_contact_info", Severity::High),
            gap("no_reviews", Severity::Medium),
        ];
        let report = assemble(&product_page(), composite(), gaps, None).unwrap();

        assert_eq!(report.summary.critical_gaps, 1);
        assert_eq!(report.summary.high_gaps, 1);
        assert_eq!(report.summary.medium_gaps, 1);
        assert_eq!(report.summary.strengths, vec!["ade"]);
        assert_eq!(report.summary.weaknesses, vec!["tre"]);
        assert_eq!(
            report.summary.top_recommendations,
            vec!["fix no_ssl", "fix no_contact_info"]
        );
    }

    #[test]
    fn missing_weight_is_an_assembly_defect() {
        let mut broken = composite();
        broken.weights.remove("tre");
        let err = assemble(&product_page(), broken, vec![], None).unwrap_err();
        assert!(matches!(err, CiteSightError::Assembly(_)));
    }
}
