//! Weighted combination of engine results into one score and grade.

use std::collections::BTreeMap;

use citesight_common::{AnalysisConfig, CiteSightError, CompositeResult, EngineResult, Grade};

/// Renormalize the configured weights over the engines actually supplied
/// and combine. A partial engine set still yields a 0-100 score; an
/// unrenormalizable weight table is a configuration error, never a
/// runtime fallback.
pub fn combine(
    results: &[EngineResult],
    config: &AnalysisConfig,
) -> Result<CompositeResult, CiteSightError> {
    if results.is_empty() {
        return Err(CiteSightError::Config(
            "no engine results supplied to the composite scorer".into(),
        ));
    }

    let mut nominal: BTreeMap<String, f64> = BTreeMap::new();
    for result in results {
        let weight = config.weight_of(&result.engine);
        if weight < 0.0 || !weight.is_finite() {
            return Err(CiteSightError::Config(format!(
                "engine '{}' has invalid weight {weight}",
                result.engine
            )));
        }
        nominal.insert(result.engine.clone(), weight);
    }

    let total: f64 = nominal.values().sum();
    if total <= 0.0 {
        return Err(CiteSightError::Config(
            "supplied engine weights sum to zero and cannot be renormalized".into(),
        ));
    }

    let weights: BTreeMap<String, f64> =
        nominal.into_iter().map(|(id, w)| (id, w / total)).collect();

    let score: f64 = results
        .iter()
        .map(|r| r.score * weights[&r.engine])
        .sum();

    Ok(CompositeResult {
        score,
        grade: Grade::from_score(score),
        engines: results.to_vec(),
        weights,
    })
}
