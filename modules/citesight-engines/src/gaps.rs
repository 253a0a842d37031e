//! Deterministic gap derivation from engine metrics and simulation
//! results. Rules are independently evaluable and order-insensitive; the
//! analyzer's only ordering duty is the final severity/weight sort.

use std::collections::BTreeMap;
use std::collections::HashSet;

use citesight_common::{AnalysisConfig, EngineResult, Gap, GapSource, Severity, SimulationResult};

use crate::tuning::{
    LOW_RICHNESS_THRESHOLD, LOW_SEMANTIC_RATIO, READING_EASE_LOW_THRESHOLD,
    REQUIRED_PRODUCT_FIELDS, SHORT_DESCRIPTION_FLOOR, SIMULATION_SORT_WEIGHT,
};

pub struct GapAnalyzer {
    weights: BTreeMap<String, f64>,
}

impl GapAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self { weights: config.weights.clone() }
    }

    /// Derive gaps from every supplied engine result and, when present,
    /// the simulation verdict. The output is deduplicated per
    /// (type, source) and sorted by severity, then origin weight.
    pub fn analyze(
        &self,
        results: &[EngineResult],
        simulation: Option<&SimulationResult>,
    ) -> Vec<Gap> {
        let mut gaps = Vec::new();

        for result in results {
            match result.engine.as_str() {
                "ade" => ade_rules(result, &mut gaps),
                "arce" => arce_rules(result, &mut gaps),
                "tre" => tre_rules(result, &mut gaps),
                // Future engines ship their own rule sets; unknown ids
                // simply contribute no gaps.
                _ => {}
            }
        }

        if let Some(sim) = simulation {
            simulation_rules(sim, &mut gaps);
        }

        let mut seen: HashSet<(String, GapSource)> = HashSet::new();
        gaps.retain(|gap| seen.insert((gap.gap_type.clone(), gap.source.clone())));

        gaps.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| self.sort_weight(&b.source).total_cmp(&self.sort_weight(&a.source)))
        });

        gaps
    }

    /// Simulation gaps sort with full weight so a missed citation outranks
    /// engine gaps of equal severity.
    fn sort_weight(&self, source: &GapSource) -> f64 {
        match source {
            GapSource::Simulation => SIMULATION_SORT_WEIGHT,
            GapSource::Engine(id) => self.weights.get(id).copied().unwrap_or(0.0),
        }
    }
}

fn gap(
    engine: &str,
    gap_type: impl Into<String>,
    severity: Severity,
    description: impl Into<String>,
    recommendation: impl Into<String>,
) -> Gap {
    Gap {
        gap_type: gap_type.into(),
        severity,
        description: description.into(),
        recommendation: recommendation.into(),
        source: GapSource::Engine(engine.to_string()),
        snippet: None,
    }
}

fn ade_rules(result: &EngineResult, gaps: &mut Vec<Gap>) {
    let engine = &result.engine;

    if !result.flag("product_record_present").unwrap_or(false) {
        gaps.push(gap(
            engine,
            "missing_product_schema",
            Severity::Critical,
            "No product structured-data record found on the page",
            "Add a Product record in JSON-LD so assistants can read attributes directly",
        ));
    } else {
        for field in REQUIRED_PRODUCT_FIELDS {
            if !result.flag(&format!("schema_has_{field}")).unwrap_or(true) {
                gaps.push(gap(
                    engine,
                    format!("missing_{field}_schema"),
                    Severity::High,
                    format!("Product record is missing the '{field}' field"),
                    format!("Add '{field}' to the Product record for reliable attribute extraction"),
                ));
            }
        }
    }

    if result.num("description_length").unwrap_or(0.0) < SHORT_DESCRIPTION_FLOOR {
        gaps.push(gap(
            engine,
            "short_description",
            Severity::Medium,
            "Product description is too short for an assistant to reason about",
            "Expand the description past 300 characters with concrete attributes and use cases",
        ));
    }

    if result.num("image_count").unwrap_or(0.0) == 0.0 {
        gaps.push(gap(
            engine,
            "no_images",
            Severity::High,
            "No product images found",
            "Add product images with descriptive alt text",
        ));
    }

    if result.num("attribute_richness_score").unwrap_or(0.0) < LOW_RICHNESS_THRESHOLD {
        gaps.push(gap(
            engine,
            "low_attribute_richness",
            Severity::Medium,
            "Few descriptive attributes are exposed in structured form",
            "Add key-value attributes (material, dimensions, identifiers) to the product markup",
        ));
    }
}

fn arce_rules(result: &EngineResult, gaps: &mut Vec<Gap>) {
    let engine = &result.engine;

    if !result.flag("has_h1").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "missing_h1",
            Severity::High,
            "Page has no top-level heading",
            "Add a single h1 that states what the page is about",
        ));
    }

    if result.flag("multiple_h1").unwrap_or(false) {
        gaps.push(gap(
            engine,
            "multiple_h1",
            Severity::Medium,
            "Page has more than one top-level heading",
            "Keep exactly one h1 and nest the rest beneath it",
        ));
    }

    if result.num("reading_ease").unwrap_or(0.0) < READING_EASE_LOW_THRESHOLD {
        gaps.push(gap(
            engine,
            "low_readability",
            Severity::Medium,
            "Body text is hard to parse (low reading ease)",
            "Shorten sentences and prefer plain words so models can summarize accurately",
        ));
    }

    if result.num("semantic_ratio").unwrap_or(0.0) < LOW_SEMANTIC_RATIO {
        gaps.push(gap(
            engine,
            "low_semantic_structure",
            Severity::Medium,
            "Most structural containers are generic rather than meaning-bearing",
            "Use semantic containers (article, section, main, nav) for the page's main regions",
        ));
    }

    if !result.flag("has_meta_description").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "missing_meta_description",
            Severity::Medium,
            "Meta description is missing",
            "Add a 150-160 character meta description summarizing the page",
        ));
    }
}

fn tre_rules(result: &EngineResult, gaps: &mut Vec<Gap>) {
    let engine = &result.engine;

    if !result.flag("buy_button_found").unwrap_or(false) {
        gaps.push(gap(
            engine,
            "no_buy_button",
            Severity::Critical,
            "No purchase call-to-action detected",
            "Add a prominent buy/add-to-cart affordance so assistants recognize the page is transactable",
        ));
    }

    if !result.flag("has_offer").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "missing_offer_schema",
            Severity::High,
            "No offer information in the structured markup",
            "Add an Offer with price, currency and availability",
        ));
    }

    if !result.flag("has_ssl").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "no_ssl",
            Severity::Critical,
            "Page is served without transport security",
            "Serve the page over https; assistants will not recommend an insecure checkout",
        ));
    }

    if !result.flag("has_reviews").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "no_reviews",
            Severity::Medium,
            "No review or rating information found",
            "Surface ratings and review counts in structured form",
        ));
    }

    if result.num("trust_score").unwrap_or(0.0) == 0.0 {
        gaps.push(gap(
            engine,
            "no_trust_signals",
            Severity::High,
            "No trust signal present: no transport security, reviews, or policy links",
            "Add at least transport security and a visible returns policy",
        ));
    }

    if !result.flag("has_contact").unwrap_or(true) {
        gaps.push(gap(
            engine,
            "no_contact_info",
            Severity::High,
            "No contact channel (e-mail, phone, or contact page) found",
            "Publish a reachable contact channel to back the transaction",
        ));
    }
}

fn simulation_rules(sim: &SimulationResult, gaps: &mut Vec<Gap>) {
    if !sim.brand_cited {
        gaps.push(Gap {
            gap_type: "not_cited_by_ai".into(),
            severity: Severity::Critical,
            description: "The brand was not mentioned in the simulated recommendation".into(),
            recommendation:
                "Strengthen attributes, trust signals and content clarity to earn citations"
                    .into(),
            source: GapSource::Simulation,
            snippet: None,
        });
    }

    for signal in &sim.missing_signals {
        gaps.push(Gap {
            gap_type: format!("missing_signal_{}", slug(signal)),
            severity: Severity::Medium,
            description: format!("The model looks for this but may not find it: {signal}"),
            recommendation: format!("Add or strengthen information about: {signal}"),
            source: GapSource::Simulation,
            snippet: None,
        });
    }
}

/// Lowercased, underscore-separated, bounded tag for a free-text signal.
fn slug(text: &str) -> String {
    let mut out = String::new();
    let mut last_sep = true;
    for c in text.chars().take(60) {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    let trimmed = out.trim_end_matches('_');
    trimmed.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ade::Ade;
    use crate::arce::Arce;
    use crate::engine::ScoringEngine;
    use crate::tre::Tre;
    use citesight_common::fixtures::{product_page, sparse_page};
    use citesight_common::Sentiment;

    fn score_all(page: &citesight_common::PageModel) -> Vec<EngineResult> {
        vec![
            Ade::default().score(page),
            Arce::default().score(page),
            Tre::default().score(page),
        ]
    }

    fn uncited_sim(missing: &[&str]) -> SimulationResult {
        SimulationResult {
            brand_cited: false,
            citation_count: 0,
            missing_signals: missing.iter().map(|s| s.to_string()).collect(),
            citation_contexts: vec![],
            sentiment: Sentiment::Neutral,
        }
    }

    #[test]
    fn clean_page_produces_no_gaps() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(&score_all(&product_page()), None);
        assert!(gaps.is_empty(), "unexpected gaps: {gaps:?}");
    }

    #[test]
    fn missing_purchase_cta_always_raises_no_buy_button() {
        let mut page = product_page();
        page.affordances
            .retain(|a| a.intent != citesight_common::AffordanceIntent::Purchase);

        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(&score_all(&page), None);
        let found = gaps.iter().find(|g| g.gap_type == "no_buy_button").unwrap();
        assert_eq!(found.severity, Severity::Critical);
        assert_eq!(found.source, GapSource::Engine("tre".into()));
    }

    #[test]
    fn sparse_page_raises_missing_h1_and_low_richness() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(&score_all(&sparse_page()), None);
        assert!(gaps.iter().any(|g| g.gap_type == "missing_h1"));
        assert!(gaps.iter().any(|g| g.gap_type == "low_attribute_richness"));
    }

    #[test]
    fn gaps_sort_by_severity_then_origin_weight() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(&score_all(&sparse_page()), None);

        for pair in gaps.windows(2) {
            assert!(
                pair[0].severity >= pair[1].severity,
                "severity order violated: {pair:?}"
            );
        }
        // At equal severity, ade (weight 0.30) gaps come before tre (0.20).
        let highs: Vec<&str> = gaps
            .iter()
            .filter(|g| g.severity == Severity::High)
            .map(|g| g.source.as_str())
            .collect();
        let first_tre = highs.iter().position(|s| *s == "tre");
        let last_ade = highs.iter().rposition(|s| *s == "ade");
        if let (Some(first_tre), Some(last_ade)) = (first_tre, last_ade) {
            assert!(last_ade < first_tre, "high gaps out of weight order: {highs:?}");
        }
    }

    #[test]
    fn uncited_simulation_raises_a_critical_gap_ranked_first() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(
            &score_all(&sparse_page()),
            Some(&uncited_sim(&["customer reviews", "pricing information"])),
        );

        assert_eq!(gaps[0].gap_type, "not_cited_by_ai");
        assert_eq!(gaps[0].source, GapSource::Simulation);
        assert_eq!(
            gaps.iter()
                .filter(|g| g.gap_type.starts_with("missing_signal_"))
                .count(),
            2
        );
    }

    #[test]
    fn absent_simulation_contributes_no_gaps() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let gaps = analyzer.analyze(&score_all(&sparse_page()), None);
        assert!(gaps.iter().all(|g| g.source != GapSource::Simulation));
    }

    #[test]
    fn no_gap_repeats_per_type_and_source() {
        let analyzer = GapAnalyzer::new(&AnalysisConfig::default());
        let results = score_all(&sparse_page());
        // Same engine result supplied twice must not double its gaps.
        let doubled: Vec<EngineResult> =
            results.iter().chain(results.iter()).cloned().collect();
        let gaps = analyzer.analyze(&doubled, Some(&uncited_sim(&["reviews", "reviews"])));

        let mut seen = HashSet::new();
        for g in &gaps {
            assert!(
                seen.insert((g.gap_type.clone(), g.source.clone())),
                "duplicate gap: {} from {}",
                g.gap_type,
                g.source
            );
        }
    }

    #[test]
    fn slug_is_bounded_and_clean() {
        assert_eq!(slug("Customer Reviews & Ratings"), "customer_reviews_ratings");
        assert_eq!(slug("   "), "");
        assert!(slug(&"long attribute name ".repeat(10)).len() <= 40);
    }
}
