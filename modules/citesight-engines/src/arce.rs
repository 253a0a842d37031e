//! AI Readability Engine: how easily a language model can extract,
//! summarize, and reuse the page's content.

use std::collections::BTreeMap;

use citesight_common::{EngineResult, MetricValue, PageModel};

use crate::engine::ScoringEngine;
use crate::readability::reading_ease;
use crate::scoring::{ratio, weighted};
use crate::tuning::{
    ArceWeights, HEADING_PARTIAL_CEILING, OPEN_GRAPH_MIN, READING_EASE_FULL_CREDIT,
    READING_EASE_LOW_THRESHOLD, SEMANTIC_RATIO_TARGET,
};

#[derive(Default)]
pub struct Arce {
    weights: ArceWeights,
}

#[derive(Debug, Clone, Copy)]
struct HierarchyCheck {
    h1_count: usize,
    skipped_level: bool,
    valid: bool,
}

impl Arce {
    pub fn new(weights: ArceWeights) -> Self {
        Self { weights }
    }

    fn readability_score(ease: f64) -> f64 {
        if ease >= READING_EASE_FULL_CREDIT {
            100.0
        } else if ease >= READING_EASE_LOW_THRESHOLD {
            ease / READING_EASE_FULL_CREDIT * 100.0
        } else {
            ease / READING_EASE_LOW_THRESHOLD * 50.0
        }
    }

    /// Valid means exactly one h1 and strictly non-skipping nesting below
    /// it. Nesting starts at level 1, so an opening h3 counts as a skip.
    fn check_hierarchy(page: &PageModel) -> HierarchyCheck {
        let h1_count = page.headings.iter().filter(|h| h.level == 1).count();
        let mut skipped_level = false;
        let mut prev_level = 0u8;
        for heading in &page.headings {
            if heading.level > prev_level + 1 {
                skipped_level = true;
            }
            prev_level = heading.level;
        }
        HierarchyCheck {
            h1_count,
            skipped_level,
            valid: !page.headings.is_empty() && h1_count == 1 && !skipped_level,
        }
    }

    /// Full credit for a valid hierarchy; any violation caps the
    /// sub-metric at a low ceiling since partial structure still helps.
    fn heading_score(check: HierarchyCheck, has_headings: bool) -> f64 {
        if !has_headings {
            return 0.0;
        }
        if check.valid {
            return 100.0;
        }
        let mut credit: f64 = 0.0;
        if check.h1_count >= 1 {
            credit += 40.0;
        }
        if check.h1_count == 1 {
            credit += 30.0;
        }
        if !check.skipped_level {
            credit += 30.0;
        }
        credit.min(HEADING_PARTIAL_CEILING)
    }

    fn metadata_score(page: &PageModel) -> f64 {
        let mut score = 0.0;
        if page.meta.title.as_deref().is_some_and(|t| !t.is_empty()) {
            score += 25.0;
        }
        if page
            .meta
            .description
            .as_deref()
            .is_some_and(|d| !d.is_empty())
        {
            score += 25.0;
        }
        if page.meta.open_graph_count >= OPEN_GRAPH_MIN {
            score += 25.0;
        }
        if page.meta.canonical.is_some() {
            score += 25.0;
        }
        score
    }
}

impl ScoringEngine for Arce {
    fn id(&self) -> &'static str {
        "arce"
    }

    fn score(&self, page: &PageModel) -> EngineResult {
        let semantic_ratio = page.structure.semantic_ratio();
        let structure_score = ratio(semantic_ratio, SEMANTIC_RATIO_TARGET) * 100.0;

        let ease = reading_ease(&page.text);
        let readability_score = Self::readability_score(ease);

        let check = Self::check_hierarchy(page);
        let heading_score = Self::heading_score(check, !page.headings.is_empty());

        let metadata_score = Self::metadata_score(page);

        let score = weighted(&[
            (structure_score, self.weights.structure),
            (readability_score, self.weights.readability),
            (heading_score, self.weights.headings),
            (metadata_score, self.weights.metadata),
        ]);

        let mut metrics: BTreeMap<String, MetricValue> = BTreeMap::new();
        metrics.insert("semantic_structure_score".into(), structure_score.into());
        metrics.insert("readability_score".into(), readability_score.into());
        metrics.insert("heading_hierarchy_score".into(), heading_score.into());
        metrics.insert("metadata_score".into(), metadata_score.into());
        metrics.insert("semantic_ratio".into(), semantic_ratio.into());
        metrics.insert("reading_ease".into(), ease.into());
        metrics.insert("word_count".into(), (page.word_count() as f64).into());
        metrics.insert("has_h1".into(), (check.h1_count >= 1).into());
        metrics.insert("multiple_h1".into(), (check.h1_count > 1).into());
        metrics.insert("skipped_heading_level".into(), check.skipped_level.into());
        metrics.insert("valid_hierarchy".into(), check.valid.into());
        metrics.insert(
            "has_meta_description".into(),
            page.meta
                .description
                .as_deref()
                .is_some_and(|d| !d.is_empty())
                .into(),
        );

        EngineResult::new(self.id(), score, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesight_common::fixtures::{heading, product_page, sparse_page};

    #[test]
    fn well_structured_page_scores_high() {
        let result = Arce::default().score(&product_page());
        assert!(result.score > 75.0, "got {}", result.score);
        assert_eq!(result.flag("valid_hierarchy"), Some(true));
        assert_eq!(result.num("heading_hierarchy_score"), Some(100.0));
    }

    #[test]
    fn sparse_page_scores_below_thirty() {
        let result = Arce::default().score(&sparse_page());
        assert!(result.score < 30.0, "got {}", result.score);
        assert_eq!(result.flag("has_h1"), Some(false));
        assert_eq!(result.num("reading_ease"), Some(0.0));
    }

    #[test]
    fn multiple_h1_caps_heading_credit_without_zeroing_it() {
        let mut page = product_page();
        page.headings.insert(0, heading(1, "Second top heading"));

        let result = Arce::default().score(&page);
        assert_eq!(result.flag("multiple_h1"), Some(true));
        assert_eq!(result.flag("valid_hierarchy"), Some(false));
        let credit = result.num("heading_hierarchy_score").unwrap();
        assert!(credit > 0.0, "violations cap credit, they do not zero it");
        assert!(credit <= HEADING_PARTIAL_CEILING, "got {credit}");
    }

    #[test]
    fn skipped_level_invalidates_the_hierarchy() {
        let mut page = product_page();
        // h1 followed directly by h3.
        page.headings = vec![heading(1, "Title"), heading(3, "Deep section")];

        let result = Arce::default().score(&page);
        assert_eq!(result.flag("skipped_heading_level"), Some(true));
        assert!(result.num("heading_hierarchy_score").unwrap() <= HEADING_PARTIAL_CEILING);
    }

    #[test]
    fn opening_without_h1_counts_as_a_skip() {
        let mut page = product_page();
        page.headings = vec![heading(2, "Section")];

        let result = Arce::default().score(&page);
        assert_eq!(result.flag("has_h1"), Some(false));
        assert_eq!(result.flag("skipped_heading_level"), Some(true));
    }

    #[test]
    fn no_headings_scores_zero_heading_credit() {
        let mut page = product_page();
        page.headings.clear();

        let result = Arce::default().score(&page);
        assert_eq!(result.num("heading_hierarchy_score"), Some(0.0));
    }

    #[test]
    fn semantic_ratio_at_target_earns_full_structure_credit() {
        let mut page = product_page();
        page.structure.semantic_nodes = 10;
        page.structure.generic_nodes = 10;

        let result = Arce::default().score(&page);
        assert_eq!(result.num("semantic_structure_score"), Some(100.0));
    }

    #[test]
    fn scoring_is_idempotent() {
        let page = product_page();
        let engine = Arce::default();
        let a = serde_json::to_string(&engine.score(&page)).unwrap();
        let b = serde_json::to_string(&engine.score(&page)).unwrap();
        assert_eq!(a, b);
    }
}
