//! Attribute Density Engine: how richly and clearly product attributes
//! are defined in the page's structured markup.

use std::collections::BTreeMap;

use citesight_common::{EngineResult, MetricValue, PageModel, StructuredRecord};

use crate::engine::ScoringEngine;
use crate::scoring::{band, completeness, ratio, saturating, weighted};
use crate::tuning::{
    AdeWeights, ATTRIBUTE_FIELD_CEILING, DESCRIPTION_RICHNESS_CEILING, IMAGE_COUNT_CEILING,
    REQUIRED_PRODUCT_FIELDS, SPEC_KEYWORDS, SPEC_KEYWORD_CEILING,
};

const IDENTIFIER_FIELDS: &[&str] = &["sku", "gtin", "mpn"];

#[derive(Default)]
pub struct Ade {
    weights: AdeWeights,
}

impl Ade {
    pub fn new(weights: AdeWeights) -> Self {
        Self { weights }
    }

    fn schema_completeness(product: Option<&StructuredRecord>) -> (f64, usize) {
        let Some(record) = product else {
            return (0.0, 0);
        };
        let present = REQUIRED_PRODUCT_FIELDS
            .iter()
            .filter(|field| record.has_field(field))
            .count();
        (
            completeness(present, REQUIRED_PRODUCT_FIELDS.len()) * 100.0,
            present,
        )
    }

    /// Description length and key-value breadth on a diminishing-returns
    /// curve; identifiers add fixed bands. Counts above the ceilings add
    /// nothing.
    fn attribute_richness(page: &PageModel, product: Option<&StructuredRecord>) -> (f64, usize) {
        let description = product
            .and_then(|r| r.field_str("description"))
            .or(page.meta.description.as_deref())
            .unwrap_or("");

        let desc_part = saturating(description.len() as f64, DESCRIPTION_RICHNESS_CEILING) * 0.5;
        let field_count = product.map_or(0, |r| r.fields.len());
        let breadth_part = saturating(field_count as f64, ATTRIBUTE_FIELD_CEILING) * 0.3;

        let has_brand = product.is_some_and(|r| r.has_field("brand"));
        let has_identifier =
            product.is_some_and(|r| IDENTIFIER_FIELDS.iter().any(|f| r.has_field(f)));
        let ident_part = 0.1 * band(has_brand) + 0.1 * band(has_identifier);

        ((desc_part + breadth_part + ident_part) * 100.0, description.len())
    }

    fn image_signal(page: &PageModel) -> (f64, f64) {
        if page.images.is_empty() {
            return (0.0, 0.0);
        }
        let count_part = ratio(page.images.len() as f64, IMAGE_COUNT_CEILING) * 0.5;
        let with_alt = page
            .images
            .iter()
            .filter(|img| img.alt.as_deref().is_some_and(|alt| !alt.is_empty()))
            .count();
        let alt_coverage = completeness(with_alt, page.images.len());
        ((count_part + alt_coverage * 0.5) * 100.0, alt_coverage)
    }

    fn technical_specs(page: &PageModel) -> f64 {
        let text = page.text.to_lowercase();
        let mentions = SPEC_KEYWORDS
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .count();
        ratio(mentions as f64, SPEC_KEYWORD_CEILING) * 100.0
    }
}

impl ScoringEngine for Ade {
    fn id(&self) -> &'static str {
        "ade"
    }

    fn score(&self, page: &PageModel) -> EngineResult {
        let product = page.product_record();

        let (schema_score, _present) = Self::schema_completeness(product);
        let (richness_score, description_length) = Self::attribute_richness(page, product);
        let (image_score, alt_coverage) = Self::image_signal(page);
        let specs_score = Self::technical_specs(page);

        let score = weighted(&[
            (schema_score, self.weights.schema),
            (richness_score, self.weights.richness),
            (image_score, self.weights.images),
            (specs_score, self.weights.specs),
        ]);

        let mut metrics: BTreeMap<String, MetricValue> = BTreeMap::new();
        metrics.insert("schema_completeness_score".into(), schema_score.into());
        metrics.insert("attribute_richness_score".into(), richness_score.into());
        metrics.insert("image_signal_score".into(), image_score.into());
        metrics.insert("technical_specs_score".into(), specs_score.into());
        metrics.insert("product_record_present".into(), product.is_some().into());
        metrics.insert(
            "schema_field_count".into(),
            (product.map_or(0, |r| r.fields.len()) as f64).into(),
        );
        metrics.insert("description_length".into(), (description_length as f64).into());
        metrics.insert("image_count".into(), (page.images.len() as f64).into());
        metrics.insert("alt_coverage".into(), alt_coverage.into());
        for field in REQUIRED_PRODUCT_FIELDS {
            metrics.insert(
                format!("schema_has_{field}"),
                product.is_some_and(|r| r.has_field(field)).into(),
            );
        }

        EngineResult::new(self.id(), score, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesight_common::fixtures::{empty_page, product_page, record, sparse_page};

    #[test]
    fn complete_product_page_scores_high() {
        let result = Ade::default().score(&product_page());
        assert!(result.score > 80.0, "got {}", result.score);
        assert_eq!(result.flag("product_record_present"), Some(true));
        assert_eq!(result.flag("schema_has_offers"), Some(true));
    }

    #[test]
    fn empty_page_scores_zero() {
        let result = Ade::default().score(&empty_page());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.flag("product_record_present"), Some(false));
    }

    #[test]
    fn sparse_page_scores_below_thirty() {
        let result = Ade::default().score(&sparse_page());
        assert!(result.score < 30.0, "got {}", result.score);
    }

    #[test]
    fn missing_offers_field_is_reported_and_costs_schema_credit() {
        let mut page = product_page();
        page.records[0].fields.remove("offers");

        let result = Ade::default().score(&page);
        assert_eq!(result.flag("schema_has_offers"), Some(false));
        let schema = result.num("schema_completeness_score").unwrap();
        assert!((schema - 80.0).abs() < 1e-9, "4 of 5 required fields, got {schema}");
    }

    #[test]
    fn richness_saturates_above_the_ceiling() {
        let page = product_page();
        let baseline = Ade::default().score(&page);

        let mut padded = page.clone();
        let long = padded.records[0]
            .field_str("description")
            .unwrap()
            .repeat(20);
        padded.records[0]
            .fields
            .insert("description".into(), serde_json::json!(long));

        let result = Ade::default().score(&padded);
        assert_eq!(
            result.num("attribute_richness_score"),
            baseline.num("attribute_richness_score"),
            "description length past the ceiling must not add points"
        );
    }

    #[test]
    fn record_without_required_fields_still_scores_breadth() {
        let mut page = empty_page();
        page.records = vec![record(
            "Product",
            &[
                ("color", serde_json::json!("red")),
                ("fit", serde_json::json!("wide")),
            ],
        )];
        let result = Ade::default().score(&page);
        assert_eq!(result.num("schema_completeness_score"), Some(0.0));
        assert!(result.num("attribute_richness_score").unwrap() > 0.0);
    }

    #[test]
    fn scoring_is_idempotent() {
        let page = product_page();
        let engine = Ade::default();
        let a = serde_json::to_string(&engine.score(&page)).unwrap();
        let b = serde_json::to_string(&engine.score(&page)).unwrap();
        assert_eq!(a, b);
    }
}
