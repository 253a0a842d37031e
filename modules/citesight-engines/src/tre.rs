//! Transaction Readiness Engine: can an assistant confidently point a
//! buyer at this page and expect the purchase to go through?

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use citesight_common::{AffordanceIntent, EngineResult, MetricValue, PageModel};

use crate::engine::ScoringEngine;
use crate::scoring::{band, weighted};
use crate::tuning::{
    TreWeights, CONTACT_KEYWORDS, NO_TRUST_SCORE_CEILING, PAYMENT_KEYWORDS, SHIPPING_KEYWORDS,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b|\(\d{3}\)\s*\d{3}[-.\s]?\d{4}").unwrap()
});

#[derive(Default)]
pub struct Tre {
    weights: TreWeights,
}

#[derive(Debug, Clone, Copy)]
struct OfferCheck {
    present: bool,
    priced: bool,
}

impl Tre {
    pub fn new(weights: TreWeights) -> Self {
        Self { weights }
    }

    /// An offer counts as priced only with both a price and a currency;
    /// an assistant cannot quote "contact us for pricing".
    fn check_offer(page: &PageModel) -> OfferCheck {
        if let Some(offer) = page
            .records
            .iter()
            .find(|r| r.record_type.eq_ignore_ascii_case("offer"))
        {
            return OfferCheck {
                present: true,
                priced: offer.has_field("price") && offer.has_field("priceCurrency"),
            };
        }

        let offers = page
            .product_record()
            .and_then(|r| r.fields.get("offers"))
            .filter(|v| !v.is_null());
        let Some(offers) = offers else {
            return OfferCheck { present: false, priced: false };
        };

        let priced = match offers {
            serde_json::Value::Object(map) => {
                map.contains_key("price") && map.contains_key("priceCurrency")
            }
            serde_json::Value::Array(entries) => entries.iter().any(|entry| {
                entry.get("price").is_some() && entry.get("priceCurrency").is_some()
            }),
            _ => false,
        };
        OfferCheck { present: true, priced }
    }

    fn trust_score(page: &PageModel) -> f64 {
        let bands = [
            page.https,
            page.trust.has_reviews(),
            !page.trust.policy_links.is_empty(),
        ];
        bands.iter().filter(|b| **b).count() as f64 * (100.0 / 3.0)
    }

    fn contact_score(page: &PageModel, text: &str) -> (f64, bool, bool) {
        let has_email = EMAIL_RE.is_match(text);
        let has_phone = PHONE_RE.is_match(text);
        let has_channel = page.has_affordance(AffordanceIntent::Contact)
            || CONTACT_KEYWORDS.iter().any(|k| text.contains(k));

        let score = 0.35 * band(has_email) + 0.35 * band(has_phone) + 0.30 * band(has_channel);
        (score * 100.0, has_email, has_phone)
    }

    fn payment_score(text: &str) -> f64 {
        let payment = PAYMENT_KEYWORDS.iter().any(|k| text.contains(k));
        let shipping = SHIPPING_KEYWORDS.iter().any(|k| text.contains(k));
        (0.5 * band(payment) + 0.5 * band(shipping)) * 100.0
    }
}

impl ScoringEngine for Tre {
    fn id(&self) -> &'static str {
        "tre"
    }

    fn score(&self, page: &PageModel) -> EngineResult {
        let text = page.text.to_lowercase();

        let has_purchase_cta = page.has_affordance(AffordanceIntent::Purchase);
        let offer = Self::check_offer(page);
        let cta_score = (0.5 * band(has_purchase_cta)
            + 0.3 * band(offer.present)
            + 0.2 * band(offer.priced))
            * 100.0;

        let trust_score = Self::trust_score(page);
        let (contact_score, has_email, has_phone) = Self::contact_score(page, &text);
        let payment_score = Self::payment_score(&text);

        let mut score = weighted(&[
            (cta_score, self.weights.cta),
            (trust_score, self.weights.trust),
            (contact_score, self.weights.contact),
            (payment_score, self.weights.payment),
        ]);

        // A buy button alone is not transaction readiness: with zero trust
        // signals the engine score is capped.
        let trust_capped = trust_score == 0.0;
        if trust_capped {
            score = score.min(NO_TRUST_SCORE_CEILING);
        }

        let mut metrics: BTreeMap<String, MetricValue> = BTreeMap::new();
        metrics.insert("cta_score".into(), cta_score.into());
        metrics.insert("trust_score".into(), trust_score.into());
        metrics.insert("contact_score".into(), contact_score.into());
        metrics.insert("payment_score".into(), payment_score.into());
        metrics.insert("buy_button_found".into(), has_purchase_cta.into());
        metrics.insert("has_offer".into(), offer.present.into());
        metrics.insert("offer_priced".into(), offer.priced.into());
        metrics.insert("has_ssl".into(), page.https.into());
        metrics.insert("has_reviews".into(), page.trust.has_reviews().into());
        metrics.insert(
            "has_policy_links".into(),
            (!page.trust.policy_links.is_empty()).into(),
        );
        metrics.insert("has_email".into(), has_email.into());
        metrics.insert("has_phone".into(), has_phone.into());
        metrics.insert("has_contact".into(), (contact_score > 0.0).into());
        metrics.insert("trust_capped".into(), trust_capped.into());

        EngineResult::new(self.id(), score, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesight_common::fixtures::{empty_page, product_page, sparse_page};
    use citesight_common::TrustMarkers;

    #[test]
    fn transaction_ready_page_scores_high() {
        let result = Tre::default().score(&product_page());
        assert!(result.score > 85.0, "got {}", result.score);
        assert_eq!(result.flag("buy_button_found"), Some(true));
        assert_eq!(result.flag("offer_priced"), Some(true));
        assert_eq!(result.flag("trust_capped"), Some(false));
    }

    #[test]
    fn buy_button_without_trust_signals_is_capped() {
        let mut page = product_page();
        page.https = false;
        page.trust = TrustMarkers::default();

        let result = Tre::default().score(&page);
        assert_eq!(result.flag("buy_button_found"), Some(true));
        assert_eq!(result.flag("trust_capped"), Some(true));
        assert!(
            result.score <= NO_TRUST_SCORE_CEILING,
            "no trust caps the engine, got {}",
            result.score
        );
    }

    #[test]
    fn missing_ssl_keeps_score_below_perfect() {
        let mut page = product_page();
        page.https = false;

        let result = Tre::default().score(&page);
        assert_eq!(result.flag("has_ssl"), Some(false));
        assert!(result.score < 100.0);
    }

    #[test]
    fn sparse_page_has_no_cta_and_no_trust() {
        let result = Tre::default().score(&sparse_page());
        assert_eq!(result.flag("buy_button_found"), Some(false));
        assert_eq!(result.num("trust_score"), Some(0.0));
        assert!(result.score < 30.0, "got {}", result.score);
    }

    #[test]
    fn offer_without_currency_is_not_priced() {
        let mut page = product_page();
        page.records[0]
            .fields
            .insert("offers".into(), serde_json::json!({"price": "129.00"}));

        let result = Tre::default().score(&page);
        assert_eq!(result.flag("has_offer"), Some(true));
        assert_eq!(result.flag("offer_priced"), Some(false));
    }

    #[test]
    fn contact_detection_finds_email_and_phone() {
        let mut page = empty_page();
        page.text = "Reach us at hello@example.com or (612) 555-0188.".to_string();

        let result = Tre::default().score(&page);
        assert_eq!(result.flag("has_email"), Some(true));
        assert_eq!(result.flag("has_phone"), Some(true));
    }

    #[test]
    fn scoring_is_idempotent() {
        let page = product_page();
        let engine = Tre::default();
        let a = serde_json::to_string(&engine.score(&page)).unwrap();
        let b = serde_json::to_string(&engine.score(&page)).unwrap();
        assert_eq!(a, b);
    }
}
