//! Page fixtures for tests. No network, no crawler: tests assemble the
//! exact PageModel shape they need on top of these.

use std::collections::BTreeMap;

use crate::types::{
    Affordance, AffordanceIntent, Heading, ImageRef, PageMeta, PageModel, StructureStats,
    StructuredRecord, TrustMarkers,
};

pub fn record(record_type: &str, fields: &[(&str, serde_json::Value)]) -> StructuredRecord {
    StructuredRecord {
        record_type: record_type.to_string(),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}

pub fn heading(level: u8, text: &str) -> Heading {
    Heading { level, text: text.to_string() }
}

pub fn affordance(label: &str, intent: AffordanceIntent) -> Affordance {
    Affordance { label: label.to_string(), intent }
}

/// An https page with no content at all.
pub fn empty_page() -> PageModel {
    PageModel {
        url: "https://shop.example.com/p/trail-runner"
            .parse()
            .expect("fixture url"),
        text: String::new(),
        headings: vec![],
        records: vec![],
        affordances: vec![],
        https: true,
        trust: TrustMarkers::default(),
        images: vec![],
        structure: StructureStats::default(),
        meta: PageMeta::default(),
    }
}

/// A well-marked-up product page: complete schema, clean hierarchy,
/// purchase CTA, reviews, policies, contact and payment copy.
pub fn product_page() -> PageModel {
    let description = "The Trail Runner 2 is a lightweight trail shoe built for long runs \
                       on rough ground. The upper is a tight woven mesh that sheds mud and \
                       dries fast. A wide base and a firm heel cup keep your foot stable on \
                       loose rock. The foam core returns energy with each step and holds its \
                       shape past five hundred miles. A reinforced toe guard takes the sting \
                       out of kicked roots and sharp scree.";

    let mut page = empty_page();
    page.text = format!(
        "{description} Add to cart today with free shipping on all orders. We accept Visa, \
         Mastercard and PayPal. Full specifications: weight 240 grams, drop 6 mm, sizes 36 \
         to 48, upper material woven mesh. Thirty day return policy and a two year \
         guarantee. Questions? Contact us at support@example.com or call 555-201-4433."
    );
    page.headings = vec![
        heading(1, "Trail Runner 2"),
        heading(2, "Built for rough ground"),
        heading(3, "Upper and fit"),
        heading(3, "Midsole"),
        heading(2, "Specifications"),
    ];
    page.records = vec![record(
        "Product",
        &[
            ("name", serde_json::json!("Trail Runner 2")),
            ("description", serde_json::json!(description)),
            ("image", serde_json::json!("https://shop.example.com/img/tr2.jpg")),
            ("brand", serde_json::json!("Example Running Co")),
            ("sku", serde_json::json!("TR2-2026")),
            (
                "offers",
                serde_json::json!({
                    "price": "129.00",
                    "priceCurrency": "EUR",
                    "availability": "InStock"
                }),
            ),
            ("color", serde_json::json!("Moss")),
            ("material", serde_json::json!("Woven mesh")),
        ],
    )];
    page.affordances = vec![
        affordance("Add to cart", AffordanceIntent::Purchase),
        affordance("Contact support", AffordanceIntent::Contact),
        affordance("All shoes", AffordanceIntent::Navigation),
    ];
    page.trust = TrustMarkers {
        review_count: 214,
        rating: Some(4.6),
        policy_links: vec!["https://shop.example.com/returns".to_string()],
    };
    page.images = vec![
        ImageRef {
            src: "https://shop.example.com/img/tr2.jpg".to_string(),
            alt: Some("Trail Runner 2 side view in moss green".to_string()),
        },
        ImageRef {
            src: "https://shop.example.com/img/tr2-sole.jpg".to_string(),
            alt: Some("Outsole lug pattern".to_string()),
        },
        ImageRef {
            src: "https://shop.example.com/img/tr2-detail.jpg".to_string(),
            alt: Some("Mesh upper close-up".to_string()),
        },
    ];
    page.structure = StructureStats { semantic_nodes: 14, generic_nodes: 10 };
    page.meta = PageMeta {
        title: Some("Trail Runner 2 — Example Running Co".to_string()),
        description: Some("Lightweight trail shoe for long runs on rough ground.".to_string()),
        canonical: Some("https://shop.example.com/p/trail-runner".to_string()),
        open_graph_count: 5,
    };
    page
}

/// A near-empty page: no structured data, no headings, a handful of words.
pub fn sparse_page() -> PageModel {
    let mut page = empty_page();
    page.https = false;
    page.url = "http://example.com/".parse().expect("fixture url");
    page.text = "Welcome to our site. Check back soon.".to_string();
    page.meta.title = Some("Home".to_string());
    page
}
