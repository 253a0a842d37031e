//! Product-tuning constants. All of these are deliberate defaults, not
//! derived values; override the sub-weight structs per engine when a
//! deployment needs a different balance.

/// Required fields for a product-shaped record. Completeness is the
/// fraction of these present.
pub const REQUIRED_PRODUCT_FIELDS: &[&str] = &["name", "description", "image", "offers", "brand"];

/// Description length (chars) at which attribute richness saturates.
pub const DESCRIPTION_RICHNESS_CEILING: f64 = 300.0;

/// Descriptions shorter than this raise a `short_description` gap.
pub const SHORT_DESCRIPTION_FLOOR: f64 = 100.0;

/// Key-value pair count at which attribute richness saturates.
pub const ATTRIBUTE_FIELD_CEILING: f64 = 12.0;

/// Richness sub-scores below this raise a `low_attribute_richness` gap.
pub const LOW_RICHNESS_THRESHOLD: f64 = 30.0;

/// Image count at which the image-count band saturates.
pub const IMAGE_COUNT_CEILING: f64 = 4.0;

/// Spec-keyword mentions at which technical-spec depth saturates.
pub const SPEC_KEYWORD_CEILING: f64 = 5.0;

/// Keywords whose presence in body text indicates specification depth.
pub const SPEC_KEYWORDS: &[&str] = &[
    "specification",
    "dimensions",
    "weight",
    "material",
    "features",
    "technical",
    "capacity",
    "size",
];

/// Semantic-container ratio granting full structure credit.
pub const SEMANTIC_RATIO_TARGET: f64 = 0.5;

/// Semantic ratios below this raise a `low_semantic_structure` gap.
pub const LOW_SEMANTIC_RATIO: f64 = 0.3;

/// Reading ease at or above this earns full readability credit.
pub const READING_EASE_FULL_CREDIT: f64 = 60.0;

/// Reading ease below this raises a `low_readability` gap.
pub const READING_EASE_LOW_THRESHOLD: f64 = 30.0;

/// Texts under this word count score zero reading ease.
pub const MIN_READABLE_WORDS: usize = 50;

/// Heading-credit ceiling when the hierarchy has any violation. Partial
/// structure still helps, so violations cap the sub-metric instead of
/// zeroing it.
pub const HEADING_PARTIAL_CEILING: f64 = 35.0;

/// Open Graph entries needed for the metadata band.
pub const OPEN_GRAPH_MIN: u32 = 3;

/// Engine-score ceiling for TRE when no trust signal is present at all.
/// A buy button alone never makes a page transaction-ready.
pub const NO_TRUST_SCORE_CEILING: f64 = 70.0;

/// Keywords indicating visible payment options.
pub const PAYMENT_KEYWORDS: &[&str] = &[
    "visa",
    "mastercard",
    "paypal",
    "credit card",
    "debit card",
    "apple pay",
    "google pay",
    "payment",
];

/// Keywords indicating shipping/delivery information.
pub const SHIPPING_KEYWORDS: &[&str] =
    &["shipping", "delivery", "ships to", "free shipping", "express delivery"];

/// Keywords indicating a reachable human (beyond e-mail/phone regexes).
pub const CONTACT_KEYWORDS: &[&str] = &["contact us", "visit us", "customer service", "support"];

/// Composite-sort weight applied to simulation-sourced gaps so a missed
/// citation outranks engine gaps of equal severity.
pub const SIMULATION_SORT_WEIGHT: f64 = 1.0;

/// Engines at or above this score count as strengths in the summary.
pub const STRENGTH_SCORE_FLOOR: f64 = 80.0;

/// Engines below this score count as weaknesses in the summary.
pub const WEAKNESS_SCORE_CEILING: f64 = 60.0;

/// Remediations listed in the executive summary.
pub const TOP_RECOMMENDATION_COUNT: usize = 5;

/// Relative sub-metric weights for the Attribute Density engine.
#[derive(Debug, Clone, Copy)]
pub struct AdeWeights {
    pub schema: f64,
    pub richness: f64,
    pub images: f64,
    pub specs: f64,
}

impl Default for AdeWeights {
    fn default() -> Self {
        Self { schema: 0.40, richness: 0.30, images: 0.20, specs: 0.10 }
    }
}

/// Relative sub-metric weights for the AI Readability engine.
#[derive(Debug, Clone, Copy)]
pub struct ArceWeights {
    pub structure: f64,
    pub readability: f64,
    pub headings: f64,
    pub metadata: f64,
}

impl Default for ArceWeights {
    fn default() -> Self {
        Self { structure: 0.30, readability: 0.25, headings: 0.25, metadata: 0.20 }
    }
}

/// Relative sub-metric weights for the Transaction Readiness engine.
#[derive(Debug, Clone, Copy)]
pub struct TreWeights {
    pub cta: f64,
    pub trust: f64,
    pub contact: f64,
    pub payment: f64,
}

impl Default for TreWeights {
    fn default() -> Self {
        Self { cta: 0.30, trust: 0.30, contact: 0.20, payment: 0.20 }
    }
}
