use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

// --- Page Model ---

/// A heading in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    /// 1 = h1 .. 6 = h6
    pub level: u8,
    pub text: String,
}

/// A machine-readable descriptive record embedded in the page
/// (Product/Offer-shaped key→value markup).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// Record type as declared in the markup (e.g. "Product", "Offer").
    pub record_type: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl StructuredRecord {
    /// A field counts as present only when it is non-null and, for strings
    /// and arrays, non-empty.
    pub fn has_field(&self, name: &str) -> bool {
        match self.fields.get(name) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        }
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceIntent {
    Purchase,
    Contact,
    Navigation,
}

impl std::fmt::Display for AffordanceIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffordanceIntent::Purchase => write!(f, "purchase"),
            AffordanceIntent::Contact => write!(f, "contact"),
            AffordanceIntent::Navigation => write!(f, "navigation"),
        }
    }
}

/// An interactive element (button/link) with a classified intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affordance {
    pub label: String,
    pub intent: AffordanceIntent,
}

/// Trust markers the crawler detected on the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustMarkers {
    pub review_count: u32,
    pub rating: Option<f64>,
    pub policy_links: Vec<String>,
}

impl TrustMarkers {
    pub fn has_reviews(&self) -> bool {
        self.review_count > 0 || self.rating.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: Option<String>,
}

/// Counts of structural containers by role, as classified by the crawler.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StructureStats {
    /// Containers with meaning-bearing roles (article, section, main, nav).
    pub semantic_nodes: u32,
    /// Generic containers (div/span-like).
    pub generic_nodes: u32,
}

impl StructureStats {
    /// Fraction of structural containers that are meaning-bearing.
    pub fn semantic_ratio(&self) -> f64 {
        let total = self.semantic_nodes + self.generic_nodes;
        if total == 0 {
            0.0
        } else {
            f64::from(self.semantic_nodes) / f64::from(total)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub open_graph_count: u32,
}

/// Normalized snapshot of one crawled page. Created once per analysis run
/// and never mutated; engines receive it by shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageModel {
    pub url: Url,
    /// Extracted body text.
    pub text: String,
    pub headings: Vec<Heading>,
    pub records: Vec<StructuredRecord>,
    pub affordances: Vec<Affordance>,
    /// Transport security present (https).
    pub https: bool,
    pub trust: TrustMarkers,
    pub images: Vec<ImageRef>,
    pub structure: StructureStats,
    pub meta: PageMeta,
}

impl PageModel {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// First product-shaped record, if any.
    pub fn product_record(&self) -> Option<&StructuredRecord> {
        self.records
            .iter()
            .find(|r| r.record_type.eq_ignore_ascii_case("product"))
    }

    pub fn has_affordance(&self, intent: AffordanceIntent) -> bool {
        self.affordances.iter().any(|a| a.intent == intent)
    }
}

// --- Scoring Types ---

/// Letter grade with fixed bands: [90,100]→A, [80,90)→B, [70,80)→C,
/// [60,70)→D, below→F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

/// A raw metric an engine exposes alongside its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Num(f64),
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Num(v)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Num(n) => Some(*n),
            MetricValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetricValue::Bool(b) => Some(*b),
            MetricValue::Num(_) => None,
        }
    }
}

/// One engine's verdict on a page. Immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResult {
    pub engine: String,
    /// 0-100
    pub score: f64,
    pub grade: Grade,
    pub metrics: BTreeMap<String, MetricValue>,
}

impl EngineResult {
    pub fn new(engine: &str, score: f64, metrics: BTreeMap<String, MetricValue>) -> Self {
        let score = score.clamp(0.0, 100.0);
        Self {
            engine: engine.to_string(),
            score,
            grade: Grade::from_score(score),
            metrics,
        }
    }

    pub fn num(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(MetricValue::as_f64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.metrics.get(name).and_then(MetricValue::as_bool)
    }
}

/// Weighted combination of all supplied engine results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    /// 0-100, always within the convex hull of the engine scores.
    pub score: f64,
    pub grade: Grade,
    pub engines: Vec<EngineResult>,
    /// Renormalized weights actually applied, by engine id.
    pub weights: BTreeMap<String, f64>,
}

// --- Gaps ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Where a gap came from: a scoring engine or the AI simulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GapSource {
    Engine(String),
    Simulation,
}

impl GapSource {
    pub fn as_str(&self) -> &str {
        match self {
            GapSource::Engine(id) => id,
            GapSource::Simulation => "simulation",
        }
    }
}

impl std::fmt::Display for GapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for GapSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GapSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == "simulation" {
            GapSource::Simulation
        } else {
            GapSource::Engine(s)
        })
    }
}

/// A specific, actionable deficiency surfaced to the end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    #[serde(rename = "type")]
    pub gap_type: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
    #[serde(rename = "engine_source")]
    pub source: GapSource,
    /// Illustrative snippet from the page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

// --- Simulation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Outcome of one recommendation-simulation call. Absent entirely (not a
/// zero-value placeholder) when no simulation ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub brand_cited: bool,
    pub citation_count: u32,
    /// Signals the model said it would need but could not find.
    pub missing_signals: Vec<String>,
    /// Text windows around each brand mention.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citation_contexts: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
}

// --- Report ---

/// Per-engine slice of the report serialization contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReport {
    pub score: f64,
    /// Renormalized weight applied in the composite.
    pub weight: f64,
    pub grade: Grade,
    pub details: BTreeMap<String, MetricValue>,
}

/// Executive summary derived from the scored report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub critical_gaps: u32,
    pub high_gaps: u32,
    pub medium_gaps: u32,
    pub low_gaps: u32,
    /// Engine ids scoring at or above the strength threshold.
    pub strengths: Vec<String>,
    /// Engine ids scoring below the weakness threshold.
    pub weaknesses: Vec<String>,
    pub top_recommendations: Vec<String>,
}

/// Terminal aggregate of one analysis run. Immutable; persisted by an
/// external collaborator after assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub url: Url,
    pub generated_at: DateTime<Utc>,
    pub composite_score: f64,
    pub grade: Grade,
    pub engine_scores: BTreeMap<String, EngineReport>,
    pub gaps: Vec<Gap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_results: Option<SimulationResult>,
    pub summary: Summary,
}
