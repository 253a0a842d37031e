//! Analysis of provider responses: was the brand cited, where, in what
//! tone, and what attributes did the model enumerate?

use regex::Regex;
use std::sync::LazyLock;

use citesight_common::Sentiment;

/// Window of text kept around each brand mention.
const CONTEXT_WINDOW: usize = 100;

/// Attributes shorter than this are list noise, not signals.
const MIN_ATTRIBUTE_LEN: usize = 10;

/// Attribute-pass responses rarely rank more than this many items usefully.
const MAX_ATTRIBUTES: usize = 10;

static NUMBERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s*([^\n:]+)").unwrap());
static BULLET_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-•*]\s*([^\n:]+)").unwrap());
static BOLD_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

const POSITIVE_WORDS: &[&str] =
    &["recommend", "excellent", "great", "best", "reliable", "top choice", "strong"];
const NEGATIVE_WORDS: &[&str] =
    &["avoid", "poor", "lacks", "would not", "wouldn't", "concern", "unreliable", "weak"];

#[derive(Debug, Clone)]
pub struct CitationAnalysis {
    pub cited: bool,
    pub count: u32,
    pub contexts: Vec<String>,
    pub sentiment: Sentiment,
}

/// Case-insensitive, non-overlapping scan of the response for the brand.
pub fn analyze(response: &str, brand: &str) -> CitationAnalysis {
    let pattern = match Regex::new(&format!("(?i){}", regex::escape(brand))) {
        Ok(re) => re,
        // An unescapable brand cannot be cited.
        Err(_) => {
            return CitationAnalysis {
                cited: false,
                count: 0,
                contexts: vec![],
                sentiment: Sentiment::Neutral,
            }
        }
    };

    let mut contexts = Vec::new();
    for found in pattern.find_iter(response) {
        contexts.push(context_window(response, found.start(), found.end()));
    }

    let count = contexts.len() as u32;
    let sentiment = if contexts.is_empty() {
        Sentiment::Neutral
    } else {
        score_sentiment(&contexts)
    };

    CitationAnalysis { cited: count > 0, count, contexts, sentiment }
}

/// Char-boundary-safe window of text around one match.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let mut lo = start.saturating_sub(CONTEXT_WINDOW);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_WINDOW).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    text[lo..hi].trim().to_string()
}

fn score_sentiment(contexts: &[String]) -> Sentiment {
    let mut positive = 0usize;
    let mut negative = 0usize;
    for context in contexts {
        let lower = context.to_lowercase();
        positive += POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        negative += NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    }
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Pull listed attributes out of a free-text attribute-pass response:
/// numbered items, bullets, and bold runs, deduplicated in order.
pub fn extract_attributes(response: &str) -> Vec<String> {
    let mut attributes: Vec<String> = Vec::new();

    for re in [&NUMBERED_ITEM_RE, &BULLET_ITEM_RE, &BOLD_ITEM_RE] {
        for capture in re.captures_iter(response) {
            let item = capture[1].trim().trim_end_matches(['.', ',']).to_string();
            if item.len() > MIN_ATTRIBUTE_LEN
                && !attributes.iter().any(|a| a.eq_ignore_ascii_case(&item))
            {
                attributes.push(item);
            }
        }
    }

    attributes.truncate(MAX_ATTRIBUTES);
    attributes
}
