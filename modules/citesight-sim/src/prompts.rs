//! Prompt construction for the two simulation passes.

use crate::traits::SimulationRequest;

pub const RECOMMENDER_SYSTEM_PROMPT: &str =
    "You are a shopping assistant helping a customer choose products. Be specific with \
     brand names and product models.";

/// The recommendation pass: an open question in the product category,
/// optionally grounded in page content. The brand is only named when
/// context is supplied, mirroring how an assistant would otherwise rely
/// on prior knowledge alone.
pub fn recommendation_prompt(request: &SimulationRequest) -> String {
    match &request.page_context {
        None => format!(
            "You are helping a customer find the best {category} for {use_case}.\n\n\
             Recommend 3-5 specific products for this use case and explain why each one \
             fits. For every recommendation, cover:\n\
             - why it suits {use_case}\n\
             - the key attributes that matter\n\
             - any important considerations",
            category = request.category,
            use_case = request.use_case,
        ),
        Some(context) => format!(
            "You are helping a customer find the best {category} for {use_case}.\n\n\
             Here is information about {brand}:\n\n{context}\n\n\
             Based on this information and your knowledge, would you recommend \
             {brand}'s {category} for {use_case}? Why or why not? Also provide 2-3 \
             alternative recommendations with reasoning.",
            brand = request.brand,
            category = request.category,
            use_case = request.use_case,
            context = context,
        ),
    }
}

/// The attribute pass: what would the model need to know before it could
/// confidently recommend this brand? The answers become missing signals.
pub fn attribute_prompt(request: &SimulationRequest) -> String {
    format!(
        "What are the most important attributes and information you would need to know \
         about {brand}'s {category} in order to confidently recommend it to customers?\n\n\
         List, in priority order:\n\
         1. Essential product attributes (specifications, features)\n\
         2. Trust signals (reviews, certifications)\n\
         3. Purchase information (pricing, availability)",
        brand = request.brand,
        category = request.category,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(context: Option<&str>) -> SimulationRequest {
        SimulationRequest {
            brand: "Example Running Co".to_string(),
            category: "trail running shoes".to_string(),
            use_case: "ultramarathon training".to_string(),
            page_context: context.map(str::to_string),
        }
    }

    #[test]
    fn open_prompt_never_names_the_brand() {
        let prompt = recommendation_prompt(&request(None));
        assert!(prompt.contains("trail running shoes"));
        assert!(prompt.contains("ultramarathon training"));
        assert!(!prompt.contains("Example Running Co"));
    }

    #[test]
    fn context_prompt_carries_the_page_excerpt() {
        let prompt = recommendation_prompt(&request(Some("Lightweight shoe, 240g.")));
        assert!(prompt.contains("Example Running Co"));
        assert!(prompt.contains("Lightweight shoe, 240g."));
    }

    #[test]
    fn attribute_prompt_names_brand_and_category() {
        let prompt = attribute_prompt(&request(None));
        assert!(prompt.contains("Example Running Co"));
        assert!(prompt.contains("trail running shoes"));
    }
}
