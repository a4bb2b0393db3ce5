//! Generation prompt construction
//!
//! Builds the completion request for one generation attempt: a random
//! template, the optional category, the output rules and an avoid-list.

use rand::seq::SliceRandom;
use rand::Rng;
use riddler_agent::CompletionRequest;

/// Known riddle categories
pub const CATEGORIES: &[&str] = &["logic", "wordplay", "math", "nature", "objects", "general"];

/// Overused answers the generator must never return
pub const BLOCKLIST: &[&str] = &[
    "clock", "shadow", "mirror", "time", "echo", "silence", "breath", "darkness", "light", "fire",
    "candle", "river", "cloud", "egg", "towel", "keyboard", "stamp", "bottle", "pencil", "coin",
];

/// Terms placed in the prompt's avoid line
pub const AVOID_IN_PROMPT: usize = 20;

const TEMPLATES: &[&str] = &[
    "Create a tricky riddle about everyday objects that people use.",
    "Make a clever wordplay riddle with a surprising answer.",
    "Generate a logic riddle that requires thinking outside the box.",
    "Create a nature-themed riddle with a creative twist.",
    "Make a riddle about something found in a house, but unusual.",
    "Generate a riddle with a one-word answer that's NOT commonly used.",
    "Create a riddle about abstract concepts like emotions or ideas.",
    "Make a math-based riddle with a clever logical answer.",
];

const TEMPERATURE: f32 = 1.8;
const MAX_TOKENS: u32 = 250;
const TOP_P: f32 = 0.95;

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

pub fn is_blocklisted(answer: &str) -> bool {
    BLOCKLIST.contains(&answer)
}

/// Recent answers first, then the blocklist, deduplicated, capped for the prompt
pub fn avoid_terms(recent_answers: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::with_capacity(AVOID_IN_PROMPT);
    let candidates = recent_answers
        .iter()
        .map(String::as_str)
        .chain(BLOCKLIST.iter().copied());

    for term in candidates {
        if terms.len() == AVOID_IN_PROMPT {
            break;
        }
        if !term.is_empty() && !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Prompt text for one attempt using the given template
pub fn render(template: &str, category: &str, avoid: &[String]) -> String {
    let category_line = if category == "general" {
        String::new()
    } else {
        format!(" Category: {}.", category)
    };

    format!(
        r#"{template}

Generate ONE unique riddle in JSON format:
{{"question": "creative riddle", "answer": "one word", "difficulty": "easy"}}

{category_line}

IMPORTANT RULES:
- Answer must be ONE WORD only (lowercase)
- Answer MUST NOT be any of these: {avoid}
- Question must be creative and UNIQUE
- Use uncommon words as answers
- Think of unusual objects, concepts, or things
- Avoid cliché riddles

Examples of GOOD answers: umbrella, bridge, library, compass, recipe, alphabet, photograph
Examples of BAD answers: clock, shadow, time, mirror, echo

Only output JSON, nothing else."#,
        avoid = avoid.join(", "),
    )
}

/// Completion request with a randomly chosen template
pub fn build_request<R: Rng + ?Sized>(
    rng: &mut R,
    category: &str,
    avoid: &[String],
) -> CompletionRequest {
    let template = TEMPLATES.choose(rng).copied().unwrap_or(TEMPLATES[0]);

    CompletionRequest::user(render(template, category, avoid))
        .with_max_tokens(MAX_TOKENS)
        .with_temperature(TEMPERATURE)
        .with_top_p(TOP_P)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avoid_terms_prefers_recent_answers() {
        let recent = vec!["bridge".to_string(), "clock".to_string()];
        let terms = avoid_terms(&recent);

        assert_eq!(terms.len(), AVOID_IN_PROMPT);
        assert_eq!(terms[0], "bridge");
        assert_eq!(terms[1], "clock");
        // "clock" from the blocklist is not repeated
        assert_eq!(terms.iter().filter(|t| *t == "clock").count(), 1);
    }

    #[test]
    fn test_render_category_line() {
        let avoid = vec!["compass".to_string()];
        let general = render(TEMPLATES[0], "general", &avoid);
        assert!(!general.contains("Category:"));

        let logic = render(TEMPLATES[0], "logic", &avoid);
        assert!(logic.contains(" Category: logic."));
        assert!(logic.contains("MUST NOT be any of these: compass"));
    }

    #[test]
    fn test_request_sampling() {
        let request = build_request(&mut rand::thread_rng(), "general", &[]);
        assert_eq!(request.max_tokens, Some(MAX_TOKENS));
        assert_eq!(request.temperature, Some(TEMPERATURE));
        assert_eq!(request.top_p, Some(TOP_P));
        assert!(TEMPLATES.iter().any(|t| request.user_text().starts_with(t)));
    }

    #[test]
    fn test_known_categories() {
        assert!(is_known_category("math"));
        assert!(!is_known_category("sports"));
        assert!(is_blocklisted("coin"));
    }
}
