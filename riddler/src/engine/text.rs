//! Answer normalization, content hashing and judging

use sha2::{Digest, Sha256};

/// Most words a free-form answer may have and still get substring credit
const MAX_TOLERANT_WORDS: usize = 5;

/// Trim and lowercase
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Hex SHA-256 over the normalized question followed by the normalized answer
pub fn content_hash(question: &str, answer: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(question).as_bytes());
    hasher.update(normalize(answer).as_bytes());
    hex::encode(hasher.finalize())
}

/// Decide whether a submission matches the stored answer.
///
/// Exact match after normalization always counts. Unless `strict`, a short
/// sentence containing the answer also counts ("a shadow" for "shadow").
pub fn judge(submitted: &str, correct: &str, strict: bool) -> bool {
    let submitted = normalize(submitted);
    let correct = normalize(correct);

    if submitted == correct {
        return true;
    }
    if strict || correct.is_empty() {
        return false;
    }

    submitted.contains(&correct) && submitted.split_whitespace().count() <= MAX_TOLERANT_WORDS
}

/// Exact-only judging, used for the daily challenge
pub fn judge_exact(submitted: &str, correct: &str) -> bool {
    normalize(submitted) == normalize(correct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_case_and_padding() {
        let a = content_hash("What has a neck but no head?", "Bottle");
        let b = content_hash("  what has a neck but no head?", "bottle ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash("What has a neck but no head?", "shirt"));
    }

    #[test]
    fn test_judge_tolerates_short_sentences() {
        assert!(judge("a shadow", "shadow", false));
        assert!(judge("  SHADOW ", "shadow", false));
        assert!(judge("it is a shadow maybe", "shadow", false));
        assert!(!judge("it is surely a shadow i would think", "shadow", false));
        assert!(!judge("light", "shadow", false));
    }

    #[test]
    fn test_judge_word_limit_boundary() {
        assert!(judge("i guess it's a shadow", "shadow", false));
        assert!(!judge("i guess that it's a shadow", "shadow", false));
    }

    #[test]
    fn test_strict_mode() {
        assert!(!judge("a shadow", "shadow", true));
        assert!(judge("Shadow", "shadow", true));
        assert!(!judge_exact("a shadow", "shadow"));
    }

    #[test]
    fn test_empty_answer_never_matches_by_substring() {
        assert!(!judge("anything", "", false));
    }
}
