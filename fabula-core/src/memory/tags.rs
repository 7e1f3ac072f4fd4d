//! Keyword-based tag extraction
//!
//! A fixed table of case-insensitive word patterns mapped to topic tags.
//! Lexical only; semantic classification is out of scope.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\b(fight|battle|combat|attack)\b", "combat"),
        (r"(?i)\b(love|romance|kiss|hug|affection)\b", "romance"),
        (r"(?i)\b(death|die|dead|kill|murder)\b", "death"),
        (r"(?i)\b(magic|spell|power|ability)\b", "magic"),
        (r"(?i)\b(travel|journey|move|go)\b", "travel"),
        (r"(?i)\b(secret|hidden|mystery)\b", "mystery"),
        (r"(?i)\b(fear|scared|afraid|terror)\b", "fear"),
        (r"(?i)\b(happy|joy|laugh|smile)\b", "joy"),
        (r"(?i)\b(sad|cry|tears|sorrow)\b", "sadness"),
        (r"(?i)\b(angry|rage|fury|mad)\b", "anger"),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).expect("static tag pattern"), tag))
    .collect()
});

/// Tags whose keyword pattern matches the content, in table order
pub fn extract_tags(content: &str) -> Vec<String> {
    TAG_RULES
        .iter()
        .filter(|(pattern, _)| pattern.is_match(content))
        .map(|(_, tag)| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_matching_tags() {
        let tags = extract_tags("The battle ended in death and sorrow");
        assert_eq!(tags, vec!["combat", "death", "sadness"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extract_tags("A SECRET passage"), vec!["mystery"]);
    }

    #[test]
    fn test_whole_word_only() {
        // "going" must not match the travel pattern's "go"
        assert!(extract_tags("ongoing negotiations").is_empty());
    }

    #[test]
    fn test_no_matches() {
        assert!(extract_tags("They shared a quiet meal").is_empty());
    }
}
