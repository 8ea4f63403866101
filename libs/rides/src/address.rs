//! Fuzzy comparison of free-text pickup and drop descriptions
//!
//! Addresses are typed by hand ("MG Road, 560001", "near mg road metro")
//! so the comparison mixes several cheap signals: shared keywords, keywords
//! that contain one another, an optional six-digit postal code, and a
//! normalized whole-string comparison.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Flat bonus added when both texts carry the same postal code
pub const PINCODE_BONUS: f64 = 30.0;

/// Minimum score for a keyword-based match
pub const MATCH_SCORE_THRESHOLD: f64 = 20.0;

/// Score floor applied when one normalized text contains the other
pub const CONTAINMENT_SCORE_FLOOR: f64 = 80.0;

/// Both normalized texts must be longer than this for containment to count
const CONTAINMENT_MIN_LEN: usize = 10;

/// Result of comparing two addresses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMatch {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub score: f64,
    pub common_keywords: Vec<String>,
    pub pincode_match: bool,
}

impl AddressMatch {
    fn none() -> Self {
        Self {
            is_match: false,
            score: 0.0,
            common_keywords: Vec::new(),
            pincode_match: false,
        }
    }
}

/// Keywords and postal code pulled out of one address
#[derive(Debug, Clone, PartialEq)]
struct ExtractedAddress {
    keywords: Vec<String>,
    pincode: Option<String>,
}

fn pincode_regex() -> &'static Regex {
    static PINCODE_REGEX: OnceLock<Regex> = OnceLock::new();
    PINCODE_REGEX
        .get_or_init(|| Regex::new(r"\b[0-9]{6}\b").expect("Failed to compile pincode regex"))
}

fn extract(text: &str) -> ExtractedAddress {
    let regex = pincode_regex();
    let pincode = regex.find(text).map(|m| m.as_str().to_string());

    let stripped = regex.replace_all(text, " ").to_lowercase();

    let mut keywords: Vec<String> = Vec::new();
    for word in stripped.split(|c: char| c.is_whitespace() || c == ',' || c == '#') {
        if word.chars().count() > 2 && !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }

    ExtractedAddress { keywords, pincode }
}

/// Lowercased text with everything but letters and digits removed
fn normalize_full_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Count keywords of `from` that contain, or are contained in, some keyword of `to`
fn substring_overlap(from: &[String], to: &[String]) -> usize {
    from.iter()
        .filter(|a| to.iter().any(|b| a.contains(b.as_str()) || b.contains(a.as_str())))
        .count()
}

/// Compare two free-text addresses.
///
/// `check_pincode` enables the postal code bonus. Blank input on either side
/// never matches.
pub fn address_similarity(first: &str, second: &str, check_pincode: bool) -> AddressMatch {
    if first.trim().is_empty() || second.trim().is_empty() {
        return AddressMatch::none();
    }

    let a = extract(first);
    let b = extract(second);

    let pincode_match = check_pincode && a.pincode.is_some() && a.pincode == b.pincode;

    let common_keywords: Vec<String> = a
        .keywords
        .iter()
        .filter(|k| b.keywords.contains(k))
        .cloned()
        .collect();

    let substring_matches =
        substring_overlap(&a.keywords, &b.keywords).max(substring_overlap(&b.keywords, &a.keywords));
    let best_matches = common_keywords.len().max(substring_matches);

    let total_keywords = a.keywords.len().max(b.keywords.len());
    let mut score = if a.keywords.is_empty() || b.keywords.is_empty() {
        0.0
    } else {
        (best_matches as f64 / total_keywords as f64 * 100.0).clamp(0.0, 100.0)
    };

    if pincode_match {
        score = if a.keywords.is_empty() || b.keywords.is_empty() {
            100.0
        } else {
            (score + PINCODE_BONUS).min(100.0)
        };
    }

    let norm_a = normalize_full_text(first);
    let norm_b = normalize_full_text(second);

    let exact_text = norm_a == norm_b;

    let contained = !exact_text
        && norm_a.chars().count() > CONTAINMENT_MIN_LEN
        && norm_b.chars().count() > CONTAINMENT_MIN_LEN
        && (norm_a.contains(&norm_b) || norm_b.contains(&norm_a));

    if exact_text {
        score = 100.0;
    } else if contained {
        score = score.max(CONTAINMENT_SCORE_FLOOR);
    }

    let is_match = exact_text
        || contained
        || score >= MATCH_SCORE_THRESHOLD
        || best_matches >= 1
        || pincode_match;

    AddressMatch {
        is_match,
        score,
        common_keywords,
        pincode_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_pincode_and_keywords() {
        let extracted = extract("12, MG Road #4 Bangalore 560001");
        assert_eq!(extracted.pincode.as_deref(), Some("560001"));
        assert_eq!(extracted.keywords, vec!["road", "bangalore"]);
    }

    #[test]
    fn test_extract_keeps_first_pincode_only() {
        let extracted = extract("560001 to 560034");
        assert_eq!(extracted.pincode.as_deref(), Some("560001"));
        assert!(extracted.keywords.is_empty());
    }

    #[test]
    fn test_self_match() {
        for text in ["MG Road, 560001", "Koramangala", "x", "##"] {
            assert!(address_similarity(text, text, true).is_match, "{text}");
        }
    }

    #[test]
    fn test_blank_never_matches() {
        assert_eq!(address_similarity("", "MG Road", true), AddressMatch::none());
        assert_eq!(address_similarity("MG Road", "   ", true), AddressMatch::none());
    }

    #[test]
    fn test_normalized_exact_match_scores_full() {
        let result = address_similarity("MG Road, 560001", "mg road 560001", true);
        assert!(result.is_match);
        assert_eq!(result.score, 100.0);
        assert!(result.pincode_match);
    }

    #[test]
    fn test_pincode_bonus_requires_flag() {
        let with_flag = address_similarity("Indiranagar 560038", "HAL Stage 560038", true);
        let without_flag = address_similarity("Indiranagar 560038", "HAL Stage 560038", false);

        assert!(with_flag.pincode_match);
        assert!(with_flag.is_match);
        assert_eq!(with_flag.score, 30.0);

        assert!(!without_flag.pincode_match);
        assert!(!without_flag.is_match);
        assert_eq!(without_flag.score, 0.0);
    }

    #[test]
    fn test_pincode_only_texts() {
        let result = address_similarity("560038", "560038.", true);
        assert!(result.is_match);
        assert!(result.pincode_match);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_pincode_with_keywords_on_one_side_only() {
        let result = address_similarity("Koramangala 560034", "560034", true);
        assert!(result.is_match);
        assert!(result.pincode_match);
        assert_eq!(result.score, 100.0);

        let backward = address_similarity("560034", "Koramangala 560034", true);
        assert_eq!(backward.score, 100.0);
    }

    #[test]
    fn test_non_ascii_digits_are_not_pincodes() {
        // Devanagari digits
        let extracted = extract("Andheri \u{096B}\u{096C}\u{0966}\u{0966}\u{0966}\u{0967}");
        assert_eq!(extracted.pincode, None);

        let result = address_similarity(
            "Andheri \u{096B}\u{096C}\u{0966}\u{0966}\u{0966}\u{0967}",
            "Bandra \u{096B}\u{096C}\u{0966}\u{0966}\u{0966}\u{0967}",
            true,
        );
        assert!(!result.pincode_match);
    }

    #[test]
    fn test_punctuation_only_texts_normalize_equal() {
        let result = address_similarity("##", "--", true);
        assert!(result.is_match);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_keyword_overlap_score() {
        let result = address_similarity("Forum Mall Koramangala", "Koramangala Bus Depot", false);
        assert!(result.is_match);
        assert_eq!(result.common_keywords, vec!["koramangala"]);
        assert!((result.score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_substring_overlap_counts() {
        let result = address_similarity("Whitefield", "Whitefield Main Road", false);
        assert!(result.is_match);

        let partial = address_similarity("Indiranagar Metro", "Indira Nagar", false);
        // "indira" is contained in "indiranagar"
        assert!(partial.is_match);
        assert!(partial.common_keywords.is_empty());
    }

    #[test]
    fn test_containment_floor() {
        let result = address_similarity(
            "Electronic City Phase 1",
            "Infosys Gate, Electronic City Phase 1",
            false,
        );
        assert!(result.is_match);
        assert!(result.score >= CONTAINMENT_SCORE_FLOOR);
    }

    #[test]
    fn test_unrelated_addresses() {
        let result = address_similarity("Yelahanka New Town", "Jayanagar 4th Block", true);
        assert!(!result.is_match);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_symmetric_for_swapped_inputs() {
        let pairs = [
            ("Whitefield", "Whitefield Main Road"),
            ("Forum Mall Koramangala", "Koramangala Bus Depot"),
            ("Indiranagar 560038", "HAL Stage 560038"),
            ("Yelahanka New Town", "Jayanagar 4th Block"),
        ];

        for (a, b) in pairs {
            for flag in [true, false] {
                let forward = address_similarity(a, b, flag);
                let backward = address_similarity(b, a, flag);
                assert_eq!(forward.is_match, backward.is_match, "{a} / {b}");
                assert_eq!(forward.score, backward.score, "{a} / {b}");
                assert_eq!(forward.pincode_match, backward.pincode_match);
            }
        }
    }
}
