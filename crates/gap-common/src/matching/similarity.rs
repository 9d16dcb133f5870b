use serde::Serialize;

use crate::keywords::KeywordSet;
use crate::ReferenceEntity;

/// Similarity of one reference entity to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityRecord {
    pub reference: ReferenceEntity,
    /// `0..=100`
    pub score: u8,
}

/// Case-insensitive category equality ignoring surrounding whitespace.
/// Absent or blank categories never match.
pub fn categories_match(candidate: Option<&str>, reference: Option<&str>) -> bool {
    match (candidate.map(str::trim), reference.map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            a.to_lowercase() == b.to_lowercase()
        }
        _ => false,
    }
}

/// Keyword overlap as a share of the candidate's keywords, plus a flat bonus
/// for matching categories, clamped and rounded to `0..=100`.
///
/// An empty candidate set scores 0, or exactly the bonus when categories match.
pub fn similarity(
    candidate_keywords: &KeywordSet,
    candidate_category: Option<&str>,
    reference_keywords: &KeywordSet,
    reference_category: Option<&str>,
    category_bonus: f64,
) -> u8 {
    let base = if candidate_keywords.is_empty() {
        0.0
    } else {
        let overlap = candidate_keywords.overlap(reference_keywords);
        overlap as f64 / candidate_keywords.len() as f64 * 100.0
    };

    let bonus = if categories_match(candidate_category, reference_category) {
        category_bonus
    } else {
        0.0
    };

    (base + bonus).clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::extract_keywords;
    use proptest::prelude::*;

    const BONUS: f64 = 30.0;

    #[test]
    fn identical_sets_with_equal_category_clamp_to_hundred() {
        let keywords = extract_keywords("cloud accounting software for traders");
        assert_eq!(
            similarity(&keywords, Some("Fintech"), &keywords, Some("fintech"), BONUS),
            100
        );
    }

    #[test]
    fn empty_candidate_scores_zero_or_exact_bonus() {
        let empty = KeywordSet::default();
        let reference = extract_keywords("accounting software");

        assert_eq!(similarity(&empty, Some("Fintech"), &reference, Some("Edtech"), BONUS), 0);
        assert_eq!(similarity(&empty, None, &reference, None, BONUS), 0);
        assert_eq!(similarity(&empty, Some("Fintech"), &reference, Some("FINTECH"), BONUS), 30);
    }

    #[test]
    fn partial_overlap_is_share_of_candidate_keywords() {
        let candidate = extract_keywords("accounting invoicing payroll");
        let reference = extract_keywords("accounting software");
        // 1 of 3 candidate keywords shared
        assert_eq!(similarity(&candidate, None, &reference, None, BONUS), 33);
        assert_eq!(similarity(&candidate, Some("SaaS"), &reference, Some("saas"), BONUS), 63);
    }

    #[test]
    fn missing_or_blank_categories_never_match() {
        assert!(!categories_match(None, Some("Fintech")));
        assert!(!categories_match(Some("Fintech"), None));
        assert!(!categories_match(Some(""), Some("")));
        assert!(categories_match(Some("EdTech"), Some("edtech")));
        assert!(!categories_match(Some("Ed Tech"), Some("edtech")));
        assert!(!categories_match(Some("  "), Some("  ")));
    }

    #[test]
    fn surrounding_whitespace_is_ignored_on_both_sides() {
        assert!(categories_match(Some("Fintech"), Some(" Fintech")));
        assert!(categories_match(Some(" fintech\t"), Some("FINTECH ")));
    }

    fn keyword_set(words: Vec<String>) -> KeywordSet {
        extract_keywords(&words.join(" "))
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            a in prop::collection::vec("[a-z]{3,8}", 0..12),
            b in prop::collection::vec("[a-z]{3,8}", 0..12),
            same_category in any::<bool>(),
        ) {
            let ref_cat = if same_category { "fintech" } else { "edtech" };
            let score = similarity(&keyword_set(a), Some("Fintech"), &keyword_set(b), Some(ref_cat), BONUS);
            prop_assert!(score <= 100);
        }

        #[test]
        fn more_overlap_never_lowers_score(
            candidate in prop::collection::vec("[a-z]{3,8}", 1..12),
            reference in prop::collection::vec("[a-z]{3,8}", 0..12),
            extra in 0usize..12,
        ) {
            let candidate_set = keyword_set(candidate.clone());
            let before_set = keyword_set(reference.clone());

            let mut grown = reference;
            grown.extend(candidate.into_iter().take(extra));
            let after_set = keyword_set(grown);

            let before = similarity(&candidate_set, Some("x"), &before_set, Some("x"), BONUS);
            let after = similarity(&candidate_set, Some("x"), &after_set, Some("x"), BONUS);
            prop_assert!(after >= before);
        }
    }
}
