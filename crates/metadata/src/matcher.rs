//! Title comparison strategies used when picking a search result.

use crate::TitleVariants;

/// Decides whether a candidate's titles match the searched title.
pub trait TitleMatcher: Send + Sync {
    fn matches(&self, query: &str, candidate: &TitleVariants) -> bool;
}

/// Case-insensitive equality after collapsing whitespace, against the
/// canonical title or any alternate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTitleMatch;

impl TitleMatcher for ExactTitleMatch {
    fn matches(&self, query: &str, candidate: &TitleVariants) -> bool {
        let wanted = normalize_title_for_match(query);
        if wanted.is_empty() {
            return false;
        }
        candidate
            .iter()
            .any(|title| normalize_title_for_match(title) == wanted)
    }
}

/// Lowercase and collapse runs of whitespace to a single space.
pub fn normalize_title_for_match(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_case_and_spacing() {
        let titles = TitleVariants::new("Cowboy  Bebop");
        assert!(ExactTitleMatch.matches("cowboy bebop", &titles));
        assert!(ExactTitleMatch.matches("  COWBOY\tBEBOP ", &titles));
    }

    #[test]
    fn matches_alternate_titles() {
        let titles = TitleVariants::new("Shingeki no Kyojin")
            .with_alternates(["Attack on Titan", "進撃の巨人"]);
        assert!(ExactTitleMatch.matches("Attack on Titan", &titles));
        assert!(ExactTitleMatch.matches("進撃の巨人", &titles));
    }

    #[test]
    fn partial_titles_do_not_match() {
        let titles = TitleVariants::new("Attack on Titan Season 2");
        assert!(!ExactTitleMatch.matches("Attack on Titan", &titles));
        assert!(!ExactTitleMatch.matches("", &titles));
    }
}
