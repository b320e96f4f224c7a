//! Tag extraction
//!
//! Tags are the deduplicated union of hashtags and wiki-link targets. Case is
//! preserved exactly as written: `#Rust` and `#rust` are distinct tags.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^\s#\[\]]+)").expect("hashtag regex"));

static WIKILINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").expect("wikilink regex"));

/// Extract hashtags and wiki-link targets from one block of text
pub fn extract_tags(content: &str) -> BTreeSet<String> {
    let hashtags = HASHTAG_REGEX
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string());

    let links = WIKILINK_REGEX
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|target| !target.is_empty())
        .map(str::to_string);

    hashtags.chain(links).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(content: &str) -> Vec<String> {
        extract_tags(content).into_iter().collect()
    }

    #[test]
    fn test_hashtags_and_links() {
        assert_eq!(tags("foo #bar [[baz]]"), vec!["bar", "baz"]);
    }

    #[test]
    fn test_deduplicates_across_sources() {
        assert_eq!(tags("#rust and [[rust]] and #rust"), vec!["rust"]);
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(tags("#Rust #rust"), vec!["Rust", "rust"]);
    }

    #[test]
    fn test_hashtag_stops_at_brackets_and_hashes() {
        assert_eq!(tags("#a#b #c]"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wikilink_is_non_greedy_and_trimmed() {
        assert_eq!(
            tags("[[ Graph Theory ]] then [[Trees]]"),
            vec!["Graph Theory", "Trees"]
        );
    }

    #[test]
    fn test_empty_link_and_bare_hash_ignored() {
        assert!(tags("[[]] and # alone").is_empty());
    }
}
