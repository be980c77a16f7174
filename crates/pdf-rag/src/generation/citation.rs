//! Page citation extraction from answer text

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Ranges wider than this are treated as noise rather than expanded
const MAX_RANGE_SPAN: u32 = 50;

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // "Page 9", "pages 4 and 5", "Pages 2-4", "p. 7", "pp. 3, 6"
        Regex::new(
            r"(?i)\b(?:pages?|pp?\.)\s*(\d+(?:\s*(?:-|–|to|and|,|&)\s*\d+)*)",
        )
        .expect("Invalid regex")
    })
}

fn item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)(?:\s*(?:-|–|to)\s*(\d+))?").expect("Invalid regex")
    })
}

/// Extract cited page numbers from an answer, sorted and deduplicated
///
/// When `allowed_pages` is given, pages that were not part of the retrieved
/// context are dropped.
pub fn extract_page_citations(answer: &str, allowed_pages: Option<&[u32]>) -> Vec<u32> {
    let mut pages = BTreeSet::new();

    for mention in mention_pattern().captures_iter(answer) {
        let Some(list) = mention.get(1) else { continue };

        for item in item_pattern().captures_iter(list.as_str()) {
            let Some(start) = item.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            let end = item.get(2).and_then(|m| m.as_str().parse::<u32>().ok());

            match end {
                Some(end) if end >= start && end - start <= MAX_RANGE_SPAN => {
                    pages.extend(start..=end);
                }
                Some(end) => {
                    pages.insert(start);
                    pages.insert(end);
                }
                None => {
                    pages.insert(start);
                }
            }
        }
    }

    pages
        .into_iter()
        .filter(|p| *p > 0)
        .filter(|p| allowed_pages.map_or(true, |allowed| allowed.contains(p)))
        .collect()
}
