//! Relevance scoring and snippet extraction. Pure functions, no I/O.

/// Bonus when the first line contains the query.
const TITLE_BONUS: f64 = 10.0;
/// Added per non-overlapping occurrence.
const OCCURRENCE_WEIGHT: f64 = 2.0;
/// Proximity bonus at offset 0, decaying by 1 per 100 characters.
const PROXIMITY_MAX: f64 = 5.0;

const SNIPPET_LINES: usize = 3;
const SNIPPET_FALLBACK_CHARS: usize = 200;

/// Score `text` against an already-lowercased `query`.
///
/// ```text
/// 10  if the first line contains the query
/// + 2 per non-overlapping occurrence
/// + max(0, 5 - first_char_offset / 100)  when it occurs at all
/// ```
pub fn relevance(query: &str, text: &str) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    let text = text.to_lowercase();
    let mut score = 0.0;

    if text.lines().next().is_some_and(|first| first.contains(query)) {
        score += TITLE_BONUS;
    }

    score += OCCURRENCE_WEIGHT * text.matches(query).count() as f64;

    if let Some(byte_idx) = text.find(query) {
        let char_idx = text[..byte_idx].chars().count() as f64;
        score += (PROXIMITY_MAX - char_idx / 100.0).max(0.0);
    }

    score
}

/// Up to the first three lines containing `query`, joined by newlines;
/// the leading 200 characters when no single line matches.
pub fn snippet(query: &str, content: &str) -> String {
    let matching: Vec<&str> = content
        .split('\n')
        .filter(|line| line.to_lowercase().contains(query))
        .take(SNIPPET_LINES)
        .collect();
    if matching.is_empty() {
        content.chars().take(SNIPPET_FALLBACK_CHARS).collect()
    } else {
        matching.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_occurrence_at_offset_40() {
        let text = format!("Weekly notes\n{}marillion", "x".repeat(27));
        assert_eq!(text.find("marillion"), Some(40));
        assert!(approx(relevance("marillion", &text), 6.6));
    }

    #[test]
    fn title_match_adds_ten() {
        let with_title = relevance("tour", "tour dates\nsomething");
        let without = relevance("tour", "dates tour\nsomething");
        // both: one occurrence, offset 0 vs 6
        assert!(approx(with_title, 10.0 + 2.0 + 5.0));
        assert!(approx(without, 10.0 + 2.0 + 4.94));
        assert!(approx(relevance("tour", "dates\ntour"), 2.0 + 4.94));
    }

    #[test]
    fn each_extra_occurrence_adds_two() {
        let one = relevance("abc", "zz\nabc xxx xxx");
        let two = relevance("abc", "zz\nabc abc xxx");
        let three = relevance("abc", "zz\nabc abc abc");
        assert!(approx(two - one, 2.0));
        assert!(approx(three - two, 2.0));
    }

    #[test]
    fn occurrences_do_not_overlap() {
        assert!(approx(relevance("aa", "x\naaaa"), 2.0 * 2.0 + 5.0 - 0.02));
    }

    #[test]
    fn proximity_bonus_floors_at_zero() {
        let text = format!("head\n{}needle", " ".repeat(995));
        assert!(approx(relevance("needle", &text), 2.0));
    }

    #[test]
    fn no_occurrence_scores_zero() {
        assert_eq!(relevance("absent", "nothing here"), 0.0);
    }

    #[test]
    fn offset_counts_characters_not_bytes() {
        // Each 'é' is two bytes in UTF-8.
        let text = format!("t\n{}q1", "é".repeat(98));
        assert!(approx(relevance("q1", &text), 2.0 + 5.0 - 1.0));
    }

    #[test]
    fn case_is_ignored() {
        assert!(approx(relevance("rust", "RUST\nRust rust"), 10.0 + 6.0 + 5.0));
    }

    #[test]
    fn snippet_takes_first_three_matching_lines() {
        let content = "a rust\nb\nc Rust\nd rust\ne rust";
        assert_eq!(snippet("rust", content), "a rust\nc Rust\nd rust");
    }

    #[test]
    fn snippet_falls_back_to_leading_chars() {
        let content = format!("{}\nmore", "w".repeat(250));
        let s = snippet("zz", &content);
        assert_eq!(s.chars().count(), 200);
    }
}
