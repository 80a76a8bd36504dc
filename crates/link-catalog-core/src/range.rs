//! Episode selector parsing ("1-3,5,7-9").

use std::collections::BTreeSet;

/// Valid inclusive `(start, end)` spans of a selector. Single numbers are
/// `(n, n)`; tokens that do not parse, zero, and reversed ranges are dropped.
fn spans(text: &str) -> impl Iterator<Item = (u32, u32)> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|token| match token.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_positive(start)?, parse_positive(end)?);
                (start <= end).then_some((start, end))
            }
            None => parse_positive(token).map(|value| (value, value)),
        })
}

/// Expands a comma separated selector of numbers and inclusive `a-b` ranges
/// into a strictly ascending list of distinct positive integers.
///
/// Tokens that do not parse, reversed ranges, and zero are dropped. An empty
/// result is not an error here.
pub fn expand_range(text: &str) -> Vec<u32> {
    let mut values = BTreeSet::new();
    for (start, end) in spans(text) {
        values.extend(start..=end);
    }
    values.into_iter().collect()
}

/// Upper bound on how many values `expand_range` would produce, computed
/// without expanding. Overlapping tokens are counted once per token.
pub fn selection_size(text: &str) -> u64 {
    spans(text).map(|(start, end)| u64::from(end - start) + 1).sum()
}

fn parse_positive(token: &str) -> Option<u32> {
    token.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_selector() {
        assert_eq!(expand_range("1-3,5,7-9"), vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn test_empty_and_reversed() {
        assert!(expand_range("").is_empty());
        assert!(expand_range("3-1").is_empty());
        assert!(expand_range(" , ,").is_empty());
    }

    #[test]
    fn test_overlaps_collapse_and_sort() {
        assert_eq!(expand_range("5, 1-3, 2-4 ,3"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bad_tokens_are_dropped() {
        assert_eq!(expand_range("1,abc,0,-2,4-x,6"), vec![1, 6]);
        assert_eq!(expand_range("2-3-4,7"), vec![7]);
    }

    #[test]
    fn test_whitespace_inside_range() {
        assert_eq!(expand_range(" 2 - 4 "), vec![2, 3, 4]);
    }

    #[test]
    fn test_wide_ranges_are_expanded() {
        let values = expand_range("1-1001");
        assert_eq!(values.len(), 1001);
        assert_eq!(values.last(), Some(&1001));
        assert_eq!(expand_range("1-5000,3").len(), 5000);
    }

    #[test]
    fn test_selection_size_counts_without_expanding() {
        assert_eq!(selection_size("1-3,5,7-9"), 7);
        assert_eq!(selection_size("x,0,3-1"), 0);
        assert_eq!(selection_size("1-4294967295"), 4_294_967_295);
    }

    #[test]
    fn test_output_strictly_increasing() {
        let values = expand_range("9,1-4,3,12-10,8-9,2");
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }
}
