/// Scored matching of natural-language targets ("rst sword") against
/// candidate names. Scores are 0-100; anything below `MATCH_THRESHOLD`
/// is treated as no match.
pub const MATCH_THRESHOLD: u32 = 25;

const SCORE_EXACT: u32 = 100;
const SCORE_SUBSTRING: u32 = 80;
const SCORE_WORD_PREFIX: u32 = 70;
const SCORE_WORD_SUBSTRING: u32 = 50;
const SCORE_WORD_SUBSEQUENCE: u32 = 30;

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|c| chars.any(|h| h == c))
}

fn word_score(token: &str, word: &str) -> u32 {
    if word.starts_with(token) {
        SCORE_WORD_PREFIX
    } else if word.contains(token) {
        SCORE_WORD_SUBSTRING
    } else if is_subsequence(token, word) {
        SCORE_WORD_SUBSEQUENCE
    } else {
        0
    }
}

/// Case-insensitive score of `query` against `candidate`. Exact wins
/// outright, then whole-string substring; otherwise each query token takes
/// its best per-word score and the result is the mean across tokens, zero
/// if any token fails to match at all.
pub fn score(query: &str, candidate: &str) -> u32 {
    let query = query.trim().to_lowercase();
    let candidate = candidate.to_lowercase();
    if query.is_empty() {
        return 0;
    }

    if query == candidate {
        return SCORE_EXACT;
    }
    if candidate.contains(&query) {
        return SCORE_SUBSTRING;
    }

    let words: Vec<&str> = candidate.split_whitespace().collect();
    let mut total = 0;
    let mut tokens = 0;
    for token in query.split_whitespace() {
        let best = words.iter().map(|word| word_score(token, word)).max().unwrap_or(0);
        if best == 0 {
            return 0;
        }
        total += best;
        tokens += 1;
    }
    if tokens == 0 {
        return 0;
    }
    total / tokens
}

#[derive(Clone, Copy, Debug)]
pub struct FuzzyMatch<T> {
    pub value: T,
    pub score: u32,
}

impl<T> FuzzyMatch<T> {
    /// Non-exact winners get their canonical name echoed back to the player.
    pub fn is_exact(&self) -> bool {
        self.score == SCORE_EXACT
    }
}

/// Highest score wins; ties break in favour of the earliest candidate.
pub fn best<T>(
    query: &str,
    candidates: impl IntoIterator<Item = (T, String)>,
) -> Option<FuzzyMatch<T>> {
    let mut winner: Option<FuzzyMatch<T>> = None;
    for (value, name) in candidates {
        let score = score(query, &name);
        if score >= MATCH_THRESHOLD && winner.as_ref().map_or(true, |best| score > best.score) {
            winner = Some(FuzzyMatch { value, score });
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_100() {
        assert_eq!(score("Rusty Sword", "Rusty Sword"), 100);
        assert_eq!(score("rusty sword", "Rusty Sword"), 100);
    }

    #[test]
    fn test_substring_scores_80() {
        assert_eq!(score("rusty", "Rusty Sword"), 80);
        assert_eq!(score("sword", "Rusty Sword"), 80);
    }

    #[test]
    fn test_word_prefix() {
        // "ru" prefixes "rusty", "sw" prefixes "sword": mean of 70 and 70.
        assert_eq!(score("ru sw", "Rusty Sword"), 70);
    }

    #[test]
    fn test_subsequence_tokens_clear_threshold() {
        let value = score("rst srd", "Rusty Sword");
        assert!(value > MATCH_THRESHOLD, "got {value}");
        assert_eq!(value, 30);
    }

    #[test]
    fn test_unmatched_token_zeroes_the_score() {
        assert_eq!(score("rusty xyz", "Rusty Sword"), 0);
        assert_eq!(score("xyz", "Rusty Sword"), 0);
    }

    #[test]
    fn test_best_breaks_ties_by_order() {
        let winner = best(
            "sw",
            [
                (1, "Short Sword".to_string()),
                (2, "Long Sword".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(winner.value, 1);
    }

    #[test]
    fn test_best_rejects_below_threshold() {
        assert!(best("xyz", [(1, "Rusty Sword".to_string())]).is_none());
    }
}
