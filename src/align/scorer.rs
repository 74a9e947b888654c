use std::collections::BTreeSet;

/// Scale applied to token-based ratios so an exact character match always wins
const TOKEN_SCALE: f64 = 0.95;

/// Length ratio at which partial (sliding window) matching takes over
const PARTIAL_THRESHOLD: f64 = 1.5;

/// Length ratio above which partial matches are heavily discounted
const LONG_PARTIAL_THRESHOLD: f64 = 8.0;

/// Similarity scorer used to pick the best script window for a segment
pub trait Scorer: Send + Sync {
    /// Similarity between `query` and `candidate` on a 0-100 scale
    fn score(&self, query: &str, candidate: &str) -> f64;

    /// Return the index and score of the best candidate.
    ///
    /// Candidates are consumed as a stream; the first candidate reaching the
    /// highest score wins, so generation order decides ties.
    fn best_match<I, S>(&self, query: &str, candidates: I) -> Option<(usize, f64)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in candidates.into_iter().enumerate() {
            let score = self.score(query, candidate.as_ref());
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }

        best
    }
}

/// Weighted edit-distance ratio combining plain, partial and token-based
/// comparisons, in the spirit of fuzzywuzzy's `WRatio`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl Scorer for WeightedRatio {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a = preprocess(query);
        let b = preprocess(candidate);

        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let base = ratio(&a, &b);

        let len_a = a.chars().count() as f64;
        let len_b = b.chars().count() as f64;
        let len_ratio = len_a.max(len_b) / len_a.min(len_b);

        if len_ratio < PARTIAL_THRESHOLD {
            return base
                .max(token_sort_ratio(&a, &b, ratio) * TOKEN_SCALE)
                .max(token_set_ratio(&a, &b, ratio) * TOKEN_SCALE);
        }

        let partial_scale = if len_ratio < LONG_PARTIAL_THRESHOLD { 0.9 } else { 0.6 };

        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(token_sort_ratio(&a, &b, partial_ratio) * TOKEN_SCALE * partial_scale)
            .max(token_set_ratio(&a, &b, partial_ratio) * TOKEN_SCALE * partial_scale)
    }
}

/// Lowercase, replace non-alphanumerics with spaces and collapse whitespace
pub fn preprocess(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized Levenshtein similarity on a 0-100 scale
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best ratio of the shorter string against every equally long window of the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let window = shorter.chars().count();
    let longer: Vec<char> = longer.chars().collect();

    longer
        .windows(window)
        .map(|slice| ratio(shorter, &slice.iter().collect::<String>()))
        .fold(0.0, f64::max)
}

fn token_sort_ratio(a: &str, b: &str, compare: fn(&str, &str) -> f64) -> f64 {
    compare(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_ratio(a: &str, b: &str, compare: fn(&str, &str) -> f64) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: BTreeSet<&str>| set.into_iter().collect::<Vec<_>>().join(" ");

    let intersection = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    let mut best = compare(&combined_a, &combined_b);
    if !intersection.is_empty() {
        best = best
            .max(compare(&intersection, &combined_a))
            .max(compare(&intersection, &combined_b));
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
