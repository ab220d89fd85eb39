//! Adaptive retrieval-window sizing.

/// Length-bucket table for the retrieval window heuristic.
///
/// Short queries are assumed specific (narrow retrieval suffices); long
/// queries are assumed to need broader recall across sub-topics.
#[derive(Clone, Debug)]
pub struct TopKBuckets {
    /// Upper token bound (inclusive) of the short bucket.
    pub short_max: usize,
    /// Upper token bound (inclusive) of the medium bucket.
    pub medium_max: usize,
    /// Window size for short queries.
    pub short_k: u64,
    /// Window size for medium queries.
    pub medium_k: u64,
    /// Window size for everything longer.
    pub long_k: u64,
}

impl Default for TopKBuckets {
    fn default() -> Self {
        Self {
            short_max: 5,
            medium_max: 15,
            short_k: 5,
            medium_k: 50,
            long_k: 70,
        }
    }
}

/// Returns the retrieval window size for `query`.
///
/// Pure and deterministic: the result depends only on the query's
/// whitespace-token count and the bucket table.
pub fn estimate_top_k(query: &str, buckets: &TopKBuckets) -> u64 {
    let length = query.split_whitespace().count();
    if length <= buckets.short_max {
        buckets.short_k
    } else if length <= buckets.medium_max {
        buckets.medium_k
    } else {
        buckets.long_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_token_query_gets_narrow_window() {
        assert_eq!(estimate_top_k("a b c", &TopKBuckets::default()), 5);
    }

    #[test]
    fn ten_token_query_gets_medium_window() {
        let query = "one two three four five six seven eight nine ten";
        assert_eq!(estimate_top_k(query, &TopKBuckets::default()), 50);
    }

    #[test]
    fn twenty_five_token_query_gets_wide_window() {
        let query = (0..25).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        assert_eq!(estimate_top_k(&query, &TopKBuckets::default()), 70);
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        let b = TopKBuckets::default();
        let five = "a b c d e";
        let six = "a b c d e f";
        let fifteen = (0..15).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let sixteen = (0..16).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        assert_eq!(estimate_top_k(five, &b), 5);
        assert_eq!(estimate_top_k(six, &b), 50);
        assert_eq!(estimate_top_k(&fifteen, &b), 50);
        assert_eq!(estimate_top_k(&sixteen, &b), 70);
    }

    #[test]
    fn identical_input_is_deterministic() {
        let b = TopKBuckets::default();
        assert_eq!(estimate_top_k("how do I resize", &b), estimate_top_k("how do I resize", &b));
    }
}
