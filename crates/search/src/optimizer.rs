use netinsight_vector_store::{RankedResult, SearchResult};

/// Added to the denominator so a batch of equal distances scales to 0.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Min-max scales raw distances of one query's hits into `[0, 1]` and ranks them.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptimizer {
    epsilon: f64,
}

impl QueryOptimizer {
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Annotate every hit with `normalized_distance` and sort ascending.
    ///
    /// The sort is stable, so hits with equal scaled distance keep their
    /// incoming order (the index already breaks distance ties by row id).
    /// Non-finite distances are left out of the min/max and rank last at 1.0.
    #[must_use]
    pub fn optimize(&self, results: Vec<SearchResult>) -> Vec<RankedResult> {
        if results.is_empty() {
            return Vec::new();
        }

        let bounds = results
            .iter()
            .map(|r| f64::from(r.distance))
            .filter(|d| d.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, d| match acc {
                None => Some((d, d)),
                Some((min, max)) => Some((min.min(d), max.max(d))),
            });

        let mut ranked: Vec<RankedResult> = results
            .into_iter()
            .map(|r| {
                let normalized_distance = match bounds {
                    Some((min, max)) if r.distance.is_finite() => {
                        let scaled = (f64::from(r.distance) - min) / (max - min + self.epsilon);
                        scaled.clamp(0.0, 1.0) as f32
                    }
                    _ => 1.0,
                };
                RankedResult {
                    row_id: r.row_id,
                    document: r.document,
                    distance: r.distance,
                    normalized_distance,
                }
            })
            .collect();

        ranked.sort_by(|a, b| a.normalized_distance.total_cmp(&b.normalized_distance));

        log::debug!(
            "Optimized {} results (min={:?}, max={:?})",
            ranked.len(),
            bounds.map(|b| b.0),
            bounds.map(|b| b.1)
        );
        ranked
    }
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}
