//! Vector similarity utilities.

use stratus_core::store::{MetadataFilter, VectorMatch, VectorRecord};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank records by cosine similarity to a query vector.
///
/// Records failing the filter are skipped. Ties keep insertion order.
pub fn rank_records(
    records: &[VectorRecord],
    query: &[f32],
    limit: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<VectorMatch> {
    let mut scored: Vec<VectorMatch> = records
        .iter()
        .filter(|r| filter.is_none_or(|f| f.matches(&r.metadata)))
        .map(|r| VectorMatch {
            id: r.id.clone(),
            score: cosine_similarity(&r.vector, query),
            metadata: r.metadata.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

/// Render a vector as a pgvector text literal, e.g. `[0.1,0.2]`.
pub fn to_vector_literal(vector: &[f32]) -> String {
    format!(
        "[{}]",
        vector
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, vector: Vec<f32>, kind: &str) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            vector,
            metadata: json!({ "type": kind }),
        }
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_empty_and_mismatched() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        // 32 / (sqrt(14) * sqrt(77))
        let expected = 32.0 / (14.0f32.sqrt() * 77.0f32.sqrt());
        assert!((cosine_similarity(&a, &b) - expected).abs() < 1e-5);
    }

    #[test]
    fn rank_orders_best_first() {
        let records = vec![
            record("far", vec![0.0, 1.0], "pdf"),
            record("near", vec![1.0, 0.1], "pdf"),
            record("exact", vec![1.0, 0.0], "pdf"),
        ];
        let ranked = rank_records(&records, &[1.0, 0.0], 10, None);
        let ids: Vec<_> = ranked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn rank_respects_limit_and_filter() {
        let records = vec![
            record("a.jpg", vec![1.0, 0.0], "jpg"),
            record("doc", vec![1.0, 0.0], "pdf"),
            record("b.jpg", vec![0.5, 0.5], "jpg"),
        ];
        let filter = MetadataFilter::new().eq("type", "jpg");
        let ranked = rank_records(&records, &[1.0, 0.0], 1, Some(&filter));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "a.jpg");
    }

    #[test]
    fn rank_empty_collection() {
        assert!(rank_records(&[], &[1.0], 5, None).is_empty());
    }

    #[test]
    fn vector_literal_format() {
        assert_eq!(to_vector_literal(&[0.5, -1.0, 2.0]), "[0.5,-1,2]");
        assert_eq!(to_vector_literal(&[]), "[]");
    }
}
