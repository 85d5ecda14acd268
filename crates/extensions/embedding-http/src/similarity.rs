//! Vector similarity.

use hybridsearch_protocols::EmbeddingError;

/// Cosine similarity clamped to `[0, 1]`.
///
/// Zero-magnitude vectors score 0. Vectors of different length are an error.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let v = [0.3, 0.4, 0.5];
        assert!((similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal() {
        assert_eq!(similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_opposite_clamps_to_zero() {
        assert_eq!(similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { left: 2, right: 3 }));
    }
}
