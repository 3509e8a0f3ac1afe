//! Deterministic content-hashed embeddings.

/// Unit-length vector derived from blake3's extendable output over `text`.
/// Returns an empty vector when `dimensions` is 0.
pub fn hashed_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut reader = blake3::Hasher::new().update(text.as_bytes()).finalize_xof();
    let mut bytes = vec![0u8; dimensions * 2];
    reader.fill(&mut bytes);

    let mut vector: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| {
            let raw = u16::from_le_bytes([pair[0], pair[1]]);
            (raw as f32 / u16::MAX as f32) * 2.0 - 1.0
        })
        .collect();
    normalize(&mut vector);
    vector
}

/// L2-normalize in place. Zero vectors are left unchanged.
pub fn normalize(vector: &mut [f32]) {
    let n = norm(vector);
    if n > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= n;
        }
    }
}

pub fn norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Whether a vector can stand for an entity: right width, finite, non-zero.
pub fn is_usable(vector: &[f32], dimensions: usize) -> bool {
    vector.len() == dimensions
        && vector.iter().all(|v| v.is_finite())
        && norm(vector) > f32::EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic_and_unit_length() {
        let a = hashed_embedding("n01\u{1f}Tajfel", 64);
        let b = hashed_embedding("n01\u{1f}Tajfel", 64);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!((norm(&a) - 1.0).abs() < 1e-5);
        assert_ne!(a, hashed_embedding("n02\u{1f}Turner", 64));
    }

    #[test]
    fn zero_dimensions_are_unusable() {
        let v = hashed_embedding("x", 0);
        assert!(v.is_empty());
        assert!(!is_usable(&v, 0));
        assert!(!is_usable(&[0.0, 0.0], 2));
        assert!(!is_usable(&[f32::NAN, 1.0], 2));
    }
}
