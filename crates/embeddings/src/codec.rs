//! Binary layout for stored vectors: little-endian `f32` components, 4 bytes each.

const COMPONENT_WIDTH: usize = 4;

pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decode a blob produced by [`vector_to_bytes`].
///
/// A trailing partial component (blob length not a multiple of 4) is dropped.
/// Callers are expected to pass well-formed blobs.
pub fn bytes_to_vector(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(COMPONENT_WIDTH)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Number of whole components a blob of `len` bytes decodes to.
pub fn decoded_len(len: usize) -> usize {
    len / COMPONENT_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_preserves_components() {
        let v = vec![0.0, -1.5, 3.25, f32::MIN_POSITIVE, f32::MAX, -0.0, 1e-30];
        let decoded = bytes_to_vector(&vector_to_bytes(&v));
        assert_eq!(decoded.len(), v.len());
        for (a, b) in v.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_encoding_is_little_endian() {
        assert_eq!(vector_to_bytes(&[1.0]), vec![0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn test_empty_vector() {
        assert!(vector_to_bytes(&[]).is_empty());
        assert!(bytes_to_vector(&[]).is_empty());
    }

    #[test]
    fn test_trailing_partial_component_is_dropped() {
        let mut bytes = vector_to_bytes(&[1.0, 2.0]);
        bytes.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        assert_eq!(bytes_to_vector(&bytes), vec![1.0, 2.0]);
        assert_eq!(decoded_len(bytes.len()), 2);
    }
}
