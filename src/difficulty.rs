use crate::error::{GraderError, Result};
use crate::hash::PowHasher;

/// Leading eight bytes, big-endian, of `hash(content_hash ‖ nonce)`.
pub fn compute_difficulty(hasher: &dyn PowHasher, content_hash: &[u8], nonce: &[u8]) -> u64 {
    let mut input = Vec::with_capacity(content_hash.len() + nonce.len());
    input.extend_from_slice(content_hash);
    input.extend_from_slice(nonce);

    let digest = hasher.hash(&input);
    let mut leading = [0u8; 8];
    let n = digest.len().min(8);
    leading[..n].copy_from_slice(&digest[..n]);
    u64::from_be_bytes(leading)
}

/// Reject a record whose self-reported difficulty is not the recomputed one.
pub fn verify_difficulty(
    hasher: &dyn PowHasher,
    content_hash: &[u8],
    nonce: &[u8],
    reported: u64,
) -> Result<()> {
    let actual = compute_difficulty(hasher, content_hash, nonce);
    if actual != reported {
        return Err(GraderError::validate(format!(
            "self reported difficulty {:#018x} does not match computed {:#018x}",
            reported, actual
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the input reversed, padded to 32 bytes.
    #[derive(Debug)]
    struct Mirror;

    impl PowHasher for Mirror {
        fn hash(&self, input: &[u8]) -> Vec<u8> {
            let mut out: Vec<u8> = input.iter().rev().copied().collect();
            out.resize(32, 0);
            out
        }
    }

    #[test]
    fn test_difficulty_reads_leading_bytes_big_endian() {
        let content_hash = [0u8; 32];
        let nonce = [1, 2, 3, 4, 5, 6, 7, 8];
        // Reversed input starts with the reversed nonce.
        assert_eq!(
            compute_difficulty(&Mirror, &content_hash, &nonce),
            0x0807_0605_0403_0201
        );
    }

    #[test]
    fn test_verify_accepts_exact_match_only() {
        let content_hash = [9u8; 32];
        let nonce = [0xaa; 8];
        let difficulty = compute_difficulty(&Mirror, &content_hash, &nonce);

        verify_difficulty(&Mirror, &content_hash, &nonce, difficulty).unwrap();
        let err = verify_difficulty(&Mirror, &content_hash, &nonce, difficulty + 1).unwrap_err();
        assert!(matches!(err, GraderError::Validate(_)));
    }

    #[test]
    fn test_with_lookup_table_hasher() {
        let hasher = crate::testutil::hasher();
        let content_hash = [3u8; 32];
        let a = compute_difficulty(hasher.as_ref(), &content_hash, &[0; 8]);
        let b = compute_difficulty(hasher.as_ref(), &content_hash, &[1; 8]);
        assert_ne!(a, b);
        verify_difficulty(hasher.as_ref(), &content_hash, &[1; 8], b).unwrap();
    }

    #[test]
    fn test_known_difficulty() {
        let hasher = crate::testutil::hasher();
        assert_eq!(
            compute_difficulty(hasher.as_ref(), &[0; 32], &[1; 8]),
            0xa0a4_87b3_6723_05b3
        );
    }
}
