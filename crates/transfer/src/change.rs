//! Content-hash change detection.

use ethfs_protocol::B256;
use sha3::{Digest, Keccak256};

/// Keccak-256 of a calldata chunk, as stored by `getChunkHash`.
pub fn chunk_hash(data: &[u8]) -> B256 {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    B256(out)
}

/// Returns `true` when `data` already matches the hash stored on-chain.
pub fn should_skip(data: &[u8], remote_hash: &B256) -> bool {
    chunk_hash(data) == *remote_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            chunk_hash(b"").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn matching_hash_is_skipped() {
        let data = b"<html>hello</html>";
        let remote = chunk_hash(data);
        assert!(should_skip(data, &remote));
    }

    #[test]
    fn changed_or_missing_chunk_is_written() {
        let remote = chunk_hash(b"old contents");
        assert!(!should_skip(b"new contents", &remote));
        assert!(!should_skip(b"new contents", &B256::ZERO));
    }
}
