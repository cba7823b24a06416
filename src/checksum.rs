use sha2::{Digest, Sha256};

// tag is the last 3 ASCII chars of the lowercase-hex SHA-256 digest, not the
// last 3 raw digest bytes. hex-encode first, then slice the ASCII string.

pub const CHECKSUM_LEN: usize = 3;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn lower_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let hex = lower_hex(&digest);
    let tail = &hex.as_bytes()[hex.len() - CHECKSUM_LEN..];
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(tail);
    out
}

pub const ZERO_CHECKSUM: [u8; CHECKSUM_LEN] = [0u8; CHECKSUM_LEN];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(checksum(b"HELLO"), checksum(b"HELLO"));
    }

    #[test]
    fn differs_for_different_payloads() {
        assert_ne!(checksum(b"HELLO"), checksum(b"WORLD"));
    }

    #[test]
    fn matches_known_sha256_tail() {
        // sha256("") = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
        // (64 lowercase hex chars) -> last 3 chars "855"
        assert_eq!(&checksum(b""), b"855");
    }
}
