use std::fmt;

use crate::error::{Error, Result};

pub const ADDR_LEN: usize = 8;

// low 8 bytes of a node's LoRa hardware EUI. all-zero is BROADCAST ("any"),
// must never appear as the source of an outgoing packet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; ADDR_LEN]);

impl Address {
    pub const BROADCAST: Address = Address([0u8; ADDR_LEN]);

    pub const fn from_bytes(bytes: [u8; ADDR_LEN]) -> Self {
        Address(bytes)
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn as_bytes(&self) -> &[u8; ADDR_LEN] {
        &self.0
    }

    // uppercase hex, used on the facade and as discovery registry keys
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(ADDR_LEN * 2);
        for b in self.0 {
            s.push_str(&format!("{b:02X}"));
        }
        s
    }

    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != ADDR_LEN * 2 || !text.is_ascii() {
            return Err(Error::InvalidAddressText(text.to_string()));
        }
        let mut out = [0u8; ADDR_LEN];
        for (i, chunk) in out.iter_mut().enumerate() {
            let byte_str = &text[i * 2..i * 2 + 2];
            *chunk = u8::from_str_radix(byte_str, 16)
                .map_err(|_| Error::InvalidAddressText(text.to_string()))?;
        }
        Ok(Address(out))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_is_all_zero() {
        assert!(Address::BROADCAST.is_broadcast());
        assert_eq!(Address::BROADCAST.as_bytes(), &[0u8; ADDR_LEN]);
    }

    #[test]
    fn hex_round_trip() {
        let addr = Address::from_bytes([0x02, 0xAB, 0x00, 0x11, 0xFF, 0x00, 0x00, 0x09]);
        let text = addr.to_hex();
        assert_eq!(text, "02AB0011FF000009");
        assert_eq!(Address::from_hex(&text).unwrap(), addr);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Address::from_hex("not-hex").is_err());
        assert!(Address::from_hex("02AB").is_err());
    }

    #[test]
    fn non_broadcast_not_broadcast() {
        let addr = Address::from_bytes([1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(!addr.is_broadcast());
    }
}
