/*
offset  size  field
0       8     source short address
8       8     destination short address
16      1     flags
17      3     checksum
20      <=210 payload
*/

use crate::address::{Address, ADDR_LEN};
use crate::checksum::{checksum, CHECKSUM_LEN, ZERO_CHECKSUM};
use crate::error::{Error, Result};

pub const HEADER_LEN: usize = 2 * ADDR_LEN + 1 + CHECKSUM_LEN;
pub const MAX_PAYLOAD: usize = 210;
pub const MAX_FRAME: usize = HEADER_LEN + MAX_PAYLOAD;

const FLAG_SEQNUM: u8 = 1 << 0;
// bit 1 reserved, always zero, never inspected on parse.
const FLAG_ACKNUM: u8 = 1 << 2;
// bit 3 reserved, always zero, never inspected on parse.
const FLAG_LAST_FRAGMENT: u8 = 1 << 4;
const FLAG_HELLO: u8 = 1 << 5;
const FLAG_KIND_ACK: u8 = 1 << 6;
const FLAG_ACK_REQUIRED: u8 = 1 << 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Data,
    Ack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source: Address,
    pub dest: Address,
    pub hello: bool,
    pub seqnum: u8,
    pub ack_required: bool,
    pub acknum: u8,
    pub kind: Kind,
    pub last_fragment: bool,
    pub checksum: [u8; CHECKSUM_LEN],
    pub payload: Vec<u8>,
}

#[allow(clippy::too_many_arguments)]
impl Packet {
    pub fn build(
        source: Address,
        dest: Address,
        hello: bool,
        seqnum: u8,
        ack_required: bool,
        acknum: u8,
        kind: Kind,
        last_fragment: bool,
        payload: Vec<u8>,
    ) -> Self {
        let checksum = if !payload.is_empty() && kind == Kind::Data {
            checksum(&payload)
        } else {
            ZERO_CHECKSUM
        };

        Packet {
            source,
            dest,
            hello,
            seqnum: seqnum & 1,
            ack_required,
            acknum: acknum & 1,
            kind,
            last_fragment,
            checksum,
            payload,
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0u8;
        if self.seqnum == 1 {
            flags |= FLAG_SEQNUM;
        }
        if self.acknum == 1 {
            flags |= FLAG_ACKNUM;
        }
        if self.last_fragment {
            flags |= FLAG_LAST_FRAGMENT;
        }
        if self.hello {
            flags |= FLAG_HELLO;
        }
        if self.kind == Kind::Ack {
            flags |= FLAG_KIND_ACK;
        }
        if self.ack_required {
            flags |= FLAG_ACK_REQUIRED;
        }
        flags
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(self.source.as_bytes());
        out.extend_from_slice(self.dest.as_bytes());
        out.push(self.flags());
        out.extend_from_slice(&self.checksum);
        out.extend_from_slice(&self.payload);
        out
    }

    // parse failure is non-fatal at the call site: log and discard
    pub fn parse(frame: &[u8]) -> Result<Self> {
        if frame.len() < HEADER_LEN {
            return Err(Error::ShortFrame(frame.len()));
        }
        if frame.len() > MAX_FRAME {
            return Err(Error::OversizedFrame(frame.len()));
        }

        let mut source = [0u8; ADDR_LEN];
        source.copy_from_slice(&frame[0..8]);
        let mut dest = [0u8; ADDR_LEN];
        dest.copy_from_slice(&frame[8..16]);
        let flags = frame[16];
        let mut check = [0u8; CHECKSUM_LEN];
        check.copy_from_slice(&frame[17..20]);
        let payload = frame[HEADER_LEN..].to_vec();

        Ok(Packet {
            source: Address::from_bytes(source),
            dest: Address::from_bytes(dest),
            hello: (flags & FLAG_HELLO) != 0,
            seqnum: (flags & FLAG_SEQNUM != 0) as u8,
            ack_required: (flags & FLAG_ACK_REQUIRED) != 0,
            acknum: ((flags & FLAG_ACKNUM) != 0) as u8,
            kind: if (flags & FLAG_KIND_ACK) != 0 {
                Kind::Ack
            } else {
                Kind::Data
            },
            last_fragment: (flags & FLAG_LAST_FRAGMENT) != 0,
            checksum: check,
            payload,
        })
    }
}
