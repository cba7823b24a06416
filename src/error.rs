#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("frame too short to contain a header: got {0} bytes, need {HEADER_LEN}")]
    ShortFrame(usize),

    #[error("frame exceeds maximum size: got {0} bytes, max {MAX_FRAME}")]
    OversizedFrame(usize),

    #[error("address text is not 16 hex characters: {0:?}")]
    InvalidAddressText(String),

    #[error("hello payload is neither `None` nor a JSON object: {0}")]
    DiscoveryParse(#[from] serde_json::Error),

    #[error("hello payload is not valid UTF-8")]
    InvalidDiscoveryPayload,
}

pub type Result<T> = std::result::Result<T, Error>;

use crate::packet::{HEADER_LEN, MAX_FRAME};
