// CTP endpoint only: framing, fragmentation, send/receive state machines,
// RTT estimation, neighbor discovery, on-wire packet format. The HTTP
// server, Wi-Fi AP, BLE services, LED indicator, message log and process
// supervision are external collaborators this crate does not implement.

pub mod address;
pub mod checksum;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod packet;
pub mod radio;
pub mod receiver;
pub mod rtt;
pub mod sender;

pub use address::Address;
pub use endpoint::{Endpoint, ListenOutcome};
pub use error::{Error, Result};
pub use receiver::{ReceiveConfig, RecvOutcome};
pub use sender::{SendConfig, SendOutcome};
