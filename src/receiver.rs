use std::time::{Duration, Instant};

use crate::address::Address;
use crate::checksum::checksum as compute_checksum;
use crate::discovery::Registry;
use crate::packet::{Kind, Packet};
use crate::radio::RadioSocket;

#[derive(Debug, Clone, Copy)]
pub struct ReceiveConfig {
    pub socket_timeout: Duration,
    // legacy behavior re-appends a duplicate fragment's payload when
    // re-acking a lost ACK, corrupting reassembly. false fixes the bug,
    // true reproduces it bit for bit.
    pub legacy_duplicate_append: bool,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        ReceiveConfig {
            socket_timeout: Duration::from_secs(5),
            legacy_duplicate_append: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecvOutcome {
    pub payload: Vec<u8>,
    pub sender: Address,
    pub elapsed: Duration,
}

// expected_sender may be Address::BROADCAST ("any sender"). malformed
// frames, timeouts and mis-addressed traffic are logged and the loop
// resumes; only returns on a successful terminal fragment.
pub fn recv_payload(
    radio: &mut dyn RadioSocket,
    expected_sender: Address,
    my_addr: Address,
    registry: &Registry,
    config: ReceiveConfig,
) -> RecvOutcome {
    let start = Instant::now();

    let mut sender = expected_sender;
    let mut sender_known = !expected_sender.is_broadcast();

    let mut next_acknum: u8 = 1;
    let mut rcvd_data: Vec<u8> = Vec::new();
    let mut last_check: Option<[u8; 3]> = None;

    radio.set_timeout(config.socket_timeout);

    loop {
        radio.set_blocking(true);
        let frame = match radio.recv(crate::packet::MAX_FRAME) {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("recv_payload: socket timeout or I/O error: {err}");
                continue;
            }
        };

        let packet = match Packet::parse(&frame) {
            Ok(packet) => packet,
            Err(err) => {
                log::debug!("recv_payload: discarding unparsable frame: {err}");
                continue;
            }
        };

        if packet.dest != my_addr && !packet.dest.is_broadcast() {
            log::trace!("recv_payload: discarding frame not addressed to us");
            continue;
        }

        // ack_required is demoted for this packet only on hello receipt,
        // never for the rest of the call.
        let mut ack_required_for_packet = packet.ack_required;
        if packet.hello {
            ack_required_for_packet = false;
            registry.register(packet.source.to_hex().as_bytes(), &packet.payload);
        }

        if !sender_known {
            sender = packet.source;
            sender_known = true;
        }

        if packet.source != sender {
            log::trace!("recv_payload: discarding frame from unexpected sender");
            continue;
        }

        let check = compute_checksum(&packet.payload);
        let checksum_ok = check == packet.checksum;

        if checksum_ok && packet.acknum == next_acknum {
            rcvd_data.extend_from_slice(&packet.payload);
            last_check = Some(check);

            if ack_required_for_packet {
                next_acknum = (packet.acknum + 1) % 2;
                send_ack(radio, my_addr, packet.source, packet.hello, packet.seqnum, next_acknum, packet.last_fragment);
                if packet.last_fragment {
                    break;
                }
            } else if packet.last_fragment {
                break;
            }
        } else if checksum_ok && Some(check) == last_check {
            // Our previous ACK was lost; the peer resent the last fragment.
            // Replay the ack we already sent for it rather than recomputing
            // one from the duplicate's acknum bit, which the sender (still
            // waiting on the first ack) would reject as stale.
            if config.legacy_duplicate_append {
                rcvd_data.extend_from_slice(&packet.payload);
            }

            if ack_required_for_packet {
                send_ack(radio, my_addr, packet.source, packet.hello, packet.seqnum, next_acknum, packet.last_fragment);
                if packet.last_fragment {
                    break;
                }
            } else if packet.last_fragment {
                break;
            }
        } else {
            log::debug!("recv_payload: discarding packet with bad checksum or unexpected seq");
        }
    }

    RecvOutcome {
        payload: rcvd_data,
        sender,
        elapsed: start.elapsed(),
    }
}

#[allow(clippy::too_many_arguments)]
fn send_ack(
    radio: &mut dyn RadioSocket,
    my_addr: Address,
    peer: Address,
    hello: bool,
    seqnum: u8,
    acknum: u8,
    last_fragment: bool,
) {
    let ack = Packet::build(
        my_addr,
        peer,
        hello,
        seqnum,
        true,
        acknum,
        Kind::Ack,
        last_fragment,
        Vec::new(),
    );
    radio.set_blocking(false);
    if let Err(err) = radio.send(&ack.encode()) {
        log::debug!("recv_payload: failed to send ACK: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::ChannelRadio;
    use crate::sender::{send_payload, SendConfig};
    use std::thread;

    fn addr(n: u8) -> Address {
        Address::from_bytes([0, 0, 0, 0, 0, 0, 0, n])
    }

    #[test]
    fn broadcast_locks_onto_first_sender() {
        let (mut a, mut b) = ChannelRadio::channel_pair([1; 8], [2; 8]);
        let registry = Registry::new();
        let handle = thread::spawn(move || {
            recv_payload(&mut b, Address::BROADCAST, addr(2), &registry, ReceiveConfig::default())
        });

        send_payload(
            &mut a,
            addr(1),
            Address::BROADCAST,
            b"HI",
            true,
            false,
            SendConfig::default(),
        );

        let outcome = handle.join().unwrap();
        assert_eq!(outcome.sender, addr(1));
        assert_eq!(outcome.payload, b"HI");
    }

    #[test]
    fn duplicate_fragment_is_re_acked_without_advancing_without_legacy_append() {
        let (mut a, mut b) = ChannelRadio::channel_pair([1; 8], [2; 8]);
        let registry = Registry::new();

        // Craft and send the same fragment twice directly, bypassing the
        // sender engine so we control the duplication precisely.
        let pkt = Packet::build(addr(1), addr(2), false, 0, true, 1, Kind::Data, true, b"X".to_vec());
        let frame = pkt.encode();

        let handle = thread::spawn(move || {
            recv_payload(&mut b, addr(1), addr(2), &registry, ReceiveConfig::default())
        });

        a.send(&frame).unwrap();
        a.send(&frame).unwrap();

        let outcome = handle.join().unwrap();
        // Fixed behavior: duplicate is not re-appended.
        assert_eq!(outcome.payload, b"X");
    }

    #[test]
    fn legacy_mode_reproduces_duplicate_append() {
        let (mut a, mut b) = ChannelRadio::channel_pair([1; 8], [2; 8]);
        let registry = Registry::new();

        let pkt = Packet::build(addr(1), addr(2), false, 0, true, 1, Kind::Data, true, b"X".to_vec());
        let frame = pkt.encode();

        let config = ReceiveConfig {
            legacy_duplicate_append: true,
            ..Default::default()
        };
        let handle = thread::spawn(move || recv_payload(&mut b, addr(1), addr(2), &registry, config));

        a.send(&frame).unwrap();
        a.send(&frame).unwrap();

        let outcome = handle.join().unwrap();
        assert_eq!(outcome.payload, b"XX");
    }

    #[test]
    fn hello_packet_registers_neighbor_and_needs_no_ack() {
        let (mut a, mut b) = ChannelRadio::channel_pair([1; 8], [2; 8]);
        let registry = Registry::new();
        let pkt = Packet::build(
            addr(1),
            Address::BROADCAST,
            true,
            0,
            false,
            1,
            Kind::Data,
            true,
            br#"{"02AB":""}"#.to_vec(),
        );
        a.send(&pkt.encode()).unwrap();

        let outcome = recv_payload(&mut b, Address::BROADCAST, addr(2), &registry, ReceiveConfig::default());
        assert_eq!(outcome.sender, addr(1));
        assert_eq!(registry.snapshot()[&addr(1).to_hex()], vec!["02AB".to_string()]);
    }
}
