// no real SX127x hardware reachable here, so both ends run in one process
// over an in-memory ChannelRadio pair standing in for the air

use std::thread;

use lora_ctp::address::Address;
use lora_ctp::endpoint::{Endpoint, ListenOutcome};
use lora_ctp::radio::ChannelRadio;

fn main() {
    env_logger::init();

    let (a_send, b_recv) = ChannelRadio::channel_pair([0xA0; 8], [0xB0; 8]);
    let (b_send, a_recv) = ChannelRadio::channel_pair([0xB0; 8], [0xA0; 8]);

    let mut node_a = Endpoint::new(Box::new(a_send), Box::new(a_recv));
    let mut node_b = Endpoint::new(Box::new(b_send), Box::new(b_recv));
    let b_addr = node_b.my_addr();

    let listener = thread::spawn(move || match node_b.listen(Address::BROADCAST) {
        ListenOutcome::Connected { sender } => println!("node-b: got CONNECT from {sender}"),
        ListenOutcome::UnexpectedData { sender, payload } => {
            println!("node-b: unexpected data from {sender}: {payload:?}")
        }
    });

    let outcome = node_a.connect(b_addr);
    println!(
        "node-a: connect -> receiver={} sent={} retrans={} failed={}",
        outcome.receiver, outcome.packets_sent, outcome.retransmissions, outcome.failed
    );

    listener.join().expect("node-b listener thread panicked");
}
