use std::thread;

use lora_ctp::address::Address;
use lora_ctp::endpoint::Endpoint;
use lora_ctp::radio::ChannelRadio;

fn main() {
    env_logger::init();

    let (a_send, b_recv) = ChannelRadio::channel_pair([0xA0; 8], [0xB0; 8]);
    let (b_send, a_recv) = ChannelRadio::channel_pair([0xB0; 8], [0xA0; 8]);

    let mut node_a = Endpoint::new(Box::new(a_send), Box::new(a_recv));
    let mut node_b = Endpoint::new(Box::new(b_send), Box::new(b_recv));

    let listener = thread::spawn(move || {
        let outcome = node_b.recv(Address::BROADCAST);
        println!(
            "node-b: received hello from {} ({} bytes)",
            outcome.sender,
            outcome.payload.len()
        );
        println!("node-b: discovered nodes: {:?}", node_b.discovered_nodes());
    });

    let outcome = node_a.hello(Address::BROADCAST);
    println!(
        "node-a: hello -> sent={} failed={}",
        outcome.packets_sent, outcome.failed
    );

    listener.join().expect("node-b listener thread panicked");
}
