use std::collections::HashMap;
use std::sync::Arc;

use crate::address::Address;
use crate::discovery::{encode_hello_payload, Registry};
use crate::radio::RadioSocket;
use crate::receiver::{recv_payload, ReceiveConfig, RecvOutcome};
use crate::sender::{send_payload, SendConfig, SendOutcome};

const CONNECT_PAYLOAD: &[u8] = b"CONNECT";

// original source used a -1 sentinel here; typed outcome instead
#[derive(Debug, Clone)]
pub enum ListenOutcome {
    Connected { sender: Address },
    UnexpectedData { sender: Address, payload: Vec<u8> },
}

pub struct Endpoint {
    send_radio: Box<dyn RadioSocket>,
    recv_radio: Box<dyn RadioSocket>,
    lora_mac: String,
    my_addr: Address,
    registry: Arc<Registry>,
    send_config: SendConfig,
    receive_config: ReceiveConfig,
}

impl Endpoint {
    // derives both textual address forms from the send socket's hardware EUI
    pub fn new(send_radio: Box<dyn RadioSocket>, recv_radio: Box<dyn RadioSocket>) -> Self {
        let eui = send_radio.hardware_eui();
        let lora_mac = eui.iter().map(|b| format!("{b:02X}")).collect::<String>();
        let my_addr = Address::from_bytes(eui);

        Endpoint {
            send_radio,
            recv_radio,
            lora_mac,
            my_addr,
            registry: Arc::new(Registry::new()),
            send_config: SendConfig::default(),
            receive_config: ReceiveConfig::default(),
        }
    }

    pub fn with_configs(mut self, send_config: SendConfig, receive_config: ReceiveConfig) -> Self {
        self.send_config = send_config;
        self.receive_config = receive_config;
        self
    }

    pub fn connect(&mut self, dest: Address) -> SendOutcome {
        log::info!("loractp: connecting to {dest}");
        send_payload(
            self.send_radio.as_mut(),
            self.my_addr,
            dest,
            CONNECT_PAYLOAD,
            true,
            false,
            self.send_config,
        )
    }

    pub fn hello(&mut self, dest: Address) -> SendOutcome {
        let neighbors = self.registry.list();
        let payload = encode_hello_payload(&neighbors);
        send_payload(
            self.send_radio.as_mut(),
            self.my_addr,
            dest,
            &payload,
            false,
            true,
            self.send_config,
        )
    }

    pub fn listen(&mut self, sender: Address) -> ListenOutcome {
        log::info!("loractp: listening for {sender}");
        let outcome = self.recv(sender);
        if outcome.payload == CONNECT_PAYLOAD {
            ListenOutcome::Connected {
                sender: outcome.sender,
            }
        } else {
            ListenOutcome::UnexpectedData {
                sender: outcome.sender,
                payload: outcome.payload,
            }
        }
    }

    pub fn send(&mut self, dest: Address, payload: &[u8], ack_required: bool) -> SendOutcome {
        send_payload(
            self.send_radio.as_mut(),
            self.my_addr,
            dest,
            payload,
            ack_required,
            false,
            self.send_config,
        )
    }

    pub fn recv(&mut self, sender: Address) -> RecvOutcome {
        recv_payload(
            self.recv_radio.as_mut(),
            sender,
            self.my_addr,
            &self.registry,
            self.receive_config,
        )
    }

    pub fn get_lora_mac(&self) -> &str {
        &self.lora_mac
    }

    pub fn get_my_addr(&self) -> String {
        self.my_addr.to_hex()
    }

    pub fn my_addr(&self) -> Address {
        self.my_addr
    }

    pub fn discovered_nodes(&self) -> HashMap<String, Vec<String>> {
        self.registry.snapshot()
    }

    pub fn discovered_nodes_list(&self) -> Vec<String> {
        self.registry.list()
    }
}
