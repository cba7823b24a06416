use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};

// per-endpoint table of discovered neighbors, written only by the receiver
// engine, read by the sender engine and the facade
#[derive(Default)]
pub struct Registry {
    nodes: Mutex<HashMap<String, Vec<String>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            nodes: Mutex::new(HashMap::new()),
        }
    }

    // payload is literal `None` or a JSON object whose keys are neighbor
    // address strings (values ignored); anything else is treated as no
    // neighbors
    pub fn register(&self, node_name: &[u8], payload: &[u8]) {
        let Ok(node_name) = std::str::from_utf8(node_name) else {
            log::warn!("discovery: node name is not valid UTF-8, dropping registration");
            return;
        };

        let neighbors = match decode_payload(payload) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("discovery: malformed hello payload from {node_name}: {err}");
                Vec::new()
            }
        };

        log::debug!("discovery: registering {node_name} -> {neighbors:?}");
        self.nodes
            .lock()
            .expect("registry mutex poisoned")
            .insert(node_name.to_string(), neighbors);
    }

    // used by the sender engine to compose this endpoint's own hello payload
    pub fn list(&self) -> Vec<String> {
        self.nodes
            .lock()
            .expect("registry mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.nodes.lock().expect("registry mutex poisoned").clone()
    }
}

fn decode_payload(payload: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(payload).map_err(|_| Error::InvalidDiscoveryPayload)?;
    if text == "None" {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(Error::InvalidDiscoveryPayload)?;
    Ok(object.keys().cloned().collect())
}

// `None` if no neighbors yet, else a JSON object keyed by neighbor address
// (values are the empty string, unused on parse)
pub fn encode_hello_payload(neighbors: &[String]) -> Vec<u8> {
    if neighbors.is_empty() {
        return b"None".to_vec();
    }
    let object: serde_json::Map<String, serde_json::Value> = neighbors
        .iter()
        .map(|addr| (addr.clone(), serde_json::Value::String(String::new())))
        .collect();
    serde_json::Value::Object(object).to_string().into_bytes()
}
