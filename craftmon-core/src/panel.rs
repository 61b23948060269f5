//! MCSManager remote-services endpoint decoding
//!
//! Wire format:
//! ```json
//! {"status":200,"data":[{"system":{"cpuUsage":0.42,"memUsage":0.17},
//!                        "instance":{"running":3,"total":5}}]}
//! ```
//!
//! Usage figures come in as fractions in [0, 1]; they leave here as
//! percentages so the renderer never sees raw fractions.

use heapless::Vec;
use serde::Deserialize;

use crate::fetch::FetchError;

/// Maximum remote-services entries accepted from the panel.
const MAX_NODES: usize = 8;

#[derive(Debug, Deserialize)]
struct Response {
    status: u16,
    #[serde(default)]
    data: Vec<Node, MAX_NODES>,
}

#[derive(Debug, Deserialize)]
struct Node {
    system: SystemLoad,
    instance: Instances,
}

#[derive(Debug, Deserialize)]
struct SystemLoad {
    #[serde(rename = "cpuUsage")]
    cpu_usage: f32,
    #[serde(rename = "memUsage")]
    mem_usage: f32,
}

#[derive(Debug, Deserialize)]
struct Instances {
    running: u32,
    total: u32,
}

/// Point-in-time readings from the first remote-services node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSnapshot {
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub running: u32,
    pub total: u32,
}

/// Decode a remote-services response body.
pub fn decode(body: &[u8]) -> Result<PanelSnapshot, FetchError> {
    let (response, _) =
        serde_json_core::from_slice::<Response>(body).map_err(|_| FetchError::Malformed)?;

    if response.status != 200 {
        return Err(FetchError::Api(response.status));
    }

    let node = response.data.first().ok_or(FetchError::Malformed)?;
    Ok(PanelSnapshot {
        cpu_percent: node.system.cpu_usage * 100.0,
        mem_percent: node.system.mem_usage * 100.0,
        running: node.instance.running,
        total: node.instance.total,
    })
}
