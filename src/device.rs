// 📱 Devices - Sync participants and which one we act as

use crate::error::{Result, SplitterError};
use crate::knowledge::{EntityVersion, Knowledge};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// One device descriptor file from the budget's `devices` folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub short_device_id: String,

    #[serde(rename = "deviceGUID")]
    pub device_guid: String,

    /// Raw knowledge string, e.g. `A-86,B-3`
    pub knowledge: String,
}

impl Device {
    pub fn parsed_knowledge(&self) -> Result<Knowledge> {
        self.knowledge.parse()
    }

    /// This device's own high-water mark inside its knowledge
    pub fn current_version(&self) -> Result<EntityVersion> {
        let knowledge = self.parsed_knowledge()?;
        knowledge
            .version_of(&self.short_device_id)
            .cloned()
            .ok_or_else(|| {
                SplitterError::format(
                    "device knowledge",
                    format!("{} has no mark for {}", self.knowledge, self.short_device_id),
                )
            })
    }
}

/// Read every regular file in `dir` as a device descriptor, in file name order.
pub fn load_devices<P: AsRef<Path>>(dir: P) -> Result<Vec<Device>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(SplitterError::NoDevice(format!("{} is not a directory", dir.display())));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SplitterError::io(dir, e))? {
        let path = entry.map_err(|e| SplitterError::io(dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut devices = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path).map_err(|e| SplitterError::io(&path, e))?;
        let device: Device = serde_json::from_str(&content).map_err(|e| SplitterError::json(&path, e))?;
        debug!("found device {} ({}) with knowledge {}", device.short_device_id, device.device_guid, device.knowledge);
        devices.push(device);
    }
    Ok(devices)
}

/// Pick the device to act as: longest knowledge string, ties broken by the
/// lexically greatest knowledge string. If two descriptors carry the very
/// same knowledge, the first one in file name order wins.
///
/// Lexical order is only a proxy for "most advanced" (`A-9` sorts above
/// `A-10`); the rule is kept as-is to match the host tool's behavior.
pub fn select_device(devices: &[Device]) -> Result<&Device> {
    let mut best: Option<&Device> = None;
    for device in devices {
        let better = match best {
            None => true,
            Some(current) => {
                (device.knowledge.len(), device.knowledge.as_str())
                    > (current.knowledge.len(), current.knowledge.as_str())
            }
        };
        if better {
            best = Some(device);
        }
    }
    best.ok_or_else(|| SplitterError::NoDevice("no device descriptors found".to_string()))
}
