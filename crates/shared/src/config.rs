use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::network::find_available_ifname;

const DEFAULT_BASE_NAME: &str = "tun";


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Requested name, the kernel picks one when unset
    pub name: Option<String>,
    /// Bytes of the confirmed name to read back
    pub capacity: usize,
    /// tun/tap device node, linux only
    pub device: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub interface: InterfaceConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        debug!("loading config from {}", path.display());
        let config = toml::from_str(&std::fs::read_to_string(path)?)?;
        Ok(config)
    }

    pub fn save_as(&self, path: &Path) -> anyhow::Result<()> {
        debug!("writing config to {}", path.display());
        std::fs::write(
            path,
            toml::to_string(self)?
        ).map_err(anyhow::Error::from)
    }
}

impl InterfaceConfig {
    /// Name to request from the kernel.
    ///
    /// Falls back to the first free `tunN` on linux. On macos utun names
    /// are always chosen by the kernel, so nothing is requested.
    pub fn request_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if cfg!(target_os = "linux") => find_available_ifname(DEFAULT_BASE_NAME),
            None => String::new(),
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            name: None,
            capacity: 16,
            device: PathBuf::from("/dev/net/tun"),
        }
    }
}
