use std::path::Path;
use shared::config::Config;
use shared::{success_err, success_ok};

pub fn exec(path: &Path, config: &Config) {
    success_ok!("Config", path.display());
    success_ok!("Platform", std::env::consts::OS);
    success_ok!("Name", config.interface.name.as_deref().unwrap_or("<kernel assigned>"));
    success_ok!("Capacity", config.interface.capacity);
    if cfg!(target_os = "linux") {
        success_ok!("Device", config.interface.device.display());
    }
    match toml::to_string(config) {
        Ok(raw) => println!("\n{}", raw),
        Err(err) => success_err!("failed to render config: {}", err),
    }
}
