use clap::Args;
use std::process;
use ctrlc::set_handler;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use shared::config::{Config, InterfaceConfig};
use shared::{success_err, success_ok};
use tunalloc::{AllocError, Allocation, Allocator, InterfaceRequest};

#[derive(Debug, Args)]
pub struct AllocCmd {
    /// Requested interface name (ignored on macos)
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,
    /// Bytes of the confirmed name to read back
    #[arg(short, long, value_name = "BYTES")]
    capacity: Option<usize>,
    /// Keep the interface until Ctrl-C instead of releasing it right away
    #[arg(long, default_value = "false")]
    hold: bool
}

impl AllocCmd {
    pub async fn exec(self, config: Config) {
        let hold = self.hold;
        let interface = self.apply(config.interface);

        let allocation = match allocate(&interface) {
            Ok(allocation) => allocation,
            Err(err) => {
                error!("allocation failed: {}", err);
                success_err!("allocation failed with code {}: {}", err.code(), err);
                process::exit(1);
            }
        };
        success_ok!("Allocated", "{}", allocation);

        if hold {
            hold_until_stop(&allocation).await;
        }

        let name = allocation.name_lossy();
        drop(allocation);
        success_ok!("Released", name);
    }

    /// Command-line values take precedence over the config file
    fn apply(self, mut interface: InterfaceConfig) -> InterfaceConfig {
        if let Some(name) = self.name {
            interface.name = Some(name);
        }
        if let Some(capacity) = self.capacity {
            interface.capacity = capacity;
        }
        interface
    }
}

fn allocate(interface: &InterfaceConfig) -> Result<Allocation, AllocError> {
    let request = InterfaceRequest::new(interface.request_name(), interface.capacity);

    #[cfg(target_os = "linux")]
    let allocator = tunalloc::LinuxTunAllocator::with_device(&interface.device);

    #[cfg(target_os = "macos")]
    let allocator = {
        if let Some(name) = &interface.name {
            shared::success_warn!("utun names are assigned by the kernel, ignoring {}", name);
        }
        tunalloc::MacOSTunAllocator::new()
    };

    allocator.allocate(&request)
}

async fn hold_until_stop(allocation: &Allocation) {
    let (stop_tx, mut stop_rx) = broadcast::channel::<()>(1);

    if let Err(err) = set_handler(move || {
        match stop_tx.send(()) {
            Ok(_) => debug!("stop signal sent from Ctrl-C handler"),
            Err(err) => debug!("stop signal not sent from Ctrl-C handler: {}", err),
        }
    }) {
        success_err!("failed to set Ctrl-C handler: {}", err);
        return;
    }

    info!("holding {} until Ctrl-C", allocation.name_lossy());
    if let Err(err) = stop_rx.recv().await {
        debug!("stop channel closed: {}", err);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config() {
        let cmd = AllocCmd { name: Some("vpn1".into()), capacity: Some(6), hold: false };
        let interface = cmd.apply(InterfaceConfig {
            name: Some("tun4".into()),
            capacity: 16,
            device: PathBuf::from("/dev/net/tun"),
        });
        assert_eq!(interface.name.as_deref(), Some("vpn1"));
        assert_eq!(interface.capacity, 6);
    }

    #[test]
    fn config_is_kept_without_flags() {
        let cmd = AllocCmd { name: None, capacity: None, hold: true };
        let interface = cmd.apply(InterfaceConfig::default());
        assert_eq!(interface, InterfaceConfig::default());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn configured_device_is_used() {
        let interface = InterfaceConfig {
            name: Some("tun0".into()),
            device: PathBuf::from("/nonexistent/net/tun"),
            ..Default::default()
        };
        let err = allocate(&interface).unwrap_err();
        assert_eq!(err.kind(), tunalloc::ErrorKind::Open);
    }
}
