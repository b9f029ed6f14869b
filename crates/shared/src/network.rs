use std::collections::HashSet;
use pnet::datalink;
use tracing::debug;

fn interface_names() -> HashSet<String> {
    datalink::interfaces()
        .into_iter()
        .map(|iface| iface.name)
        .collect()
}

/// First `{base_name}{index}` not taken by an existing interface.
///
/// Only a hint: another process may grab the name before it is allocated.
pub fn find_available_ifname(base_name: &str) -> String {
    let existing_names = interface_names();

    let mut index = 0;
    loop {
        let candidate = format!("{}{}", base_name, index);
        if !existing_names.contains(&candidate) {
            debug!("picked free interface name {}", candidate);
            return candidate;
        }

        index += 1;
    }
}

pub fn interface_exists(name: &str) -> bool {
    interface_names().contains(name)
}
