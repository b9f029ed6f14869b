use std::fs::OpenOptions;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use libc::{c_short, IFF_NO_PI, IFF_TUN, TUNSETIFF};
use tracing::{debug, warn};

use crate::error::AllocError;
use crate::request::{until_nul, Allocation, InterfaceRequest, MAX_NAME_LEN};
use crate::Allocator;

pub const DEVICE_PATH: &str = "/dev/net/tun";

const TUN_FLAGS: c_short = (IFF_TUN | IFF_NO_PI) as c_short;
const IFRU_LEN: usize = mem::size_of::<libc::ifreq>() - MAX_NAME_LEN;


// `struct ifreq` as `TUNSETIFF` reads it. The kernel copies the whole
// union, so the padding has to be there even though only the flags are set.
#[repr(C)]
struct IfReq {
    name: [u8; MAX_NAME_LEN],
    data: IfReqData,
}

#[repr(C)]
union IfReqData {
    flags: c_short,
    _pad: [u8; IFRU_LEN],
}

const _: () = assert!(mem::size_of::<IfReq>() == mem::size_of::<libc::ifreq>());

impl IfReq {
    fn new_tun(name: &[u8], len: usize) -> Self {
        let mut ifr = Self {
            name: [0; MAX_NAME_LEN],
            data: IfReqData { _pad: [0; IFRU_LEN] },
        };
        ifr.data.flags = TUN_FLAGS;
        let len = name.len().min(len).min(MAX_NAME_LEN);
        ifr.name[..len].copy_from_slice(&name[..len]);
        ifr
    }

    #[cfg(test)]
    fn flags(&self) -> c_short {
        // SAFETY: every bit pattern is a valid c_short
        unsafe { self.data.flags }
    }
}


/// Allocates interfaces through the Linux tun/tap character device.
///
/// The requested name may carry a `%d` pattern (`vpn%d`), in which case the
/// kernel substitutes the first free index. An empty name yields `tunN`.
#[derive(Debug, Clone)]
pub struct LinuxTunAllocator {
    device: PathBuf,
}

impl LinuxTunAllocator {
    pub fn new() -> Self {
        Self::with_device(DEVICE_PATH)
    }

    pub fn with_device<P: Into<PathBuf>>(device: P) -> Self {
        Self { device: device.into() }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl Default for LinuxTunAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for LinuxTunAllocator {
    fn allocate(&self, request: &InterfaceRequest) -> Result<Allocation, AllocError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device)
            .map_err(|err| {
                debug!("failed to open {}: {}", self.device.display(), err);
                AllocError::Open(err)
            })?;
        // from here on every early return closes the device through the drop
        let fd = OwnedFd::from(file);

        let len = request.effective_len();
        if request.name().len() > len {
            warn!(
                "interface name {:?} is longer than {} bytes, truncating",
                String::from_utf8_lossy(request.name()),
                len
            );
        }
        let mut ifr = IfReq::new_tun(request.name(), len);

        // SAFETY: `ifr` is a live, correctly sized `struct ifreq` for the whole call
        if unsafe { libc::ioctl(fd.as_raw_fd(), TUNSETIFF as _, &mut ifr as *mut IfReq) } < 0 {
            let err = io::Error::last_os_error();
            debug!(
                "TUNSETIFF {:?} on {} failed: {}",
                String::from_utf8_lossy(until_nul(&ifr.name)),
                self.device.display(),
                err
            );
            return Err(AllocError::Control(err));
        }

        let name = until_nul(&ifr.name[..len]).to_vec();
        debug!(
            "allocated tun interface {} on fd {}",
            String::from_utf8_lossy(&name),
            fd.as_raw_fd()
        );
        Ok(Allocation::new(fd, name, request))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use shared::network::{find_available_ifname, interface_exists};

    #[test]
    fn request_matches_kernel_ifreq() {
        assert_eq!(mem::size_of::<IfReq>(), mem::size_of::<libc::ifreq>());
        // type 'T', number 202 on every architecture; direction and size bits vary
        assert_eq!(TUNSETIFF as u64 & 0xffff, 0x54ca);
        assert_eq!(TUN_FLAGS, 0x1001);
    }

    #[test]
    fn ifreq_carries_tun_flags_and_truncated_name() {
        let ifr = IfReq::new_tun(b"tunalloc-interface-0", MAX_NAME_LEN);
        assert_eq!(ifr.flags(), TUN_FLAGS);
        assert_eq!(&ifr.name, b"tunalloc-interfa");

        let ifr = IfReq::new_tun(b"tun0", 3);
        assert_eq!(&ifr.name[..4], b"tun\0");
        assert!(ifr.name[3..].iter().all(|b| *b == 0));

        let ifr = IfReq::new_tun(b"", MAX_NAME_LEN);
        assert_eq!(ifr.name, [0; MAX_NAME_LEN]);
    }

    #[test]
    fn missing_device_is_open_error() {
        let allocator = LinuxTunAllocator::with_device("/nonexistent/net/tun");
        let err = allocator.allocate(&InterfaceRequest::new("tun0", 16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
        assert_eq!(err.io_error().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn non_tun_device_is_control_error() {
        let allocator = LinuxTunAllocator::with_device("/dev/null");
        let err = allocator.allocate(&InterfaceRequest::new("tun0", 16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Control);
        assert!(err.raw_os_error().is_some());
    }

    #[test]
    fn default_uses_kernel_device() {
        assert_eq!(LinuxTunAllocator::default().device(), Path::new(DEVICE_PATH));
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn allocates_requested_name() {
        let name = find_available_ifname("tun");
        let allocation = LinuxTunAllocator::new()
            .allocate(&InterfaceRequest::new(&name, 16))
            .unwrap();
        assert!(allocation.as_raw_fd() >= 0);
        assert_eq!(allocation.name(), name.as_bytes());
        assert!(interface_exists(&name));

        drop(allocation);
        assert!(!interface_exists(&name));
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn kernel_assigns_name_when_empty() {
        let allocation = LinuxTunAllocator::new()
            .allocate(&InterfaceRequest::any(16))
            .unwrap();
        let name = allocation.name_lossy();
        assert!(name.starts_with("tun"), "unexpected name {name}");
        assert!(name["tun".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn confirmed_name_respects_capacity() {
        let name = find_available_ifname("tunalloc");
        let allocation = LinuxTunAllocator::new()
            .allocate(&InterfaceRequest::new(&name, 5))
            .unwrap();
        assert_eq!(allocation.name(), b"tunal");
        assert_eq!(allocation.requested(), name.as_bytes());
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn kernel_expands_index_template() {
        let allocation = LinuxTunAllocator::new()
            .allocate(&InterfaceRequest::new("tunalloc%d", 16))
            .unwrap();
        let name = allocation.name_lossy();
        assert!(name.starts_with("tunalloc"), "unexpected name {name}");
        let index = &name["tunalloc".len()..];
        assert!(!index.is_empty() && index.chars().all(|c| c.is_ascii_digit()), "unexpected name {name}");
        assert!(interface_exists(&name));
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn same_name_twice_concurrently() {
        let name = find_available_ifname("tunalloc");
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2).map(|_| {
            let barrier = Arc::clone(&barrier);
            let name = name.clone();
            thread::spawn(move || {
                let allocator = LinuxTunAllocator::new();
                barrier.wait();
                let result = allocator.allocate(&InterfaceRequest::new(&name, 16));
                // keep the winner alive until both threads are done
                barrier.wait();
                result
            })
        }).collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let control_errors = results
            .iter()
            .filter(|r| matches!(r, Err(err) if err.kind() == ErrorKind::Control))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(control_errors, 1);
    }

    #[test]
    #[ignore = "needs CAP_NET_ADMIN and /dev/net/tun"]
    fn name_is_reusable_after_close() {
        let name = find_available_ifname("tunalloc");
        let allocator = LinuxTunAllocator::new();
        let request = InterfaceRequest::new(&name, 16);

        let first = allocator.allocate(&request).unwrap();
        assert!(allocator.allocate(&request).is_err());
        drop(first);

        let second = allocator.allocate(&request).unwrap();
        assert_eq!(second.name(), name.as_bytes());
    }
}
