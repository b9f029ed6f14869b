//! TUNALLOC
//!
//! Allocates a TUN interface and hands back the descriptor bound to it.
//! The platform handshake is picked at build time: `/dev/net/tun` with
//! `TUNSETIFF` on Linux, the utun kernel control on macOS.
//!
//! ```no_run
//! let allocation = tunalloc::allocate(b"tun0", 16)?;
//! println!("allocated {}", allocation.name_lossy());
//! # Ok::<(), tunalloc::AllocError>(())
//! ```

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
)))]
compile_error!(
    "tunalloc only supports linux (/dev/net/tun) and macos (utun) targets"
);


mod error;
mod request;
pub mod ffi;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
pub mod macos;

pub use error::{AllocError, ErrorKind};
pub use request::{Allocation, InterfaceRequest, MAX_NAME_LEN};

#[cfg(target_os = "linux")]
pub use linux::LinuxTunAllocator;
#[cfg(target_os = "macos")]
pub use macos::MacOSTunAllocator;


/// One platform's kernel handshake for creating a TUN interface.
///
/// On success the returned descriptor belongs to the caller. On failure
/// nothing opened during the call is left open.
pub trait Allocator: Send + Sync {
    fn allocate(&self, request: &InterfaceRequest) -> Result<Allocation, AllocError>;
}

#[cfg(target_os = "linux")]
pub type PlatformAllocator = LinuxTunAllocator;

#[cfg(target_os = "macos")]
pub type PlatformAllocator = MacOSTunAllocator;


/// Allocate an interface with the allocator of the target platform.
///
/// `name` is a hint the kernel may ignore (always on macOS) or reject;
/// `capacity` bounds the length of the name handed back.
pub fn allocate(name: impl AsRef<[u8]>, capacity: usize) -> Result<Allocation, AllocError> {
    PlatformAllocator::default().allocate(&InterfaceRequest::new(name, capacity))
}
