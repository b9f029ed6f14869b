use std::fmt;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};

/// Longest interface name either kernel accepts, terminator included.
pub const MAX_NAME_LEN: usize = 16;


/// What the caller asks for: a name hint and how many bytes of the
/// resulting name it is prepared to receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRequest {
    name: Vec<u8>,
    capacity: usize,
}

impl InterfaceRequest {
    pub fn new(name: impl AsRef<[u8]>, capacity: usize) -> Self {
        Self {
            name: until_nul(name.as_ref()).to_vec(),
            capacity,
        }
    }

    pub fn any(capacity: usize) -> Self {
        Self::new(b"", capacity)
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // bytes of the name that can travel through the kernel and back
    pub fn effective_len(&self) -> usize {
        self.capacity.min(MAX_NAME_LEN)
    }
}

impl Default for InterfaceRequest {
    fn default() -> Self {
        Self::any(MAX_NAME_LEN)
    }
}


/// A live TUN interface.
///
/// The interface exists as long as the descriptor is open: dropping the
/// allocation (or the descriptor taken out of it) destroys it.
#[derive(Debug)]
pub struct Allocation {
    fd: OwnedFd,
    name: Vec<u8>,
    requested: Vec<u8>,
}

impl Allocation {
    pub(crate) fn new(fd: OwnedFd, name: Vec<u8>, request: &InterfaceRequest) -> Self {
        debug_assert!(name.len() <= request.effective_len());
        Self {
            fd,
            name,
            requested: request.name().to_vec(),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn requested(&self) -> &[u8] {
        &self.requested
    }

    pub fn into_fd(self) -> OwnedFd {
        self.fd
    }

    pub fn into_parts(self) -> (OwnedFd, Vec<u8>) {
        (self.fd, self.name)
    }
}

impl AsFd for Allocation {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for Allocation {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl IntoRawFd for Allocation {
    fn into_raw_fd(self) -> RawFd {
        self.fd.into_raw_fd()
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requested = if self.requested.is_empty() {
            "<any>".into()
        } else {
            String::from_utf8_lossy(&self.requested)
        };
        write!(
            f,
            "{} (fd {}, requested {})",
            String::from_utf8_lossy(&self.name),
            self.fd.as_raw_fd(),
            requested
        )
    }
}


pub(crate) fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
