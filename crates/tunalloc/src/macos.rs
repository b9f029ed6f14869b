use std::io;
use std::mem;
use std::os::fd::{AsRawFd, OwnedFd};
use std::ptr;

use libc::{
    socklen_t, AF_SYSTEM, AF_SYS_CONTROL, CTLIOCGINFO, MAX_KCTL_NAME, PF_SYSTEM, SYSPROTO_CONTROL,
    UTUN_OPT_IFNAME,
};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::debug;

use crate::error::AllocError;
use crate::request::{until_nul, Allocation, InterfaceRequest, MAX_NAME_LEN};
use crate::Allocator;

pub const UTUN_CONTROL_NAME: &[u8] = b"com.apple.net.utun_control";


// `struct ctl_info`
#[repr(C)]
struct CtlInfo {
    ctl_id: u32,
    ctl_name: [u8; MAX_KCTL_NAME],
}

// `struct sockaddr_ctl`
#[repr(C)]
struct SockaddrCtl {
    sc_len: u8,
    sc_family: u8,
    ss_sysaddr: u16,
    sc_id: u32,
    sc_unit: u32,
    sc_reserved: [u32; 5],
}

const _: () = assert!(mem::size_of::<CtlInfo>() == mem::size_of::<libc::ctl_info>());
const _: () = assert!(mem::size_of::<SockaddrCtl>() == mem::size_of::<libc::sockaddr_ctl>());

impl CtlInfo {
    fn utun() -> Self {
        let mut info = Self {
            ctl_id: 0,
            ctl_name: [0; MAX_KCTL_NAME],
        };
        info.ctl_name[..UTUN_CONTROL_NAME.len()].copy_from_slice(UTUN_CONTROL_NAME);
        info
    }
}

impl SockaddrCtl {
    // unit 0 asks the kernel for the next free utun index
    fn new(ctl_id: u32, unit: u32) -> Self {
        Self {
            sc_len: mem::size_of::<Self>() as u8,
            sc_family: AF_SYSTEM as u8,
            ss_sysaddr: AF_SYS_CONTROL as u16,
            sc_id: ctl_id,
            sc_unit: unit,
            sc_reserved: [0; 5],
        }
    }

    fn to_sock_addr(&self) -> SockAddr {
        // SAFETY: sockaddr_storage is plain data and larger than sockaddr_ctl
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        unsafe {
            ptr::copy_nonoverlapping(
                (self as *const Self).cast::<u8>(),
                (&mut storage as *mut libc::sockaddr_storage).cast::<u8>(),
                mem::size_of::<Self>(),
            );
            SockAddr::new(storage, mem::size_of::<Self>() as socklen_t)
        }
    }
}


/// Allocates `utunN` interfaces through the utun kernel control.
///
/// The kernel always chooses the interface name, a requested name is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct MacOSTunAllocator;

impl MacOSTunAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for MacOSTunAllocator {
    fn allocate(&self, request: &InterfaceRequest) -> Result<Allocation, AllocError> {
        let socket = Socket::new_raw(
            Domain::from(PF_SYSTEM),
            Type::DGRAM,
            Some(Protocol::from(SYSPROTO_CONTROL)),
        ).map_err(|err| {
            debug!("failed to open kernel control socket: {}", err);
            AllocError::Open(err)
        })?;

        if !request.name().is_empty() {
            debug!(
                "ignoring requested name {:?}, utun names are assigned by the kernel",
                String::from_utf8_lossy(request.name())
            );
        }

        let mut info = CtlInfo::utun();
        // SAFETY: `info` is a live `struct ctl_info` for the whole call
        if unsafe { libc::ioctl(socket.as_raw_fd(), CTLIOCGINFO, &mut info as *mut CtlInfo) } < 0 {
            let err = io::Error::last_os_error();
            debug!("CTLIOCGINFO failed: {}", err);
            return Err(AllocError::Info(err));
        }

        let addr = SockaddrCtl::new(info.ctl_id, 0).to_sock_addr();
        socket.connect(&addr).map_err(|err| {
            debug!("failed to connect utun control {}: {}", info.ctl_id, err);
            AllocError::Connect(err)
        })?;

        let len = request.effective_len();
        let mut buf = [0u8; MAX_NAME_LEN];
        let mut buf_len = len as socklen_t;
        // SAFETY: the kernel writes at most `buf_len` bytes, which never exceeds `buf`
        let result = unsafe {
            libc::getsockopt(
                socket.as_raw_fd(),
                SYSPROTO_CONTROL,
                UTUN_OPT_IFNAME,
                buf.as_mut_ptr().cast(),
                &mut buf_len,
            )
        };
        if result < 0 {
            let err = io::Error::last_os_error();
            debug!("UTUN_OPT_IFNAME with {} bytes failed: {}", len, err);
            return Err(AllocError::Name(err));
        }

        let written = (buf_len as usize).min(len);
        let name = until_nul(&buf[..written]).to_vec();
        let fd = OwnedFd::from(socket);
        debug!(
            "allocated utun interface {} on fd {}",
            String::from_utf8_lossy(&name),
            fd.as_raw_fd()
        );
        Ok(Allocation::new(fd, name, request))
    }
}
