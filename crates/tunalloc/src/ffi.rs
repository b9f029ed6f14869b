//! Signed-code call surface.
//!
//! Callers hand in one buffer that holds the name hint on the way in and
//! the confirmed name on the way out. The return value is either the
//! descriptor (`>= 0`, now owned by the caller) or a negative
//! [`ErrorKind::code`](crate::ErrorKind::code).

use std::os::fd::IntoRawFd;
use std::slice;

use tracing::debug;

use crate::{Allocator, InterfaceRequest, PlatformAllocator};


pub fn alloc_into(buf: &mut [u8]) -> i32 {
    alloc_into_with(&PlatformAllocator::default(), buf)
}

/// Like [`alloc_into`] with an explicit allocator.
///
/// `buf` is left untouched when the allocation fails.
pub fn alloc_into_with<A: Allocator>(allocator: &A, buf: &mut [u8]) -> i32 {
    let request = InterfaceRequest::new(&*buf, buf.len());
    match allocator.allocate(&request) {
        Ok(allocation) => {
            let (fd, name) = allocation.into_parts();
            write_name(buf, &name);
            fd.into_raw_fd()
        }
        Err(err) => {
            debug!("allocation failed with code {}: {}", err.code(), err);
            err.code()
        }
    }
}

/// C entry point of [`alloc_into`].
///
/// A null `ptr` or a negative `len` is treated as an empty buffer.
///
/// # Safety
///
/// When `ptr` is non-null it must be valid for reads and writes of `len`
/// bytes for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tunalloc_alloc(ptr: *mut u8, len: i32) -> i32 {
    if ptr.is_null() || len <= 0 {
        return alloc_into(&mut []);
    }
    // SAFETY: guaranteed by the caller
    let buf = unsafe { slice::from_raw_parts_mut(ptr, len as usize) };
    alloc_into(buf)
}

fn write_name(buf: &mut [u8], name: &[u8]) {
    let len = name.len().min(buf.len());
    buf[..len].copy_from_slice(&name[..len]);
    buf[len..].fill(0);
}
