use std::io;
use thiserror::Error;


/// Which step of the kernel handshake failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Open,
    Control,
    Info,
    Connect,
    Name,
}

impl ErrorKind {
    /// Negative code reported through the C call surface. `Control` and
    /// `Info` share `-2`, the same step on different platforms.
    pub const fn code(self) -> i32 {
        match self {
            ErrorKind::Open => -1,
            ErrorKind::Control | ErrorKind::Info => -2,
            ErrorKind::Connect => -3,
            ErrorKind::Name => -4,
        }
    }
}


#[derive(Error, Debug)]
pub enum AllocError {
    #[error("Open: {0}")]
    Open(io::Error),
    #[error("Control: {0}")]
    Control(io::Error),
    #[error("Info: {0}")]
    Info(io::Error),
    #[error("Connect: {0}")]
    Connect(io::Error),
    #[error("Name: {0}")]
    Name(io::Error),
}

impl AllocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocError::Open(_) => ErrorKind::Open,
            AllocError::Control(_) => ErrorKind::Control,
            AllocError::Info(_) => ErrorKind::Info,
            AllocError::Connect(_) => ErrorKind::Connect,
            AllocError::Name(_) => ErrorKind::Name,
        }
    }

    pub fn code(&self) -> i32 {
        self.kind().code()
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            AllocError::Open(err)
            | AllocError::Control(err)
            | AllocError::Info(err)
            | AllocError::Connect(err)
            | AllocError::Name(err) => err,
        }
    }

    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().raw_os_error()
    }
}

impl From<AllocError> for io::Error {
    fn from(err: AllocError) -> Self {
        let kind = err.io_error().kind();
        io::Error::new(kind, err)
    }
}
