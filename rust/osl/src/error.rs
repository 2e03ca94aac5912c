//! Defines the OS layer general error type.
//!
//! Every OS should provide Error type and an error code conversion method
//! such as the following implementation on Linux.
//!
//! # Examples
//!
//! ```ignore
//! use kernel::prelude::error{Error,code};
//!
//! impl From<crate::error::Errno> for Error {
//!     fn from(errno: crate::error::Errno) -> Self {
//!         match errno {
//!             crate::error::Errno::InvalidArgs => code::EINVAL,
//!             ...
//!         }
//!     }
//! }
//! ```
//!
//! Driver use osl error
//!
//! ```
//! use osl::error::{to_error, Errno, Result};
//!
//! fn func(t: i32) -> Result<()> {
//!     if t > 0 {
//!         Ok(())
//!     } else {
//!         to_error(Errno::InvalidArgs)
//!     }
//! }
//! # assert!(func(1).is_ok());
//! # assert!(func(0).is_err());
//! ```

use core::fmt;

/// The general error type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Errno {
    /// Invalid arguments.
    InvalidArgs,
    /// No such device.
    NoSuchDevice,
    /// Out of memory.
    NoMemory,
    /// Device or resource is busy
    Busy,
    /// IO error
    Io,
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Errno::InvalidArgs => "invalid argument",
            Errno::NoSuchDevice => "no such device",
            Errno::NoMemory => "out of memory",
            Errno::Busy => "device or resource busy",
            Errno::Io => "input/output error",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "linux")]
pub use crate::linux::error::*;
#[cfg(feature = "hosted")]
pub use crate::hosted::error::*;

/// A [`Result`] with an [`Error`] error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Give an errno, return OS Error
pub fn to_error<T>(errno: Errno) -> Result<T> {
    Err::<T, Error>(Error::from(errno))
}
