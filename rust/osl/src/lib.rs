//! This is an OS interface abstraction layer developed for cross-kernel drivers.
//!
//! Include:
//! - error: error type used by drivers
//! - log: log interface used by drivers
//! - io: memory-mapped register access used by drivers
//! - sync: shared ownership of driver state and the locks guarding it
//! - driver: descriptions of the class devices a driver can register
//!
//! Exactly one backend feature must be enabled: `linux` when building inside
//! the kernel tree, `hosted` when building the pure drivers on a host.

#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "linux", feature = "hosted"))]
compile_error!("features `linux` and `hosted` are mutually exclusive");

#[cfg(not(any(feature = "linux", feature = "hosted")))]
compile_error!("one of the `linux` or `hosted` features must be enabled");

extern crate alloc;

#[cfg(feature = "linux")]
mod linux;
#[cfg(feature = "hosted")]
mod hosted;

#[macro_use]
extern crate derive_builder;

/// Prefix to appear before log messages printed from within the `osl` crate.
#[cfg_attr(feature = "hosted", allow(dead_code))]
const __LOG_PREFIX: &[u8] = b"osl\0";

pub mod error;
pub mod io;
pub mod log;
pub mod sync;

pub mod driver;
