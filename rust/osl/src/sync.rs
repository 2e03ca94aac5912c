//! Defines the OS layer sync API.
//!
//! Every OS must provide the following features
//!
//! - Arc: a reference-counted pointer that callbacks registered with the OS
//!   can hold on to
//! - try_new_arc: a fallible constructor reporting `Errno::NoMemory`
//!
//! - SpinLock
//!  must supply a struct called SpinLock with `try_new` and `lock`. The lock
//!  must be safe to take from interrupt context, and `lock` returns a guard
//!  called SpinLockGuard that releases it when dropped.

#[cfg(feature = "hosted")]
pub use crate::hosted::sync::*;
#[cfg(feature = "linux")]
pub use crate::linux::sync::*;
