//! Hosted backend: lets the pure drivers build and run their tests on a
//! regular operating system, without the kernel crate.

pub(crate) mod error;
pub(crate) mod io;
pub(crate) mod log;
pub(crate) mod sync;
