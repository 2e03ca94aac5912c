//! Linux backend, built by Kbuild against the `kernel` crate.

pub(crate) mod error;
pub(crate) mod io;
pub(crate) mod log;
pub(crate) mod sync;
