//! Class devices a driver can expose to the OS.

pub mod led;
