//! Defines the OS layer log API.
//!
//! Every OS should provide the `pr_err!`, `pr_warn!`, `pr_info!` and
//! `pr_debug!` macros in this module; the `log_*!` macros dispatch to them.
//!
//!# Use Example
//!
//! ```
//! #[macro_use]
//! extern crate osl;
//! const __LOG_PREFIX: &[u8] = b"sample\0";
//! fn func() {
//!     log_info!("Hello!")
//! }
//! # fn main() { func() }
//! ```

#[cfg(feature = "linux")]
pub use crate::linux::log::*;
#[cfg(feature = "hosted")]
pub use crate::hosted::log::*;

#[doc(hidden)]
#[macro_export]
macro_rules! log_print (
    (Error, $($arg:tt)*) => (
        $crate::log::pr_err!($($arg)*)
    );
    (Warn, $($arg:tt)*) => (
        $crate::log::pr_warn!($($arg)*)
    );
    (Info, $($arg:tt)*) => (
        $crate::log::pr_info!($($arg)*)
    );
    (Debug, $($arg:tt)*) => (
        $crate::log::pr_debug!($($arg)*)
    );
);

/// Prints an error-level message.
///
/// Use this level for failures the driver cannot recover from.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate osl;
/// # fn main() {
/// log_err!("hello {}", "there");
/// # }
/// ```
#[macro_export]
macro_rules! log_err (
    ($($arg:tt)*) => (
        $crate::log_print!(Error, $($arg)*)
    )
);

/// Prints an warn-level message.
///
/// Use this level for unexpected but harmless conditions.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate osl;
/// # fn main() {
/// log_warn!("hello {}", "there");
/// # }
/// ```
#[macro_export]
macro_rules! log_warn (
    ($($arg:tt)*) => (
        $crate::log_print!(Warn, $($arg)*)
    )
);

/// Prints an info-level message.
///
/// Use this level for informational messages.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate osl;
/// # fn main() {
/// log_info!("hello {}", "there");
/// # }
/// ```
#[macro_export]
macro_rules! log_info (
    ($($arg:tt)*) => (
        $crate::log_print!(Info, $($arg)*)
    )
);

/// Prints a debug-level message.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate osl;
/// # fn main() {
/// log_debug!("hello {}", "there");
/// # }
/// ```
#[macro_export]
macro_rules! log_debug (
    ($($arg:tt)*) => (
        $crate::log_print!(Debug, $($arg)*)
    )
);
