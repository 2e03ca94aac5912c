//! Defines the OS layer register access API.
//!
//! Every OS should provide a mapped register window type implementing
//! [`RegisterIo`]: the Linux backend implements it for a mapped PCI BAR, the
//! hosted backend supplies [`SimWindow`], backed by plain memory.
//!
//! # Use example
//!
//! ```
//! use osl::io::{RegisterIo, SimWindow};
//!
//! let bar = SimWindow::new(0x1000);
//! let v = bar.try_read32(0x3c0).unwrap();
//! bar.try_write32(v | 1, 0x3c0).unwrap();
//! bar.wmb();
//! ```

use crate::error::Result;

#[cfg(feature = "hosted")]
pub use crate::hosted::io::SimWindow;

/// A mapped window of 32-bit device registers.
///
/// Offsets are byte offsets from the start of the window. Accesses outside
/// the window fail instead of touching unrelated memory.
pub trait RegisterIo: Send + Sync {
    /// Length of the window in bytes.
    fn len(&self) -> usize;

    /// Reads the 32-bit register at `offset`.
    fn try_read32(&self, offset: usize) -> Result<u32>;

    /// Writes `value` to the 32-bit register at `offset`.
    fn try_write32(&self, value: u32, offset: usize) -> Result<()>;

    /// Orders all previous writes before any later I/O access.
    fn wmb(&self);

    /// Whether a 32-bit register at `offset` lies inside the window.
    fn covers(&self, offset: usize) -> bool {
        offset % 4 == 0 && offset.checked_add(4).map_or(false, |end| end <= self.len())
    }
}
