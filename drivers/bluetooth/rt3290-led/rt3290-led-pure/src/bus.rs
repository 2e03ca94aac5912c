// SPDX-License-Identifier: GPL-2.0

//! What the driver needs from the host OS.
//!
//! Every OS provides these for the device being bound: the kernel adapter
//! implements them over `kernel::pci` and `kernel::leds`.

use core::fmt;

use osl::driver::led::LedClassdevInfo;
use osl::error::Result;
use osl::io::RegisterIo;
use osl::sync::Arc;

use crate::power::GpioPower;

/// Vendor and device id of a PCI function.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PciId {
    /// Vendor id.
    pub vendor: u16,
    /// Device id.
    pub device: u16,
}

impl PciId {
    /// Creates an id from its vendor and device parts.
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self { vendor, device }
    }
}

impl fmt::Display for PciId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.device)
    }
}

/// A PCI function the driver is bound to.
///
/// Resources handed out by these methods are released through the matching
/// method, in reverse order of acquisition.
pub trait PciFunction {
    /// The mapped form of a memory BAR.
    type Window: RegisterIo + 'static;

    /// Vendor and device id.
    fn id(&self) -> PciId;

    /// Wakes the function up and enables its resources.
    fn enable_device(&mut self) -> Result<()>;

    /// Undoes [`PciFunction::enable_device`].
    fn disable_device(&mut self);

    /// Whether `bar` decodes memory space, as opposed to I/O ports.
    fn bar_is_mem(&self, bar: usize) -> bool;

    /// Claims all the function's BARs for the driver called `name`.
    ///
    /// Fails when another driver already holds them.
    fn request_regions(&mut self, name: &'static str) -> Result<()>;

    /// Undoes [`PciFunction::request_regions`].
    fn release_regions(&mut self);

    /// Maps the whole of `bar`.
    fn iomap(&mut self, bar: usize) -> Result<Self::Window>;

    /// Unmaps a window returned by [`PciFunction::iomap`].
    fn iounmap(&mut self, window: Self::Window);
}

/// The LED class of the host OS.
pub trait LedClass<W: RegisterIo> {
    /// A registered LED class device. Dropping it unregisters the device, and
    /// once that returns the LED class makes no further calls into `power`.
    type Registration;

    /// Registers an LED described by `info` under the bound device. Brightness
    /// requests from the LED class are forwarded to `power`.
    fn register_led(
        &mut self,
        info: &LedClassdevInfo,
        power: Arc<GpioPower<W>>,
    ) -> Result<Self::Registration>;
}
