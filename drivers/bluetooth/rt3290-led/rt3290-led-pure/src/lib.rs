// SPDX-License-Identifier: GPL-2.0

//! Pure driver for the Bluetooth power line of the Ralink RT3290.
//!
//! The RT3290 combo chip gates its Bluetooth radio with GPIO1, controlled
//! through the function-control register in BAR 0 of the Bluetooth PCI
//! function. This crate exposes that line as an LED: any non-zero brightness
//! powers the radio, zero powers it off.
//!
//! Everything OS specific goes through the OS layer (`osl`); the register
//! schema is described with `bitflags`. The kernel adapter in
//! `../rt3290-led-adapter` provides [`bus::PciFunction`] and
//! [`bus::LedClass`] over the kernel PCI and LED subsystems; the tests
//! provide them over memory.

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate osl;

/// Prefix to appear before log messages printed from within this crate.
#[cfg_attr(feature = "hosted", allow(dead_code))]
const __LOG_PREFIX: &[u8] = b"rt3290_led\0";

pub mod binding;
pub mod bus;
pub mod power;
pub mod regs;

#[cfg(test)]
mod testing;

pub use binding::{Binding, State};
pub use bus::{LedClass, PciFunction, PciId};
pub use power::GpioPower;

use osl::driver::led::{Brightness, LedClassdevInfo, LedClassdevInfoBuilder};
use osl::error::Result;

/// [`DRV_NAME`] with a NUL terminator, for the C side of the OS.
pub const DRV_NAME_NUL: &[u8] = b"rtbt_example\0";

/// Name of the driver, its PCI regions and its LED class device.
pub const DRV_NAME: &str = strip_nul(DRV_NAME_NUL);

const fn strip_nul(bytes: &'static [u8]) -> &'static str {
    match bytes.split_last() {
        Some((&0, name)) => match core::str::from_utf8(name) {
            Ok(name) => name,
            Err(_) => panic!("name is not UTF-8"),
        },
        _ => panic!("name is not NUL terminated"),
    }
}

/// Ralink.
pub const PCI_VENDOR_ID_RALINK: u16 = 0x1814;

/// RT3290 Bluetooth function.
pub const PCI_DEVICE_ID_RT3290_BT: u16 = 0x3298;

/// Devices the driver binds to.
pub const PCI_IDS: [PciId; 1] = [PciId::new(PCI_VENDOR_ID_RALINK, PCI_DEVICE_ID_RT3290_BT)];

/// BAR holding the control and status registers.
pub const CSR_BAR: usize = 0;

/// Builder for the LED the driver registers: off, with levels up to 255.
pub fn led_info_builder() -> LedClassdevInfoBuilder {
    let mut builder = LedClassdevInfo::new_builder(DRV_NAME);
    builder
        .brightness(Brightness::OFF)
        .max_brightness(Brightness::FULL);
    builder
}

/// The LED the driver registers.
pub fn led_info() -> Result<LedClassdevInfo> {
    LedClassdevInfo::from_builder(&led_info_builder())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_name_matches_its_c_string() {
        assert_eq!(DRV_NAME, "rtbt_example");
        assert_eq!(&DRV_NAME_NUL[..DRV_NAME.len()], DRV_NAME.as_bytes());
        assert_eq!(DRV_NAME_NUL.last(), Some(&0));
    }

    #[test]
    fn led_defaults_to_off_with_full_range() {
        let info = led_info().unwrap();
        assert_eq!(info.name(), DRV_NAME);
        assert_eq!(info.brightness(), Brightness::OFF);
        assert_eq!(info.max_brightness(), Brightness::FULL);
    }
}
