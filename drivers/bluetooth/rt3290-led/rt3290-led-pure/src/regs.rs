// SPDX-License-Identifier: GPL-2.0

//! Function-control register of the RT3290 Bluetooth function.
//!
//! Only the two GPIO1 fields are driven; every other bit belongs to the
//! radio and is carried through unchanged.

use bitflags::bitflags;

/// Byte offset of the function-control register in BAR 0.
pub const BT_FUN_CTRL: usize = 0x3c0;

bitflags! {
    /// Fields of [`BT_FUN_CTRL`] driven by this driver.
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FunCtrl: u32 {
        /// GPIO1 output data.
        const GPIO1_DOUT = 1 << 16;
        /// GPIO1 direction: 0 output, 1 input.
        const GPIO1_DIR = 1 << 24;
    }
}

/// Drives GPIO1 high as an output, powering the radio.
#[inline]
pub const fn power_on(value: u32) -> u32 {
    (value & !FunCtrl::GPIO1_DIR.bits()) | FunCtrl::GPIO1_DOUT.bits()
}

/// Drives GPIO1 low. The direction field is left as is.
#[inline]
pub const fn power_off(value: u32) -> u32 {
    value & !FunCtrl::GPIO1_DOUT.bits()
}

/// Whether `value` has GPIO1 configured as an output driven high.
#[inline]
pub const fn is_powered(value: u32) -> bool {
    let fields = FunCtrl::from_bits_truncate(value);
    fields.contains(FunCtrl::GPIO1_DOUT) && !fields.contains(FunCtrl::GPIO1_DIR)
}
