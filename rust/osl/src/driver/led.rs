//! LED class device description
//!
//! A driver describes the LED it wants to register with a
//! [`LedClassdevInfo`]; every OS registers it with its own LED subsystem.
//!
//! # Use example
//!
//! ```
//! use osl::driver::led::{Brightness, LedClassdevInfo};
//!
//! let mut builder = LedClassdevInfo::new_builder("rtbt_example");
//! builder.max_brightness(Brightness::FULL);
//! let info = LedClassdevInfo::from_builder(&builder).unwrap();
//! assert_eq!(info.brightness(), Brightness::OFF);
//! ```

use core::fmt;

use crate::error::{to_error, Errno, Error, Result};

/// An LED brightness level.
///
/// Zero is off; the meaning of other levels is up to the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u32);

impl Brightness {
    /// LED off.
    pub const OFF: Self = Self(0);
    /// Half brightness, for LEDs that only distinguish on and off.
    pub const HALF: Self = Self(127);
    /// Full brightness, the default maximum.
    pub const FULL: Self = Self(255);

    /// Wraps a raw level.
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    /// Raw level.
    #[inline]
    pub const fn level(self) -> u32 {
        self.0
    }

    /// Whether this is [`Brightness::OFF`].
    #[inline]
    pub const fn is_off(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Brightness {
    fn from(level: u32) -> Self {
        Self(level)
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// LED class device config
///
/// name: the name the device appears under in the LED class
/// brightness: level the device starts at, LED_OFF unless set
/// max_brightness: highest level userspace may request, 255 unless set
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Eq, Debug, Builder)]
#[builder(no_std)]
#[builder(build_fn(error(validation_error = false)))]
#[builder(public)]
pub struct LedClassdevInfo {
    name: &'static str,
    #[builder(default = "Brightness::OFF")]
    brightness: Brightness,
    #[builder(default = "Brightness::FULL")]
    max_brightness: Brightness,
}

impl LedClassdevInfo {
    /// Get a builder for a device called `name` with default levels.
    pub fn new_builder(name: &'static str) -> LedClassdevInfoBuilder {
        let mut builder = LedClassdevInfoBuilder::default();
        builder.name(name);
        builder
    }

    /// Build and validate the description held by `builder`.
    pub fn from_builder(builder: &LedClassdevInfoBuilder) -> Result<Self> {
        let info = builder
            .build()
            .map_err(|_| Error::from(Errno::InvalidArgs))?;
        info.validate()?;
        Ok(info)
    }

    /// Checks that the levels are consistent and the name is usable.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.contains(|c: char| c == '/' || c == '\0') {
            return to_error(Errno::InvalidArgs);
        }
        if self.max_brightness.is_off() || self.brightness > self.max_brightness {
            return to_error(Errno::InvalidArgs);
        }
        Ok(())
    }

    /// get name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// get initial brightness
    #[inline]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// get max brightness
    #[inline]
    pub fn max_brightness(&self) -> Brightness {
        self.max_brightness
    }
}
