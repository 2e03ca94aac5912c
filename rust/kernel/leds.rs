// SPDX-License-Identifier: GPL-2.0

//! LED class devices.
//!
//! C header: [`include/linux/leds.h`](../../../../include/linux/leds.h)

use crate::{
    bindings,
    device::RawDevice,
    error::{to_result, Result},
    str::CString,
    types::{ForeignOwnable, ScopeGuard},
};
use alloc::boxed::Box;
use core::{ffi::c_void, fmt, marker::PhantomData, pin::Pin};
use macros::vtable;

/// LED off.
pub const LED_OFF: u32 = bindings::led_brightness_LED_OFF as _;

/// LED at full brightness, the default maximum.
pub const LED_FULL: u32 = bindings::led_brightness_LED_FULL as _;

/// Corresponds to the brightness callbacks of the kernel's `struct led_classdev`.
///
/// The LED core may call these from any context and concurrently with each other, so the data
/// they share must be [`Sync`].
#[vtable]
pub trait Operations {
    /// The context data made available to the callbacks.
    type Data: ForeignOwnable + Send + Sync;

    /// Sets the brightness. Must not sleep.
    ///
    /// Corresponds to the `brightness_set` function pointer in `struct led_classdev`.
    fn brightness_set(data: <Self::Data as ForeignOwnable>::Borrowed<'_>, brightness: u32);

    /// Reads the actual brightness back from the hardware.
    ///
    /// Corresponds to the `brightness_get` function pointer in `struct led_classdev`.
    fn brightness_get(_data: <Self::Data as ForeignOwnable>::Borrowed<'_>) -> u32 {
        LED_OFF
    }
}

struct Classdev {
    cdev: bindings::led_classdev,
    data: *mut c_void,
}

/// The registration of an LED class device.
///
/// The device is unregistered, and the context data released, when the registration is dropped.
///
/// # Examples
///
/// ```ignore
/// # use kernel::prelude::*;
/// use kernel::leds;
///
/// struct Example;
///
/// #[vtable]
/// impl leds::Operations for Example {
///     type Data = Box<u32>;
///
///     fn brightness_set(_data: &u32, _brightness: u32) {}
/// }
///
/// fn register(dev: &pci::Device, data: Box<u32>) -> Result<leds::Registration<Example>> {
///     leds::Registration::try_new(dev, fmt!("example"), leds::LED_OFF, leds::LED_FULL, data)
/// }
/// ```
///
/// # Invariants
///
/// `classdev.cdev` is registered with the LED core, and `classdev.data` came from
/// `T::Data::into_foreign`.
pub struct Registration<T: Operations> {
    classdev: Pin<Box<Classdev>>,
    _name: CString,
    _p: PhantomData<T>,
}

impl<T: Operations> Registration<T> {
    /// Registers an LED class device called `name` under `parent`.
    pub fn try_new(
        parent: &dyn RawDevice,
        name: fmt::Arguments<'_>,
        brightness: u32,
        max_brightness: u32,
        data: T::Data,
    ) -> Result<Self> {
        let name = CString::try_from_fmt(name)?;
        let mut classdev = Box::try_new(Classdev {
            cdev: bindings::led_classdev::default(),
            data: core::ptr::null_mut(),
        })?;

        let ptr = data.into_foreign() as *mut _;
        let guard = ScopeGuard::new(|| {
            // SAFETY: `ptr` came from a previous call to `into_foreign`.
            unsafe { T::Data::from_foreign(ptr) };
        });

        classdev.data = ptr;
        classdev.cdev.name = name.as_char_ptr();
        classdev.cdev.brightness = brightness as _;
        classdev.cdev.max_brightness = max_brightness as _;
        classdev.cdev.brightness_set = Some(Self::brightness_set_callback);
        if T::HAS_BRIGHTNESS_GET {
            classdev.cdev.brightness_get = Some(Self::brightness_get_callback);
        }
        let mut classdev = Box::into_pin(classdev);

        // SAFETY: `classdev` is pinned, and it and `name` live as long as the registration.
        // `parent` is valid because `RawDevice` implementers keep it alive.
        to_result(unsafe {
            bindings::led_classdev_register_ext(
                parent.raw_device(),
                &mut classdev.as_mut().get_unchecked_mut().cdev,
                core::ptr::null_mut(),
            )
        })?;
        guard.dismiss();

        // INVARIANT: The device was registered above with `data` attached.
        Ok(Self {
            classdev,
            _name: name,
            _p: PhantomData,
        })
    }

    /// # Safety
    ///
    /// `cdev` must be embedded in a [`Classdev`] owned by a live `Registration<T>`.
    unsafe fn data<'a>(cdev: *mut bindings::led_classdev) -> <T::Data as ForeignOwnable>::Borrowed<'a> {
        // SAFETY: By the safety requirements of this function, `cdev` is the `cdev` field of a
        // `Classdev`.
        let classdev = unsafe { &*crate::container_of!(cdev, Classdev, cdev) };
        // SAFETY: `data` came from `into_foreign`, and `from_foreign` is only called after the
        // device is unregistered, when no callbacks are running any more.
        unsafe { T::Data::borrow(classdev.data) }
    }

    unsafe extern "C" fn brightness_set_callback(
        cdev: *mut bindings::led_classdev,
        brightness: bindings::led_brightness,
    ) {
        // SAFETY: The LED core only calls back for registered devices.
        let data = unsafe { Self::data(cdev) };
        T::brightness_set(data, brightness as _);
    }

    unsafe extern "C" fn brightness_get_callback(
        cdev: *mut bindings::led_classdev,
    ) -> bindings::led_brightness {
        // SAFETY: The LED core only calls back for registered devices.
        let data = unsafe { Self::data(cdev) };
        T::brightness_get(data) as _
    }
}

impl<T: Operations> Drop for Registration<T> {
    fn drop(&mut self) {
        // SAFETY: By the type invariants the device is registered. Unregistering waits for
        // pending brightness work, so no callback runs after this.
        unsafe {
            bindings::led_classdev_unregister(
                &mut self.classdev.as_mut().get_unchecked_mut().cdev,
            )
        };

        // SAFETY: This matches the call to `into_foreign` from `try_new`.
        unsafe { T::Data::from_foreign(self.classdev.data) };
    }
}

// SAFETY: The registration only hands `T::Data` to the callbacks, and `T::Data` is `Send`.
unsafe impl<T: Operations> Send for Registration<T> {}

// SAFETY: `&Registration` exposes nothing, so sharing it across threads is harmless.
unsafe impl<T: Operations> Sync for Registration<T> {}
