// SPDX-License-Identifier: GPL-2.0

//! PCI devices and drivers.
//!
//! C header: [`include/linux/pci.h`](../../../../include/linux/pci.h)

use crate::{
    bindings,
    device,
    driver::{self, RawDeviceId},
    error::{code::*, from_result, to_result, Result},
    str::CStr,
    types::ForeignOwnable,
    ThisModule,
};
use core::ffi::c_void;

/// Number of standard BARs of a PCI function.
pub const STD_NUM_BARS: usize = bindings::PCI_STD_NUM_BARS as _;

/// Resource flag of a BAR decoding memory space.
pub const IORESOURCE_MEM: u64 = bindings::IORESOURCE_MEM as _;

/// A registration of a PCI driver.
pub type Registration<T> = driver::Registration<Adapter<T>>;

/// An adapter for the registration of PCI drivers.
pub struct Adapter<T: Driver>(T);

impl<T: Driver> driver::DriverOps for Adapter<T> {
    type RegType = bindings::pci_driver;

    unsafe fn register(
        reg: *mut bindings::pci_driver,
        name: &'static CStr,
        module: &'static ThisModule,
    ) -> Result {
        // SAFETY: By the safety requirements of this function (defined in the trait definition),
        // `reg` is non-null and valid.
        let pdrv = unsafe { &mut *reg };

        pdrv.name = name.as_char_ptr();
        pdrv.probe = Some(Self::probe_callback);
        pdrv.remove = Some(Self::remove_callback);
        #[cfg(CONFIG_PM)]
        {
            pdrv.suspend = Some(Self::suspend_callback);
            pdrv.resume = Some(Self::resume_callback);
        }
        if let Some(t) = T::PCI_DEVICE_ID_TABLE {
            pdrv.id_table = t.as_ref();
        }
        // SAFETY:
        //   - `pdrv` lives at least until the call to `pci_unregister_driver()` returns.
        //   - `name` pointer has static lifetime.
        //   - `module.0` lives at least as long as the module.
        //   - `probe()`, `remove()`, `suspend()` and `resume()` are static functions.
        //   - `id_table` is either a raw pointer with static lifetime, as guaranteed by the
        //     [`driver::IdTable`] type, or null.
        to_result(unsafe {
            bindings::__pci_register_driver(reg, module.0, name.as_char_ptr())
        })
    }

    unsafe fn unregister(reg: *mut bindings::pci_driver) {
        // SAFETY: By the safety requirements of this function (defined in the trait definition),
        // `reg` was passed (and updated) by a previous successful call to
        // `__pci_register_driver`.
        unsafe { bindings::pci_unregister_driver(reg) };
    }
}

impl<T: Driver> Adapter<T> {
    /// # Safety
    ///
    /// `id` must be null or point to an entry of `T::PCI_DEVICE_ID_TABLE`.
    unsafe fn get_id_info(id: *const bindings::pci_device_id) -> Option<&'static T::IdInfo> {
        if id.is_null() || T::PCI_DEVICE_ID_TABLE.is_none() {
            return None;
        }

        // SAFETY: `id` is a pointer within the static table, so it's always valid.
        let offset = unsafe { (*id).driver_data };
        if offset == 0 {
            return None;
        }

        // SAFETY: The offset comes from a previous call to `offset_from` in `IdArray::new`, which
        // guarantees that the resulting pointer is within the table.
        let ptr = unsafe {
            id.cast::<u8>()
                .offset(offset as _)
                .cast::<Option<T::IdInfo>>()
        };

        // SAFETY: The id table has a static lifetime, so `ptr` is guaranteed to be valid for read.
        unsafe { (*ptr).as_ref() }
    }

    extern "C" fn probe_callback(
        pdev: *mut bindings::pci_dev,
        id: *const bindings::pci_device_id,
    ) -> core::ffi::c_int {
        from_result(|| {
            // SAFETY: `pdev` is valid by the contract with the C code. `dev` takes its own
            // reference, so it stays valid for as long as the driver keeps it.
            let mut dev = unsafe { Device::from_ptr(pdev) };
            // SAFETY: The PCI core passes the table entry that matched, taken from the table we
            // registered.
            let info = unsafe { Self::get_id_info(id) };
            let data = T::probe(&mut dev, info)?;
            // SAFETY: `pdev` is guaranteed to be a valid, non-null pointer.
            unsafe { bindings::pci_set_drvdata(pdev, data.into_foreign() as _) };
            Ok(0)
        })
    }

    extern "C" fn remove_callback(pdev: *mut bindings::pci_dev) {
        // SAFETY: `pdev` is guaranteed to be a valid, non-null pointer.
        let ptr = unsafe { bindings::pci_get_drvdata(pdev) };
        // SAFETY:
        //   - we allocated this pointer using `T::Data::into_foreign`,
        //     so it is safe to turn back into a `T::Data`.
        //   - the allocation happened in `probe`, no-one freed the memory,
        //     `remove` is the canonical kernel location to free driver data. so OK
        //     to convert the pointer back to a Rust structure here.
        let data = unsafe { T::Data::from_foreign(ptr) };
        T::remove(data);
    }

    #[cfg(CONFIG_PM)]
    extern "C" fn suspend_callback(
        pdev: *mut bindings::pci_dev,
        state: bindings::pm_message_t,
    ) -> core::ffi::c_int {
        from_result(|| {
            // SAFETY: `pdev` is guaranteed to be a valid, non-null pointer.
            let ptr = unsafe { bindings::pci_get_drvdata(pdev) };
            // SAFETY: The driver data was set by a successful `probe` and is only released by
            // `remove`, which the PCI core never runs concurrently with `suspend`.
            let data = unsafe { T::Data::borrow(ptr) };
            T::suspend(data, PmMessage(state.event))?;
            Ok(0)
        })
    }

    #[cfg(CONFIG_PM)]
    extern "C" fn resume_callback(pdev: *mut bindings::pci_dev) -> core::ffi::c_int {
        from_result(|| {
            // SAFETY: `pdev` is guaranteed to be a valid, non-null pointer.
            let ptr = unsafe { bindings::pci_get_drvdata(pdev) };
            // SAFETY: Same as in `suspend_callback`.
            let data = unsafe { T::Data::borrow(ptr) };
            T::resume(data)?;
            Ok(0)
        })
    }
}

/// The power transition a device is suspended for, as in `pm_message_t`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PmMessage(i32);

impl PmMessage {
    /// Raw `PM_EVENT_*` value.
    pub fn event(&self) -> i32 {
        self.0
    }
}

/// A PCI driver.
pub trait Driver {
    /// Data stored on device by driver.
    ///
    /// Corresponds to the data set or retrieved via the kernel's
    /// `pci_{set,get}_drvdata()` functions.
    type Data: ForeignOwnable + Send + Sync = ();

    /// The type holding information about each device id supported by the driver.
    type IdInfo: 'static = ();

    /// The table of device ids supported by the driver.
    const PCI_DEVICE_ID_TABLE: Option<driver::IdTable<'static, DeviceId, Self::IdInfo>> = None;

    /// PCI driver probe.
    ///
    /// Called when a device matching the id table is added or discovered.
    /// Implementers should attempt to initialize the device here.
    fn probe(dev: &mut Device, id_info: Option<&Self::IdInfo>) -> Result<Self::Data>;

    /// PCI driver remove.
    ///
    /// Called when a PCI device is removed. The driver data is handed back and dropped once this
    /// returns.
    fn remove(_data: Self::Data) {}

    /// Legacy PCI power management suspend.
    fn suspend(_data: <Self::Data as ForeignOwnable>::Borrowed<'_>, _state: PmMessage) -> Result {
        Ok(())
    }

    /// Legacy PCI power management resume.
    fn resume(_data: <Self::Data as ForeignOwnable>::Borrowed<'_>) -> Result {
        Ok(())
    }
}

/// A PCI device id.
#[derive(Clone, Copy)]
pub struct DeviceId {
    vendor: u32,
    device: u32,
}

impl DeviceId {
    /// A device id matching `vendor` and `device`, whatever the subsystem.
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self {
            vendor: vendor as u32,
            device: device as u32,
        }
    }

    #[doc(hidden)]
    pub const fn to_rawid(&self, offset: isize) -> <Self as RawDeviceId>::RawType {
        let mut id = Self::ZERO;
        id.vendor = self.vendor;
        id.device = self.device;
        id.subvendor = bindings::PCI_ANY_ID as _;
        id.subdevice = bindings::PCI_ANY_ID as _;
        id.driver_data = offset as _;
        id
    }
}

// SAFETY: `ZERO` is all zeroed-out and `to_rawid` stores `offset` in `pci_device_id::driver_data`.
unsafe impl RawDeviceId for DeviceId {
    type RawType = bindings::pci_device_id;
    const ZERO: Self::RawType = bindings::pci_device_id {
        vendor: 0,
        device: 0,
        subvendor: 0,
        subdevice: 0,
        class: 0,
        class_mask: 0,
        driver_data: 0,
        override_only: 0,
    };
}

/// Defines a const PCI device id table that also carries per-entry data/context/info.
///
/// # Example
///
/// ```
/// # use kernel::{define_pci_id_table, module_pci_id_table, driver_pci_id_table};
/// use kernel::pci;
///
/// define_pci_id_table! {MY_ID_TABLE, u32, [
///     (pci::DeviceId::new(0x1814, 0x3298), Some(0xff)),
///     (pci::DeviceId::new(0x1814, 0x3290), None),
/// ]};
///
/// module_pci_id_table!(MOD_TABLE, MY_ID_TABLE);
///
/// // Within the `Driver` implementation:
/// driver_pci_id_table!(MY_ID_TABLE);
/// ```
#[macro_export]
macro_rules! define_pci_id_table {
    ($name:ident, $data_type:ty, $($t:tt)*) => {
        $crate::define_id_array!($name, $crate::pci::DeviceId, $data_type, $($t)*);
    };
}

/// Convenience macro to declare which device ID table to use for a PCI driver.
#[macro_export]
macro_rules! driver_pci_id_table {
    ($name:expr) => {
        $crate::driver_id_table!(
            PCI_DEVICE_ID_TABLE,
            $crate::pci::DeviceId,
            Self::IdInfo,
            $name
        );
    };
}

/// Declare a device ID table as a module-level table. This creates the necessary module alias
/// entries to enable module autoloading.
#[macro_export]
macro_rules! module_pci_id_table {
    ($item_name:ident, $table_name:ident) => {
        $crate::module_id_table!($item_name, "pci", $crate::pci::DeviceId, $table_name);
    };
}

/// A PCI device.
///
/// Holds a reference on the underlying `struct pci_dev`.
///
/// # Invariants
///
/// The field `ptr` is non-null and valid, and a reference on it is owned by the object.
pub struct Device {
    ptr: *mut bindings::pci_dev,
}

impl Device {
    /// Creates a new device from the given pointer, taking a reference on it.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and valid.
    unsafe fn from_ptr(ptr: *mut bindings::pci_dev) -> Self {
        // SAFETY: By the safety requirements of the function `ptr` is valid.
        unsafe { bindings::pci_dev_get(ptr) };
        // INVARIANT: The reference taken above is released on drop.
        Self { ptr }
    }

    /// Returns the vendor id.
    pub fn vendor_id(&self) -> u16 {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { (*self.ptr).vendor }
    }

    /// Returns the device id.
    pub fn device_id(&self) -> u16 {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { (*self.ptr).device }
    }

    /// Wakes the device up and enables its I/O and memory resources.
    pub fn enable_device(&mut self) -> Result {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        to_result(unsafe { bindings::pci_enable_device(self.ptr) })
    }

    /// Undoes [`Device::enable_device`].
    pub fn disable_device(&mut self) {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { bindings::pci_disable_device(self.ptr) };
    }

    fn resource(&self, bar: usize) -> Option<&bindings::resource> {
        if bar >= STD_NUM_BARS {
            return None;
        }
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid, and
        // `bar` is within the standard BARs.
        Some(unsafe { &(*self.ptr).resource[bar] })
    }

    /// Returns the `IORESOURCE_*` flags of `bar`, or zero for a BAR that does not exist.
    pub fn resource_flags(&self, bar: usize) -> u64 {
        self.resource(bar).map_or(0, |r| r.flags as _)
    }

    /// Returns the length of `bar` in bytes, zero when it is not implemented.
    pub fn resource_len(&self, bar: usize) -> u64 {
        match self.resource(bar) {
            Some(r) if r.end != 0 => (r.end - r.start + 1) as _,
            _ => 0,
        }
    }

    /// Reserves all BARs of the device for the driver called `name`.
    pub fn request_regions(&mut self, name: &'static CStr) -> Result {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid. `name`
        // has static lifetime, so it outlives the reservation.
        to_result(unsafe { bindings::pci_request_regions(self.ptr, name.as_char_ptr()) })
    }

    /// Undoes [`Device::request_regions`].
    pub fn release_regions(&mut self) {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { bindings::pci_release_regions(self.ptr) };
    }

    /// Maps the whole of `bar`.
    pub fn iomap(&mut self, bar: usize) -> Result<Bar> {
        let maxsize = self.resource_len(bar) as usize;
        if maxsize == 0 {
            return Err(ENODEV);
        }
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid. A
        // `maxlen` of zero maps the whole BAR.
        let ptr = unsafe { bindings::pci_iomap(self.ptr, bar as _, 0) };
        if ptr.is_null() {
            return Err(ENOMEM);
        }
        // INVARIANT: `ptr` maps `maxsize` bytes, and the device reference is released on drop.
        Ok(Bar {
            pdev: self.clone(),
            ptr,
            maxsize,
        })
    }
}

impl Clone for Device {
    fn clone(&self) -> Self {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { Self::from_ptr(self.ptr) }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        // SAFETY: By the type invariants, we own a reference on `self.ptr`.
        unsafe { bindings::pci_dev_put(self.ptr) };
    }
}

// SAFETY: The device returned by `raw_device` is the raw PCI device.
unsafe impl device::RawDevice for Device {
    fn raw_device(&self) -> *mut bindings::device {
        // SAFETY: By the type invariants, we know that `self.ptr` is non-null and valid.
        unsafe { &mut (*self.ptr).dev }
    }
}

// SAFETY: `Device` only holds a reference-counted pointer, and the PCI core functions it calls
// may be called from any thread.
unsafe impl Send for Device {}

// SAFETY: No method taking `&self` mutates the device.
unsafe impl Sync for Device {}

/// A mapped PCI BAR.
///
/// Accesses are bounds-checked against the size of the BAR.
///
/// # Invariants
///
/// `ptr` is a cookie returned by `pci_iomap` for `pdev`, mapping `maxsize` bytes, and it is
/// unmapped on drop.
pub struct Bar {
    pdev: Device,
    ptr: *mut c_void,
    maxsize: usize,
}

impl Bar {
    /// Length of the mapping in bytes.
    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    fn check_offset(&self, offset: usize, size: usize) -> Result {
        let end = offset.checked_add(size).ok_or(EINVAL)?;
        if offset % size != 0 || end > self.maxsize {
            return Err(EINVAL);
        }
        Ok(())
    }

    /// Reads the 32-bit register at `offset`.
    pub fn try_readl(&self, offset: usize) -> Result<u32> {
        self.check_offset(offset, 4)?;
        // SAFETY: By the type invariants `ptr` maps `maxsize` bytes, and the offset was checked
        // to be within them.
        Ok(unsafe { bindings::ioread32(self.ptr.add(offset)) })
    }

    /// Writes `value` to the 32-bit register at `offset`.
    pub fn try_writel(&self, value: u32, offset: usize) -> Result {
        self.check_offset(offset, 4)?;
        // SAFETY: By the type invariants `ptr` maps `maxsize` bytes, and the offset was checked
        // to be within them.
        unsafe { bindings::iowrite32(value, self.ptr.add(offset)) };
        Ok(())
    }

    /// Orders all previous writes before any later I/O access.
    pub fn wmb(&self) {
        // SAFETY: A write barrier has no preconditions.
        unsafe { bindings::wmb() };
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        // SAFETY: By the type invariants `ptr` came from `pci_iomap` on `pdev`, which is still
        // referenced.
        unsafe { bindings::pci_iounmap(self.pdev.ptr, self.ptr) };
    }
}

// SAFETY: MMIO accessors may be called from any thread.
unsafe impl Send for Bar {}

// SAFETY: Every method taking `&self` is an MMIO access, which the hardware serializes.
unsafe impl Sync for Bar {}

/// Declares a kernel module that exposes a single PCI driver.
///
/// # Examples
///
/// ```ignore
/// # use kernel::{pci, define_pci_id_table, module_pci_driver};
/// #
/// struct MyDriver;
/// impl pci::Driver for MyDriver {
///     // [...]
/// #   fn probe(_dev: &mut pci::Device, _id_info: Option<&Self::IdInfo>) -> Result {
/// #       Ok(())
/// #   }
/// #   define_pci_id_table! {(), [
/// #       (pci::DeviceId::new(0x1814, 0x3298), None),
/// #   ]}
/// }
///
/// module_pci_driver! {
///     type: MyDriver,
///     name: "module_name",
///     author: "Author name",
///     license: "GPL",
/// }
/// ```
#[macro_export]
macro_rules! module_pci_driver {
    ($($f:tt)*) => {
        $crate::module_driver!(<T>, $crate::pci::Adapter<T>, { $($f)* });
    };
}
