// SPDX-License-Identifier: GPL-2.0

//! Adapter driver for the Bluetooth power LED of the Ralink RT3290.
//!
//! Binds the pure driver in `../rt3290-led-pure` to the kernel PCI and LED
//! class subsystems.
//!
//! How to use:
//! / # insmod rt3290_led.ko
//! / # echo 1 > /sys/class/leds/rtbt_example/brightness   -> radio powered
//! / # echo 0 > /sys/class/leds/rtbt_example/brightness   -> radio off
//!

#![no_std]

use kernel::prelude::*;
use kernel::{
    define_pci_id_table, driver_pci_id_table, leds, module_pci_id_table, pci,
    str::CStr,
    sync::{Arc, ArcBorrow},
};

use osl::driver::led::{Brightness, LedClassdevInfo};
use rt3290_led_pure::{
    led_info, Binding, GpioPower, LedClass, PciFunction, PciId, DRV_NAME, DRV_NAME_NUL,
    PCI_DEVICE_ID_RT3290_BT, PCI_VENDOR_ID_RALINK,
};

module! {
    type: Rt3290LedModule,
    name: "rt3290_led",
    author: "Rust for Linux Contributors",
    description: "RT3290 Bluetooth power control through the LED class",
    license: "GPL",
}

/// `DRV_NAME` for the PCI core, which keeps the pointer for as long as the
/// driver and its regions are registered.
const DRV_NAME_C: &CStr = match CStr::from_bytes_with_nul(DRV_NAME_NUL) {
    Ok(name) => name,
    Err(_) => panic!("driver name is not a C string"),
};

/// The PCI function as seen by the pure driver.
struct Rt3290Pci {
    dev: pci::Device,
}

impl PciFunction for Rt3290Pci {
    type Window = pci::Bar;

    fn id(&self) -> PciId {
        PciId::new(self.dev.vendor_id(), self.dev.device_id())
    }

    fn enable_device(&mut self) -> Result {
        self.dev.enable_device()
    }

    fn disable_device(&mut self) {
        self.dev.disable_device()
    }

    fn bar_is_mem(&self, bar: usize) -> bool {
        self.dev.resource_flags(bar) & pci::IORESOURCE_MEM != 0
    }

    fn request_regions(&mut self, name: &'static str) -> Result {
        // Only `DRV_NAME` has a C string that outlives the reservation.
        if name != DRV_NAME {
            pr_err!("cannot reserve regions for {}\n", name);
            return Err(EINVAL);
        }
        self.dev.request_regions(DRV_NAME_C)
    }

    fn release_regions(&mut self) {
        self.dev.release_regions()
    }

    fn iomap(&mut self, bar: usize) -> Result<pci::Bar> {
        self.dev.iomap(bar)
    }

    fn iounmap(&mut self, window: pci::Bar) {
        drop(window);
    }
}

impl LedClass<pci::Bar> for Rt3290Pci {
    type Registration = leds::Registration<PowerLed>;

    fn register_led(
        &mut self,
        info: &LedClassdevInfo,
        power: Arc<GpioPower<pci::Bar>>,
    ) -> Result<Self::Registration> {
        leds::Registration::try_new(
            &self.dev,
            fmt!("{}", info.name()),
            info.brightness().level(),
            info.max_brightness().level(),
            power,
        )
    }
}

/// LED class callbacks, forwarded to the power controller.
struct PowerLed;

#[vtable]
impl leds::Operations for PowerLed {
    type Data = Arc<GpioPower<pci::Bar>>;

    fn brightness_set(power: ArcBorrow<'_, GpioPower<pci::Bar>>, brightness: u32) {
        power.set_brightness(Brightness::new(brightness));
    }

    fn brightness_get(power: ArcBorrow<'_, GpioPower<pci::Bar>>) -> u32 {
        power.brightness(Brightness::new(leds::LED_FULL)).level()
    }
}

struct Rt3290Led;

define_pci_id_table! {RT_PCI_TBL, (), [
    (pci::DeviceId::new(PCI_VENDOR_ID_RALINK, PCI_DEVICE_ID_RT3290_BT), None),
]}

module_pci_id_table!(MOD_TABLE, RT_PCI_TBL);

impl pci::Driver for Rt3290Led {
    type Data = Box<Binding<Rt3290Pci>>;

    driver_pci_id_table!(RT_PCI_TBL);

    fn probe(dev: &mut pci::Device, _id_info: Option<&Self::IdInfo>) -> Result<Self::Data> {
        let info = led_info()?;
        let binding = Binding::probe(Rt3290Pci { dev: dev.clone() }, &info)?;
        // If this fails, dropping `binding` releases the device again.
        Ok(Box::try_new(binding)?)
    }

    fn remove(data: Self::Data) {
        (*data).remove();
    }

    fn suspend(data: &Binding<Rt3290Pci>, state: pci::PmMessage) -> Result {
        pr_debug!("{}: PM event {:#x}\n", DRV_NAME, state.event());
        data.suspend()
    }

    fn resume(data: &Binding<Rt3290Pci>) -> Result {
        data.resume()
    }
}

struct Rt3290LedModule {
    _driver: Pin<Box<pci::Registration<Rt3290Led>>>,
}

impl kernel::Module for Rt3290LedModule {
    fn init(module: &'static ThisModule) -> Result<Self> {
        let driver = pci::Registration::new_pinned(DRV_NAME_C, module);
        pr_info!(
            "register_driver [{}]: {}\n",
            DRV_NAME,
            driver.as_ref().map_or_else(|e| e.to_errno(), |_| 0)
        );

        Ok(Rt3290LedModule { _driver: driver? })
    }
}

impl Drop for Rt3290LedModule {
    fn drop(&mut self) {
        pr_info!("{} exit\n", DRV_NAME);
    }
}
