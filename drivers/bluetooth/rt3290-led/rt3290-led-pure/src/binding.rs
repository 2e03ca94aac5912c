// SPDX-License-Identifier: GPL-2.0

//! Binding of the driver to one RT3290 Bluetooth function.
//!
//! Probe acquires, in order: the private state block, the enabled device,
//! the PCI regions, the BAR 0 mapping and the LED class device. A
//! [`Binding`] records what it holds and gives it back in reverse order when
//! dropped, so a failed probe leaves nothing behind and remove runs once.

use osl::driver::led::LedClassdevInfo;
use osl::error::{to_error, Errno, Error, Result};
use osl::io::RegisterIo;
use osl::sync::{try_new_arc, Arc};

use crate::bus::{LedClass, PciFunction, PciId};
use crate::power::GpioPower;
use crate::regs::BT_FUN_CTRL;
use crate::{CSR_BAR, DRV_NAME, PCI_IDS};

/// Whether the driver holds the device.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    /// Nothing is acquired.
    Unbound,
    /// The register window is mapped and the LED is registered.
    Bound,
}

/// The driver's hold on one bound device.
pub struct Binding<D>
where
    D: PciFunction + LedClass<<D as PciFunction>::Window>,
{
    dev: D,
    enabled: bool,
    regions: bool,
    power: Option<Arc<GpioPower<D::Window>>>,
    led: Option<<D as LedClass<D::Window>>::Registration>,
}

/// Whether `id` is in the match table.
pub fn matches(id: PciId) -> bool {
    PCI_IDS.contains(&id)
}

fn no_device() -> Error {
    Error::from(Errno::NoSuchDevice)
}

impl<D> Binding<D>
where
    D: PciFunction + LedClass<<D as PciFunction>::Window>,
{
    /// Binds to `dev` and registers the LED described by `info`.
    ///
    /// Every failure releases what this call acquired before returning.
    pub fn probe(dev: D, info: &LedClassdevInfo) -> Result<Self> {
        log_info!("rtbt_pci_probe {}", dev.id());

        let mut this = Self {
            dev,
            enabled: false,
            regions: false,
            power: None,
            led: None,
        };
        // On error `this` is dropped here, which unwinds the partial bind.
        this.bind(info)?;
        Ok(this)
    }

    fn bind(&mut self, info: &LedClassdevInfo) -> Result<()> {
        let id = self.dev.id();
        if !matches(id) {
            log_err!("{}: device {} is not supported", DRV_NAME, id);
            return to_error(Errno::NoSuchDevice);
        }
        info.validate()?;

        let power = GpioPower::detached().and_then(try_new_arc).map_err(|e| {
            log_err!("{}: failed allocate resource for register data", DRV_NAME);
            e
        })?;
        self.power = Some(power.clone());

        self.dev.enable_device().map_err(|e| {
            log_err!("Error enabling pci device: {:?}", e);
            no_device()
        })?;
        self.enabled = true;

        if !self.dev.bar_is_mem(CSR_BAR) {
            log_err!("{}: BAR {} is not a memory region", DRV_NAME, CSR_BAR);
            return to_error(Errno::NoSuchDevice);
        }

        self.dev.request_regions(DRV_NAME).map_err(|e| {
            log_err!("{}: pci_request_regions() failed: {:?}", DRV_NAME, e);
            no_device()
        })?;
        self.regions = true;

        let window = self.dev.iomap(CSR_BAR).map_err(|e| {
            log_err!("{}: failed to map BAR {}: {:?}", DRV_NAME, CSR_BAR, e);
            no_device()
        })?;
        if !window.covers(BT_FUN_CTRL) {
            log_err!(
                "{}: BAR {} is {:#x} bytes, too small for function control",
                DRV_NAME,
                CSR_BAR,
                window.len()
            );
            self.dev.iounmap(window);
            return to_error(Errno::NoSuchDevice);
        }
        power.attach(window);

        let led = self.dev.register_led(info, power).map_err(|e| {
            log_err!("{}: Register led CLASS failed: {:?}", DRV_NAME, e);
            no_device()
        })?;
        self.led = Some(led);
        Ok(())
    }

    /// Unbinds from the device, releasing everything probe acquired.
    pub fn remove(self) {
        log_info!("rtbt_pci_remove {}", self.dev.id());
        drop(self);
    }

    /// Power management suspend. The radio keeps its power state, so there
    /// is nothing to save.
    pub fn suspend(&self) -> Result<()> {
        log_debug!("{}: suspend", DRV_NAME);
        Ok(())
    }

    /// Power management resume. Nothing was saved, so nothing is restored.
    pub fn resume(&self) -> Result<()> {
        log_debug!("{}: resume", DRV_NAME);
        Ok(())
    }

    /// Current state of the binding.
    pub fn state(&self) -> State {
        match (&self.led, &self.power) {
            (Some(_), Some(power)) if power.is_attached() => State::Bound,
            _ => State::Unbound,
        }
    }

    /// The power controller shared with the LED class.
    pub fn power(&self) -> Option<&Arc<GpioPower<D::Window>>> {
        self.power.as_ref()
    }

    fn unbind(&mut self) {
        // The LED class stops calling into `power` once this returns.
        drop(self.led.take());
        if let Some(window) = self.power.take().and_then(|power| power.detach()) {
            self.dev.iounmap(window);
        }
        if core::mem::take(&mut self.regions) {
            self.dev.release_regions();
        }
        if core::mem::take(&mut self.enabled) {
            self.dev.disable_device();
        }
    }
}

impl<D> Drop for Binding<D>
where
    D: PciFunction + LedClass<<D as PciFunction>::Window>,
{
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led_info;
    use crate::testing::{all_released, events, Event, FakePci, Step};
    use osl::driver::led::{Brightness, LedClassdevInfo};

    fn probe(pci: FakePci) -> Result<Binding<FakePci>> {
        Binding::probe(pci, &led_info().unwrap())
    }

    #[test]
    fn probe_binds_rt3290() {
        let pci = FakePci::rt3290();
        let log = pci.events.clone();
        let binding = probe(pci).unwrap();

        assert_eq!(binding.state(), State::Bound);
        assert_eq!(
            events(&log),
            [
                Event::Enable,
                Event::RequestRegions,
                Event::Map,
                Event::RegisterLed
            ]
        );
    }

    #[test]
    fn probe_registers_rtbt_example_led() {
        let binding = probe(FakePci::rt3290()).unwrap();

        assert_eq!(binding.dev.region_owner, Some("rtbt_example"));
        let info = binding.dev.led_info.as_ref().unwrap();
        assert_eq!(info.name(), "rtbt_example");
        assert_eq!(info.brightness(), Brightness::OFF);
        assert_eq!(info.max_brightness().level(), 255);
    }

    #[test]
    fn probe_ignores_other_devices() {
        let pci = FakePci {
            id: PciId::new(0x10ec, 0x8168),
            ..FakePci::rt3290()
        };
        let log = pci.events.clone();

        assert_eq!(probe(pci).err(), Some(Errno::NoSuchDevice));
        assert!(events(&log).is_empty());
    }

    #[test]
    fn probe_rejects_bad_led_description() {
        let pci = FakePci::rt3290();
        let log = pci.events.clone();
        let mut builder = LedClassdevInfo::new_builder("");
        builder.max_brightness(Brightness::FULL);
        let info = builder.build().unwrap();

        assert_eq!(
            Binding::probe(pci, &info).err(),
            Some(Errno::InvalidArgs)
        );
        assert!(events(&log).is_empty());
    }

    #[test]
    fn failed_led_registration_releases_everything() {
        let pci = FakePci::refusing(Step::Led);
        let log = pci.events.clone();

        assert_eq!(probe(pci).err(), Some(Errno::NoSuchDevice));
        assert_eq!(
            events(&log),
            [
                Event::Enable,
                Event::RequestRegions,
                Event::Map,
                Event::Unmap,
                Event::ReleaseRegions,
                Event::Disable
            ]
        );
    }

    #[test]
    fn every_probe_failure_is_rolled_back() {
        for step in [
            Step::Enable,
            Step::BarType,
            Step::Regions,
            Step::Map,
            Step::Led,
        ] {
            let pci = FakePci::refusing(step);
            let log = pci.events.clone();

            assert_eq!(probe(pci).err(), Some(Errno::NoSuchDevice), "{step:?}");
            assert!(all_released(&events(&log)), "{step:?}: {:?}", events(&log));
        }
    }

    #[test]
    fn probe_rejects_bar_without_function_control() {
        let pci = FakePci {
            regs: std::sync::Arc::new(osl::io::SimWindow::new(BT_FUN_CTRL)),
            ..FakePci::rt3290()
        };
        let log = pci.events.clone();

        assert_eq!(probe(pci).err(), Some(Errno::NoSuchDevice));
        let log = events(&log);
        assert!(log.contains(&Event::Unmap));
        assert!(all_released(&log));
    }

    #[test]
    fn remove_releases_in_reverse_order_once() {
        let pci = FakePci::rt3290();
        let log = pci.events.clone();
        let binding = probe(pci).unwrap();
        let private = Arc::downgrade(binding.power().unwrap());

        binding.remove();

        assert_eq!(
            events(&log)[4..],
            [
                Event::UnregisterLed,
                Event::Unmap,
                Event::ReleaseRegions,
                Event::Disable
            ]
        );
        assert!(all_released(&events(&log)));
        assert!(private.upgrade().is_none());
    }

    #[test]
    fn led_requests_reach_function_control() {
        let pci = FakePci::rt3290();
        let regs = pci.regs.clone();
        let binding = probe(pci).unwrap();
        let led = &binding.led.as_ref().unwrap().power;
        assert!(Arc::ptr_eq(led, binding.power().unwrap()));

        led.set_brightness(Brightness::new(128));
        assert_eq!(regs.peek(BT_FUN_CTRL), Some(0x0001_0000));

        regs.poke(BT_FUN_CTRL, 0xffff_ffff);
        led.set_brightness(Brightness::OFF);
        assert_eq!(regs.peek(BT_FUN_CTRL), Some(0xfffe_ffff));
        assert!(regs.is_flushed());
    }

    #[test]
    fn late_led_request_after_remove_is_ignored() {
        let pci = FakePci::rt3290();
        let regs = pci.regs.clone();
        let binding = probe(pci).unwrap();
        let power = binding.power().unwrap().clone();

        binding.remove();
        power.set_brightness(Brightness::FULL);

        assert_eq!(regs.writes(), 0);
        assert_eq!(regs.peek(BT_FUN_CTRL), Some(0));
    }

    #[test]
    fn suspend_and_resume_leave_the_radio_alone() {
        let pci = FakePci::rt3290();
        let regs = pci.regs.clone();
        let binding = probe(pci).unwrap();
        binding.power().unwrap().set(true);
        let writes = regs.writes();

        assert_eq!(binding.suspend(), Ok(()));
        assert_eq!(binding.resume(), Ok(()));
        assert_eq!(regs.writes(), writes);
        assert_eq!(binding.power().unwrap().is_powered(), Some(true));
    }
}
