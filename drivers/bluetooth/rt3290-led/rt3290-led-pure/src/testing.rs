// SPDX-License-Identifier: GPL-2.0

//! In-memory PCI function and LED class for the unit tests.

use std::sync::{Arc, Mutex};

use osl::driver::led::LedClassdevInfo;
use osl::error::{to_error, Errno, Result};
use osl::io::{RegisterIo, SimWindow};

use crate::bus::{LedClass, PciFunction, PciId};
use crate::power::GpioPower;
use crate::{PCI_DEVICE_ID_RT3290_BT, PCI_VENDOR_ID_RALINK};

/// Something the driver did to the fake device.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Event {
    Enable,
    Disable,
    RequestRegions,
    ReleaseRegions,
    Map,
    Unmap,
    RegisterLed,
    UnregisterLed,
}

/// A probe step the fake device can be told to refuse.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Step {
    Enable,
    BarType,
    Regions,
    Map,
    Led,
}

pub(crate) type Events = Arc<Mutex<Vec<Event>>>;

/// A mapping of the fake BAR. Every mapping shares the same registers.
pub(crate) struct FakeWindow(Arc<SimWindow>);

impl RegisterIo for FakeWindow {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn try_read32(&self, offset: usize) -> Result<u32> {
        self.0.try_read32(offset)
    }

    fn try_write32(&self, value: u32, offset: usize) -> Result<()> {
        self.0.try_write32(value, offset)
    }

    fn wmb(&self) {
        self.0.wmb()
    }
}

pub(crate) struct FakePci {
    pub(crate) id: PciId,
    pub(crate) refuse: Option<Step>,
    pub(crate) regs: Arc<SimWindow>,
    pub(crate) events: Events,
    /// Owner name the regions were reserved under.
    pub(crate) region_owner: Option<&'static str>,
    /// Description of the LED last registered.
    pub(crate) led_info: Option<LedClassdevInfo>,
}

impl FakePci {
    /// An RT3290 Bluetooth function with a 64 KiB BAR 0.
    pub(crate) fn rt3290() -> Self {
        Self {
            id: PciId::new(PCI_VENDOR_ID_RALINK, PCI_DEVICE_ID_RT3290_BT),
            refuse: None,
            regs: Arc::new(SimWindow::new(0x10000)),
            events: Events::default(),
            region_owner: None,
            led_info: None,
        }
    }

    pub(crate) fn refusing(step: Step) -> Self {
        Self {
            refuse: Some(step),
            ..Self::rt3290()
        }
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn check(&self, step: Step, errno: Errno) -> Result<()> {
        if self.refuse == Some(step) {
            return to_error(errno);
        }
        Ok(())
    }
}

impl PciFunction for FakePci {
    type Window = FakeWindow;

    fn id(&self) -> PciId {
        self.id
    }

    fn enable_device(&mut self) -> Result<()> {
        self.check(Step::Enable, Errno::Io)?;
        self.record(Event::Enable);
        Ok(())
    }

    fn disable_device(&mut self) {
        self.record(Event::Disable);
    }

    fn bar_is_mem(&self, _bar: usize) -> bool {
        self.refuse != Some(Step::BarType)
    }

    fn request_regions(&mut self, name: &'static str) -> Result<()> {
        self.check(Step::Regions, Errno::Busy)?;
        self.record(Event::RequestRegions);
        self.region_owner = Some(name);
        Ok(())
    }

    fn release_regions(&mut self) {
        self.record(Event::ReleaseRegions);
        self.region_owner = None;
    }

    fn iomap(&mut self, _bar: usize) -> Result<FakeWindow> {
        self.check(Step::Map, Errno::NoMemory)?;
        self.record(Event::Map);
        Ok(FakeWindow(self.regs.clone()))
    }

    fn iounmap(&mut self, _window: FakeWindow) {
        self.record(Event::Unmap);
    }
}

/// A registered fake LED. Holds the power controller like the LED class
/// would, until unregistered.
pub(crate) struct FakeLed {
    pub(crate) power: Arc<GpioPower<FakeWindow>>,
    events: Events,
}

impl Drop for FakeLed {
    fn drop(&mut self) {
        self.events.lock().unwrap().push(Event::UnregisterLed);
    }
}

impl LedClass<FakeWindow> for FakePci {
    type Registration = FakeLed;

    fn register_led(
        &mut self,
        info: &LedClassdevInfo,
        power: Arc<GpioPower<FakeWindow>>,
    ) -> Result<FakeLed> {
        self.check(Step::Led, Errno::Busy)?;
        self.record(Event::RegisterLed);
        self.led_info = Some(info.clone());
        Ok(FakeLed {
            power,
            events: self.events.clone(),
        })
    }
}

/// Events recorded so far.
pub(crate) fn events(events: &Events) -> Vec<Event> {
    events.lock().unwrap().clone()
}

/// Whether every acquisition in `events` was matched by its release.
pub(crate) fn all_released(events: &[Event]) -> bool {
    let count = |e: Event| events.iter().filter(|&&x| x == e).count();
    count(Event::Enable) == count(Event::Disable)
        && count(Event::RequestRegions) == count(Event::ReleaseRegions)
        && count(Event::Map) == count(Event::Unmap)
        && count(Event::RegisterLed) == count(Event::UnregisterLed)
}
