// SPDX-License-Identifier: GPL-2.0

//! GPIO1 power control through the function-control register.

use osl::driver::led::Brightness;
use osl::error::Result;
use osl::io::RegisterIo;
use osl::sync::SpinLock;

use crate::regs::{self, BT_FUN_CTRL};

/// Drives the GPIO line powering the Bluetooth radio.
///
/// The register window is held under a lock for every read-modify-write, so
/// concurrent brightness requests cannot interleave and the window cannot be
/// unmapped under a request. While detached every request is ignored.
///
/// The LED class may call in from atomic context, so the lock is an
/// interrupt-safe [`SpinLock`] and nothing here sleeps.
pub struct GpioPower<W: RegisterIo> {
    window: SpinLock<Option<W>>,
}

impl<W: RegisterIo> GpioPower<W> {
    /// Creates a controller with no window attached yet.
    pub fn detached() -> Result<Self> {
        Ok(Self {
            window: SpinLock::try_new(None)?,
        })
    }

    /// Creates a controller driving `window`.
    pub fn new(window: W) -> Result<Self> {
        Ok(Self {
            window: SpinLock::try_new(Some(window))?,
        })
    }

    /// Starts driving `window`, returning the window it replaces, if any.
    pub fn attach(&self, window: W) -> Option<W> {
        self.window.lock().replace(window)
    }

    /// Stops driving the window and hands it back for unmapping.
    pub fn detach(&self) -> Option<W> {
        self.window.lock().take()
    }

    /// Whether a window is attached.
    pub fn is_attached(&self) -> bool {
        self.window.lock().is_some()
    }

    /// Powers the radio on or off.
    ///
    /// There is nobody to report a failure to, so register access errors are
    /// only logged.
    pub fn set(&self, on: bool) {
        let window = self.window.lock();
        let Some(bar) = window.as_ref() else {
            log_debug!("power {} ignored, no register window", on_off(on));
            return;
        };
        if let Err(e) = Self::update(bar, on) {
            log_err!("failed to switch power {}: {:?}", on_off(on), e);
        }
    }

    /// Maps an LED brightness request onto the power line.
    ///
    /// Any level other than [`Brightness::OFF`] powers the radio.
    pub fn set_brightness(&self, level: Brightness) {
        self.set(!level.is_off());
    }

    /// Current state of the power line, or `None` while detached.
    pub fn is_powered(&self) -> Option<bool> {
        let window = self.window.lock();
        let bar = window.as_ref()?;
        match bar.try_read32(BT_FUN_CTRL) {
            Ok(value) => Some(regs::is_powered(value)),
            Err(e) => {
                log_err!("failed to read function control: {:?}", e);
                None
            }
        }
    }

    /// Brightness reported back to the LED class.
    pub fn brightness(&self, max: Brightness) -> Brightness {
        match self.is_powered() {
            Some(true) => max,
            _ => Brightness::OFF,
        }
    }

    fn update(bar: &W, on: bool) -> Result<()> {
        let value = bar.try_read32(BT_FUN_CTRL)?;
        let value = if on {
            regs::power_on(value)
        } else {
            regs::power_off(value)
        };
        bar.try_write32(value, BT_FUN_CTRL)?;
        bar.wmb();
        Ok(())
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osl::io::SimWindow;

    fn power_with(value: u32) -> GpioPower<SimWindow> {
        let bar = SimWindow::new(0x1000);
        assert!(bar.poke(BT_FUN_CTRL, value));
        GpioPower::new(bar).unwrap()
    }

    fn fun_ctrl(power: &GpioPower<SimWindow>) -> u32 {
        let window = power.window.lock();
        window.as_ref().and_then(|w| w.peek(BT_FUN_CTRL)).unwrap()
    }

    #[test]
    fn off_clears_bit_16_only() {
        let power = power_with(0xffff_ffff);
        power.set_brightness(Brightness::OFF);
        assert_eq!(fun_ctrl(&power), 0xfffe_ffff);
    }

    #[test]
    fn any_level_turns_power_on() {
        let power = power_with(0);
        power.set_brightness(Brightness::new(128));
        assert_eq!(fun_ctrl(&power), 0x0001_0000);
        assert_eq!(power.is_powered(), Some(true));
        assert_eq!(power.brightness(Brightness::FULL), Brightness::FULL);
    }

    #[test]
    fn off_is_idempotent() {
        let power = power_with(0x0301_0055);
        power.set_brightness(Brightness::OFF);
        let once = fun_ctrl(&power);
        power.set_brightness(Brightness::OFF);
        assert_eq!(fun_ctrl(&power), once);
        assert_eq!(once, 0x0300_0055);
    }

    #[test]
    fn every_write_is_read_first_and_flushed() {
        let power = power_with(0);
        power.set(true);
        power.set(false);
        let window = power.window.lock();
        let bar = window.as_ref().unwrap();
        assert_eq!((bar.reads(), bar.writes(), bar.barriers()), (2, 2, 2));
        assert!(bar.is_flushed());
    }

    #[test]
    fn detached_controller_ignores_requests() {
        let power = power_with(0);
        let bar = power.detach().unwrap();
        power.set(true);
        assert_eq!(power.is_powered(), None);
        assert_eq!(power.brightness(Brightness::FULL), Brightness::OFF);
        assert_eq!(bar.writes(), 0);
        assert_eq!(bar.peek(BT_FUN_CTRL), Some(0));
    }

    #[test]
    fn window_too_small_for_register_is_left_alone() {
        let bar = SimWindow::new(BT_FUN_CTRL);
        let power = GpioPower::new(bar).unwrap();
        power.set(true);
        let bar = power.detach().unwrap();
        assert_eq!(bar.writes(), 0);
        assert!(bar.is_flushed());
    }

    #[test]
    fn concurrent_requests_do_not_interleave() {
        let power = std::sync::Arc::new(power_with(0x0100_0000));
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let power = power.clone();
                std::thread::spawn(move || {
                    for n in 0..500 {
                        power.set((i + n) % 2 == 0);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let window = power.window.lock();
        let bar = window.as_ref().unwrap();
        assert_eq!((bar.reads(), bar.writes(), bar.barriers()), (2000, 2000, 2000));
        assert!(bar.is_flushed());
        let value = bar.peek(BT_FUN_CTRL).unwrap();
        assert_eq!(value & !regs::FunCtrl::GPIO1_DOUT.bits(), 0);
    }

    #[test]
    fn attach_replaces_window() {
        let power = GpioPower::detached().unwrap();
        assert!(!power.is_attached());
        assert!(power.attach(SimWindow::new(0x1000)).is_none());
        assert!(power.is_attached());
        assert!(power.attach(SimWindow::new(0x1000)).is_some());
    }
}
