//! Linux register access, backed by a mapped PCI BAR.

use kernel::pci::Bar;

use crate::error::Result;
use crate::io::RegisterIo;

impl RegisterIo for Bar {
    fn len(&self) -> usize {
        self.maxsize()
    }

    fn try_read32(&self, offset: usize) -> Result<u32> {
        self.try_readl(offset)
    }

    fn try_write32(&self, value: u32, offset: usize) -> Result<()> {
        self.try_writel(value, offset)
    }

    fn wmb(&self) {
        Bar::wmb(self)
    }
}
