//! Memory-backed register window.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use alloc::vec::Vec;

use crate::error::{to_error, Errno, Result};
use crate::io::RegisterIo;

/// A register window backed by plain memory, standing in for a mapped BAR.
///
/// Every write and barrier is counted so tests can check access patterns.
pub struct SimWindow {
    words: Vec<AtomicU32>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    barriers: AtomicUsize,
    /// Writes not yet followed by a barrier.
    unflushed: AtomicUsize,
}

impl SimWindow {
    /// Creates a zero-filled window of `len` bytes, rounded down to whole words.
    pub fn new(len: usize) -> Self {
        Self {
            words: (0..len / 4).map(|_| AtomicU32::new(0)).collect(),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            barriers: AtomicUsize::new(0),
            unflushed: AtomicUsize::new(0),
        }
    }

    fn word(&self, offset: usize) -> Result<&AtomicU32> {
        if offset % 4 != 0 {
            return to_error(Errno::InvalidArgs);
        }
        match self.words.get(offset / 4) {
            Some(word) => Ok(word),
            None => to_error(Errno::Io),
        }
    }

    /// Reads a register without counting it as a device access.
    pub fn peek(&self, offset: usize) -> Option<u32> {
        self.word(offset).ok().map(|w| w.load(Ordering::SeqCst))
    }

    /// Sets a register without counting it as a device access.
    pub fn poke(&self, offset: usize, value: u32) -> bool {
        match self.word(offset) {
            Ok(w) => {
                w.store(value, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }

    /// Number of register reads issued through [`RegisterIo`].
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of register writes issued through [`RegisterIo`].
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of write barriers issued through [`RegisterIo`].
    pub fn barriers(&self) -> usize {
        self.barriers.load(Ordering::SeqCst)
    }

    /// Whether every write so far has been followed by a barrier.
    pub fn is_flushed(&self) -> bool {
        self.unflushed.load(Ordering::SeqCst) == 0
    }
}

impl RegisterIo for SimWindow {
    fn len(&self) -> usize {
        self.words.len() * 4
    }

    fn try_read32(&self, offset: usize) -> Result<u32> {
        let word = self.word(offset)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(word.load(Ordering::SeqCst))
    }

    fn try_write32(&self, value: u32, offset: usize) -> Result<()> {
        let word = self.word(offset)?;
        word.store(value, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.unflushed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wmb(&self) {
        self.barriers.fetch_add(1, Ordering::SeqCst);
        self.unflushed.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rounds_down_to_words() {
        let w = SimWindow::new(0x3c6);
        assert_eq!(w.len(), 0x3c4);
        assert!(w.covers(0x3c0));
        assert!(!w.covers(0x3c4));
    }

    #[test]
    fn out_of_range_access_is_an_io_error() {
        let w = SimWindow::new(16);
        assert_eq!(w.try_read32(16), Err(Errno::Io));
        assert_eq!(w.try_write32(1, 64), Err(Errno::Io));
        assert_eq!(w.writes(), 0);
    }

    #[test]
    fn unaligned_access_is_rejected() {
        let w = SimWindow::new(16);
        assert_eq!(w.try_read32(2), Err(Errno::InvalidArgs));
        assert!(!w.covers(2));
    }

    #[test]
    fn barrier_flushes_pending_writes() {
        let w = SimWindow::new(16);
        w.try_write32(0xdead_beef, 4).unwrap();
        assert!(!w.is_flushed());
        w.wmb();
        assert!(w.is_flushed());
        assert_eq!(w.peek(4), Some(0xdead_beef));
        assert_eq!((w.writes(), w.barriers()), (1, 1));
    }
}
