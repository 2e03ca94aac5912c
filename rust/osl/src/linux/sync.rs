use crate::error::{Errno, Error, Result};

use alloc::boxed::Box;
use core::ffi::{c_char, c_ulong};
use core::pin::Pin;
use kernel::bindings;
use kernel::init::InPlaceInit;
use kernel::sync::lock::{Backend, Guard, Lock};

pub use kernel::sync::Arc;

/// Allocates `value` behind a kernel reference count.
pub fn try_new_arc<T>(value: T) -> Result<Arc<T>> {
    Arc::try_new(value).map_err(|_| Error::from(Errno::NoMemory))
}

/// A kernel `spinlock_t` taken with interrupts disabled.
///
/// Holders cannot be preempted or interrupted on the local CPU, so the lock
/// can be shared between process context and softirq or hardirq callers.
pub struct IrqSpinLockBackend;

// SAFETY: The underlying kernel `spinlock_t` object ensures mutual exclusion. The saved interrupt
// flags are restored on the CPU that saved them because the guard is not `Send`.
unsafe impl Backend for IrqSpinLockBackend {
    type State = bindings::spinlock_t;
    type GuardState = c_ulong;

    unsafe fn init(
        ptr: *mut Self::State,
        name: *const c_char,
        key: *mut bindings::lock_class_key,
    ) {
        // SAFETY: The safety requirements ensure that `ptr` is valid for writes, and `name` and
        // `key` are valid for read indefinitely.
        unsafe { bindings::__spin_lock_init(ptr, name, key) }
    }

    unsafe fn lock(ptr: *mut Self::State) -> Self::GuardState {
        // SAFETY: The safety requirements of this function ensure that `ptr` points to valid
        // memory, and that it has been initialised before.
        unsafe { bindings::spin_lock_irqsave(ptr) }
    }

    unsafe fn unlock(ptr: *mut Self::State, flags: &Self::GuardState) {
        // SAFETY: The safety requirements of this function ensure that `ptr` is valid and that the
        // caller is the owner of the spinlock, which it locked with `spin_lock_irqsave`.
        unsafe { bindings::spin_unlock_irqrestore(ptr, *flags) }
    }
}

/// Guard returned by [`SpinLock::lock`].
pub type SpinLockGuard<'a, T> = Guard<'a, T, IrqSpinLockBackend>;

/// An interrupt-safe spinlock that needs no pinning by its owner.
pub struct SpinLock<T> {
    inner: Pin<Box<Lock<T, IrqSpinLockBackend>>>,
}

impl<T> SpinLock<T> {
    /// Creates a lock protecting `data`.
    pub fn try_new(data: T) -> Result<Self> {
        let inner = Box::pin_init(Lock::new(
            data,
            kernel::optional_name!("osl::SpinLock"),
            kernel::static_lock_class!(),
        ))?;
        Ok(Self { inner })
    }

    /// Acquires the lock with interrupts disabled on the local CPU.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.inner.lock()
    }
}
