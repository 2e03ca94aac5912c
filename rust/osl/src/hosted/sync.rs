use crate::error::Result;

pub use alloc::sync::Arc;

/// Allocates `value` behind a reference count.
///
/// The global allocator aborts on exhaustion, so this never fails on a host.
pub fn try_new_arc<T>(value: T) -> Result<Arc<T>> {
    Ok(Arc::new(value))
}

/// Guard returned by [`SpinLock::lock`].
pub type SpinLockGuard<'a, T> = spin::MutexGuard<'a, T>;

/// A busy-waiting lock. There are no interrupts to mask on a host.
pub struct SpinLock<T> {
    inner: spin::Mutex<T>,
}

impl<T> SpinLock<T> {
    /// Creates a lock protecting `data`.
    pub fn try_new(data: T) -> Result<Self> {
        Ok(Self {
            inner: spin::Mutex::new(data),
        })
    }

    /// Acquires the lock, spinning until it is free.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let lock = SpinLock::try_new(1u32).unwrap();
        *lock.lock() += 1;
        let guard = lock.lock();
        assert_eq!(*guard, 2);
        drop(guard);
        assert!(lock.inner.try_lock().is_some());
    }
}
