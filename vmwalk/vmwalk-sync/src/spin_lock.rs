use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// A busy-waiting mutual-exclusion lock.
///
/// Acquisition spins; there is no queueing and no sleeping, so the lock is
/// usable from contexts where blocking is forbidden. The flip side is the
/// usual spin-lock contract: critical sections must stay short and must not
/// perform I/O or allocation, since every waiter burns its CPU until the
/// holder releases.
///
/// Release happens when the [`SpinLockGuard`] drops.
pub struct SpinLock<T> {
    /// `true` while some guard is alive.
    locked: AtomicBool,
    inner: UnsafeCell<T>,
}

// Safety: the lock serializes all access to `inner`; only T: Send may move
// between threads through it.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    #[must_use]
    pub const fn new(inner: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
        }
    }

    /// One acquisition attempt; never spins.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        // The guard must only exist on success: its drop releases the lock.
        if self.acquire() {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Spin until the lock is held, then hand out the guard.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        if !self.acquire() {
            self.acquire_contended();
        }
        SpinLockGuard { lock: self }
    }

    /// Run `f` with the lock held.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Direct access through `&mut self`; no other holder can exist.
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    #[inline]
    fn acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Test-and-test-and-set: watch the flag with plain loads and only
    /// retry the CAS once it reads free, keeping the cache line quiet
    /// under contention.
    #[cold]
    fn acquire_contended(&self) {
        loop {
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
            if self.acquire() {
                return;
            }
        }
    }
}

/// RAII scope for a held [`SpinLock`]; releases on drop.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: the guard proves exclusive ownership of the cell.
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, plus `&mut self` forbids aliased borrows.
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Release publishes every write of the critical section.
        self.lock.locked.store(false, Ordering::Release);
    }
}
