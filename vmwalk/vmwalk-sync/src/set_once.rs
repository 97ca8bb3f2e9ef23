use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const SET: u8 = 2;

/// A cell whose value is written at most once and read-only afterwards.
///
/// Intended for platform facts resolved during startup: whichever context
/// gets there first stores the value, every later reader sees exactly that
/// value. Losers of a racing [`SetOnce::get_or_set`] spin briefly until the
/// winner's write is published; there is no blocking.
pub struct SetOnce<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> SetOnce<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// The stored value, or `None` while nothing has been published yet.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == SET {
            // SAFETY: SET is stored only after the value write completed.
            Some(unsafe { self.value_ref() })
        } else {
            None
        }
    }

    /// Store `init()` unless a value exists already; return the winner.
    ///
    /// `init` runs only in the context that wins the write race.
    pub fn get_or_set(&self, init: impl FnOnce() -> T) -> &T {
        if let Some(v) = self.get() {
            return v;
        }

        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            unsafe {
                (*self.value.get()).write(init());
            }
            // publish the value before flipping the state
            self.state.store(SET, Ordering::Release);
            // SAFETY: we just completed the write.
            return unsafe { self.value_ref() };
        }

        // Another context is mid-write; its critical section is two stores.
        while self.state.load(Ordering::Acquire) != SET {
            spin_loop();
        }
        // SAFETY: SET observed.
        unsafe { self.value_ref() }
    }

    /// # Safety
    /// The state must have been observed as `SET` (with acquire ordering)
    /// so the value write is visible.
    unsafe fn value_ref(&self) -> &T {
        unsafe { (*self.value.get()).assume_init_ref() }
    }
}

impl<T> Default for SetOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for SetOnce<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == SET {
            // SAFETY: value was written and nobody can access it anymore.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

// Safety: reads are shared only after the single write is published.
unsafe impl<T: Sync> Sync for SetOnce<T> {}
unsafe impl<T: Send> Send for SetOnce<T> {}
