//! # Synchronization primitives for table walkers
//!
//! Spin-based building blocks for contexts that must never sleep: a
//! test-and-test-and-set [`SpinLock`] guarding walk-plus-mutate sections,
//! and a [`SetOnce`] cell for values resolved exactly once at startup.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod set_once;
mod spin_lock;

pub use set_once::SetOnce;
pub use spin_lock::{SpinLock, SpinLockGuard};
