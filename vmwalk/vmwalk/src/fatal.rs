//! # Fatal Stop
//!
//! The unrecoverable exit, kept structurally apart from
//! [`WalkError`](crate::WalkError): a walk failure describes the current
//! mapping state and the caller handles it; a fatal stop means a platform
//! assumption this code is built on turned out false, and continuing would
//! corrupt memory through the very tables being walked.

use log::error;

/// Log `why` once, then stop for good.
///
/// Test builds abort the process so the failure surfaces in the harness;
/// freestanding builds park the CPU in a spin loop, leaving the log line
/// as the last trace. Never returns, never unwinds.
///
/// Reserved for impossible states: a conflicting depth re-resolution, a
/// table shape the architecture cannot produce. An ordinary unmapped
/// address is a [`WalkError`](crate::WalkError), never fatal.
pub fn fatal_stop(why: &'static str) -> ! {
    error!("fatal: {why}");

    #[cfg(any(test, doctest))]
    {
        std::process::abort();
    }

    #[cfg(not(any(test, doctest)))]
    loop {
        core::hint::spin_loop();
    }
}
