// src/interrupt.rs
//! Ctrl-C / SIGTERM turned into a flag the scrolling loop polls between ticks.
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn install() {
    #[cfg(unix)]
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe {
        for signum in [libc::SIGINT, libc::SIGTERM] {
            libc::signal(
                signum,
                on_signal as *const fn(libc::c_int) as libc::size_t,
            );
        }
    }
}

#[cfg(unix)]
unsafe extern "C" fn on_signal(_signal_number: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
