//! Alarm notification from interrupt context.
//!
//! The DS3231 pulls its INT/SQW pin low when an enabled alarm fires. The pin
//! interrupt handler calls [`AlarmSignal::notify`]; the main loop hands the
//! signal to [`crate::DS3231::service_alarms`], which consumes it.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-writer, single-reader "an alarm fired" flag.
///
/// Place it in a `static` shared by the interrupt handler and the main loop.
#[derive(Debug, Default)]
pub struct AlarmSignal(AtomicBool);

impl AlarmSignal {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Marks an alarm as pending. Safe to call from an interrupt handler.
    pub fn notify(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns whether an alarm was pending and clears it.
    ///
    /// Load and store are separate so this also builds for targets without
    /// atomic swap. A notification landing between the two is dropped, but
    /// its trigger flag is still latched and seen by the status read in
    /// `service_alarms`.
    pub fn take(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}
