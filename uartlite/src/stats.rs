//! Per-device transfer statistics

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::regs::LineErrors;

/// Snapshot of a device's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UartStats {
    /// Bytes pushed into the TX FIFO
    pub bytes_sent: usize,
    /// Bytes popped from the RX FIFO and handed to the caller
    pub bytes_received: usize,
    /// FIFO reset sequences issued
    pub resets: usize,
    /// Overrun errors observed
    pub overrun_errors: usize,
    /// Frame errors observed
    pub frame_errors: usize,
    /// Parity errors observed
    pub parity_errors: usize,
    /// Drains cut short by a full caller buffer
    pub rx_truncations: usize,
    /// Operations refused because the other context held the device
    pub busy_rejections: usize,
}

impl UartStats {
    pub fn line_errors(&self) -> usize {
        self.overrun_errors + self.frame_errors + self.parity_errors
    }
}

/// Lock-free counters, safe to bump from interrupt context
pub(crate) struct Counters {
    bytes_sent: AtomicUsize,
    bytes_received: AtomicUsize,
    resets: AtomicUsize,
    overrun_errors: AtomicUsize,
    frame_errors: AtomicUsize,
    parity_errors: AtomicUsize,
    rx_truncations: AtomicUsize,
    busy_rejections: AtomicUsize,
}

impl Counters {
    pub(crate) const fn new() -> Self {
        Self {
            bytes_sent: AtomicUsize::new(0),
            bytes_received: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            overrun_errors: AtomicUsize::new(0),
            frame_errors: AtomicUsize::new(0),
            parity_errors: AtomicUsize::new(0),
            rx_truncations: AtomicUsize::new(0),
            busy_rejections: AtomicUsize::new(0),
        }
    }

    pub(crate) fn add_sent(&self, n: usize) {
        self.bytes_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_received(&self, n: usize) {
        self.bytes_received.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_line_errors(&self, errors: LineErrors) {
        if errors.contains(LineErrors::OVERRUN) {
            self.overrun_errors.fetch_add(1, Ordering::Relaxed);
        }
        if errors.contains(LineErrors::FRAME) {
            self.frame_errors.fetch_add(1, Ordering::Relaxed);
        }
        if errors.contains(LineErrors::PARITY) {
            self.parity_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_truncation(&self) {
        self.rx_truncations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_busy(&self) {
        self.busy_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> UartStats {
        UartStats {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            overrun_errors: self.overrun_errors.load(Ordering::Relaxed),
            frame_errors: self.frame_errors.load(Ordering::Relaxed),
            parity_errors: self.parity_errors.load(Ordering::Relaxed),
            rx_truncations: self.rx_truncations.load(Ordering::Relaxed),
            busy_rejections: self.busy_rejections.load(Ordering::Relaxed),
        }
    }
}
