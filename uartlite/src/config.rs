//! Driver configuration

use crate::regs::{Control, REGISTER_OFFSET};

/// Which execution contexts may touch the device
///
/// The mode is fixed for the lifetime of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// Foreground polling only; device interrupts stay disabled.
    Polled,
    /// Interrupt service only; polled send/receive are rejected.
    InterruptDriven,
    /// Both paths; polled accesses mask the device interrupt while they run.
    #[default]
    Shared,
}

impl TransferMode {
    /// Whether the device should raise interrupts in this mode.
    pub const fn interrupts_enabled(self) -> bool {
        !matches!(self, TransferMode::Polled)
    }

    pub const fn allows_polling(self) -> bool {
        !matches!(self, TransferMode::InterruptDriven)
    }

    pub const fn allows_interrupts(self) -> bool {
        !matches!(self, TransferMode::Polled)
    }

    /// CONTROL value written after a FIFO reset.
    pub const fn idle_control(self) -> Control {
        if self.interrupts_enabled() {
            Control::ENABLE_INTR
        } else {
            Control::empty()
        }
    }
}

/// Initialization options for a UART-Lite device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Access discipline between foreground and interrupt context
    pub mode: TransferMode,
    /// Offset of the register block from the base address
    pub register_offset: usize,
    /// Read STATUS back after reset and fail if no device responds
    pub verify_presence: bool,
}

impl UartConfig {
    pub const fn new() -> Self {
        Self {
            mode: TransferMode::Shared,
            register_offset: REGISTER_OFFSET,
            verify_presence: true,
        }
    }

    pub const fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn with_register_offset(mut self, offset: usize) -> Self {
        self.register_offset = offset;
        self
    }

    pub const fn with_presence_check(mut self, verify: bool) -> Self {
        self.verify_presence = verify;
        self
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new()
    }
}
