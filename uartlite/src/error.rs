//! Error handling module for the UART-Lite driver

use core::fmt;

use crate::config::TransferMode;

/// Common error type used throughout the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// Base address is null or the register block address overflows
    InvalidAddress(usize),
    /// Register block address is not word aligned
    Misaligned(usize),
    /// Another live handle already owns this register block
    AlreadyClaimed(usize),
    /// The claim registry has no free slot
    TooManyDevices,
    /// Presence check failed after reset; carries the STATUS value read back
    NotPresent { status: u32 },
    /// Operation not permitted in the configured transfer mode
    WrongMode {
        mode: TransferMode,
        operation: &'static str,
    },
    /// The device is in use by the other execution context
    Busy,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::InvalidAddress(addr) => write!(f, "Invalid base address: {:#x}", addr),
            UartError::Misaligned(addr) => write!(f, "Misaligned register block: {:#x}", addr),
            UartError::AlreadyClaimed(addr) => write!(f, "Device at {:#x} already has a handle", addr),
            UartError::TooManyDevices => write!(f, "Too many UART-Lite devices"),
            UartError::NotPresent { status } => {
                write!(f, "No responding device (status {:#04x})", status)
            }
            UartError::WrongMode { mode, operation } => {
                write!(f, "{} not permitted in {:?} mode", operation, mode)
            }
            UartError::Busy => write!(f, "Device busy"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UartError {}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, UartError>;
