//! UART-Lite - Driver for a minimal memory-mapped FIFO UART
//!
//! This crate drives the "UART-Lite" class of serial peripheral: one receive
//! FIFO, one transmit FIFO, one status register and one control register, with
//! no line-configuration registers. It offers polled transfer for foreground
//! code and an interrupt service routine for the platform's IRQ dispatch.
//!
//! # Architecture
//!
//! The crate is organized into several small modules:
//!
//! - **Regs**: Register layout, status/control bit definitions
//! - **Access**: The `RegisterAccess` boundary and its MMIO implementation
//! - **Config**: Transfer mode and initialization options
//! - **Sync**: Exclusive-access token and the device claim registry
//! - **Uart**: The device handle with all driver operations
//! - **Stats**: Per-device transfer and line-error counters
//! - **Sim**: Simulated register block for host-side tests (feature `sim`)
//!
//! # Usage
//!
//! ```rust
//! use uartlite::{SimRegisters, UartConfig, UartLite};
//!
//! let sim = SimRegisters::new();
//! let uart = UartLite::from_registers(&sim, UartConfig::default()).unwrap();
//!
//! assert_eq!(uart.send(b"hello").unwrap(), 5);
//! assert_eq!(&sim.shift_out()[..], b"hello");
//! ```
//!
//! On hardware the handle is built once from the mapped base address and
//! shared with the interrupt handler, for example through a `spin::Once`:
//!
//! ```rust,ignore
//! static UART: spin::Once<UartLite<MmioRegisters>> = spin::Once::new();
//!
//! let uart = unsafe { uartlite::initialize(0x4060_0000)? };
//! UART.call_once(|| uart);
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod access;
pub mod config;
pub mod error;
pub mod regs;
pub mod stats;
pub mod sync;
pub mod uart;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export commonly used types
pub use crate::access::{MmioRegisters, RegisterAccess};
pub use crate::config::{TransferMode, UartConfig};
pub use crate::error::{Result, UartError};
pub use crate::regs::{Control, LineErrors, Register, Status, FIFO_DEPTH, REGISTER_OFFSET};
pub use crate::stats::UartStats;
pub use crate::uart::{initialize, initialize_with_config, ReceiveReport, ServiceReport, UartLite};

#[cfg(any(test, feature = "sim"))]
pub use crate::sim::SimRegisters;
