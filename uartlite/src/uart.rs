//! UART-Lite device handle
//!
//! [`UartLite`] is the single handle for one physical device. It provides:
//!
//! - Status predicates (live STATUS reads, no locking)
//! - FIFO reset and presence-checked initialization
//! - Polled send/receive for foreground code
//! - The interrupt service routine for the platform's IRQ dispatch
//!
//! # Access discipline
//!
//! Every operation that touches a FIFO takes the device's access token first
//! and fails with [`UartError::Busy`] if the other context holds it. In
//! [`TransferMode::Shared`] every foreground access (send, receive, reset)
//! also masks the device interrupt for its duration, so the ISR is not
//! dispatched on the same CPU while the foreground owns the FIFOs.

use crate::access::{MmioRegisters, RegisterAccess};
use crate::config::{TransferMode, UartConfig};
use crate::error::{Result, UartError};
use crate::regs::{Control, LineErrors, Register, Status, DATA_MASK, FIFO_DEPTH};
use crate::stats::{Counters, UartStats};
use crate::sync::{self, AccessToken};

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the UART-Lite at `base_address` with the default configuration
///
/// # Safety
/// `base_address` must be the mapped address of a UART-Lite device, see
/// [`MmioRegisters::new`].
pub unsafe fn initialize(base_address: usize) -> Result<UartLite<MmioRegisters>> {
    unsafe { initialize_with_config(base_address, UartConfig::default()) }
}

/// Initialize the UART-Lite at `base_address`
///
/// # Safety
/// `base_address + config.register_offset` must be the mapped address of a
/// UART-Lite register block, see [`MmioRegisters::new`].
pub unsafe fn initialize_with_config(
    base_address: usize,
    config: UartConfig,
) -> Result<UartLite<MmioRegisters>> {
    let regs = unsafe { MmioRegisters::with_offset(base_address, config.register_offset)? };
    UartLite::from_registers(regs, config)
}

// ============================================================================
// Device Handle
// ============================================================================

/// Result of one interrupt service invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceReport {
    /// Bytes stored at the front of the input buffer
    pub received: usize,
    /// Bytes taken from the front of the output buffer
    pub sent: usize,
    /// The input buffer filled up while the RX FIFO still held data
    pub rx_truncated: bool,
    /// Line errors that forced a reset; RX data was discarded
    pub line_errors: LineErrors,
}

/// Result of one polled receive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveReport {
    /// Bytes stored at the front of the caller's buffer
    pub received: usize,
    /// The buffer filled up while the RX FIFO still held data
    pub truncated: bool,
    /// Line errors that forced a reset; RX data was discarded
    pub line_errors: LineErrors,
}

/// Handle for one UART-Lite device
pub struct UartLite<R: RegisterAccess> {
    regs: R,
    config: UartConfig,
    base: usize,
    token: AccessToken,
    counters: Counters,
}

/// Held while an operation owns the FIFOs
struct AccessGuard<'a, R: RegisterAccess> {
    uart: &'a UartLite<R>,
    masked: bool,
}

impl<R: RegisterAccess> Drop for AccessGuard<'_, R> {
    fn drop(&mut self) {
        // Release before unmasking so a pending interrupt finds the token free.
        self.uart.token.release();
        if self.masked {
            self.uart.write_control(self.uart.config.mode.idle_control());
        }
    }
}

impl<R: RegisterAccess> UartLite<R> {
    /// Bring up a device behind `regs`
    ///
    /// Claims the register block, resets both FIFOs, sets the interrupt
    /// enable according to the transfer mode and, unless disabled in
    /// `config`, verifies that a device answers. The address reported by
    /// `regs` is trusted; [`MmioRegisters`] validates it on construction.
    pub fn from_registers(regs: R, config: UartConfig) -> Result<Self> {
        let base = regs.base_address();
        sync::claim(base)?;

        // From here on dropping `uart` releases the claim.
        let uart = Self {
            regs,
            config,
            base,
            token: AccessToken::new(),
            counters: Counters::new(),
        };

        uart.reset_fifos(false);
        if config.verify_presence {
            if let Err(err) = uart.check_presence() {
                // Nobody will service interrupts for a device without a handle.
                uart.write_control(Control::empty());
                return Err(err);
            }
        }

        log::info!("UART-Lite {:#x}: initialized, mode={:?}", base, config.mode);
        Ok(uart)
    }

    fn check_presence(&self) -> Result<()> {
        let status = self.status();
        let intr_expected = self.config.mode.interrupts_enabled();
        let responding = status.is_tx_empty()
            && !status.is_tx_full()
            && status.contains(Status::INTR_ENABLED) == intr_expected;
        if !responding {
            log::warn!(
                "UART-Lite {:#x}: no device responding, status={:#04x}",
                self.base,
                status.bits()
            );
            return Err(UartError::NotPresent { status: status.bits() });
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn mode(&self) -> TransferMode {
        self.config.mode
    }

    /// Address of the register block.
    pub fn base_address(&self) -> usize {
        self.base
    }

    /// The register access backend.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn stats(&self) -> UartStats {
        self.counters.snapshot()
    }

    // ========================================================================
    // Status Predicates
    // ========================================================================

    /// Read STATUS.
    #[inline]
    pub fn status(&self) -> Status {
        Status::from_bits_retain(self.regs.read(Register::Status))
    }

    #[inline]
    pub fn is_tx_empty(&self) -> bool {
        self.status().is_tx_empty()
    }

    #[inline]
    pub fn is_tx_full(&self) -> bool {
        self.status().is_tx_full()
    }

    /// True when the RX FIFO holds no valid data.
    #[inline]
    pub fn is_rx_empty(&self) -> bool {
        self.status().is_rx_empty()
    }

    #[inline]
    pub fn is_rx_full(&self) -> bool {
        self.status().is_rx_full()
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Reset both FIFOs and restore the interrupt enable for the mode
    ///
    /// Issues the same CONTROL writes every time, so repeated calls leave the
    /// device in the same state. In [`TransferMode::Shared`] the interrupt is
    /// masked for the duration like any other foreground access.
    pub fn reset(&self) -> Result<()> {
        let guard = self.lock(self.config.mode == TransferMode::Shared)?;
        self.reset_fifos(guard.masked);
        log::debug!("UART-Lite {:#x}: reset", self.base);
        Ok(())
    }

    #[inline]
    fn write_control(&self, control: Control) {
        self.regs.write(Register::Control, control.bits());
    }

    /// With `masked` the interrupt enable stays off after the reset.
    fn reset_fifos(&self, masked: bool) {
        self.write_control(Control::RESET_FIFOS);
        if masked {
            self.write_control(Control::empty());
        } else {
            self.write_control(self.config.mode.idle_control());
        }
        self.counters.record_reset();
    }

    /// Error -> reset -> Normal. Whatever remained in RX is dropped.
    fn recover(&self, errors: LineErrors, masked: bool) {
        log::warn!(
            "UART-Lite {:#x}: line errors {:?}, resetting FIFOs",
            self.base,
            errors
        );
        self.counters.record_line_errors(errors);
        self.reset_fifos(masked);
    }

    // ========================================================================
    // Access Discipline
    // ========================================================================

    /// Take the access token, masking the device interrupt first if asked.
    fn lock(&self, mask: bool) -> Result<AccessGuard<'_, R>> {
        if mask {
            self.write_control(Control::empty());
        }
        if !self.token.try_acquire() {
            if mask {
                self.write_control(self.config.mode.idle_control());
            }
            self.counters.record_busy();
            log::debug!("UART-Lite {:#x}: busy", self.base);
            return Err(UartError::Busy);
        }
        Ok(AccessGuard { uart: self, masked: mask })
    }

    fn lock_polled(&self, operation: &'static str) -> Result<AccessGuard<'_, R>> {
        let mode = self.config.mode;
        if !mode.allows_polling() {
            return Err(UartError::WrongMode { mode, operation });
        }
        self.lock(mode == TransferMode::Shared)
    }

    // ========================================================================
    // Polled Transfer
    // ========================================================================

    /// Queue up to [`FIFO_DEPTH`] bytes of `data` for transmission
    ///
    /// Does nothing and returns 0 unless the TX FIFO is empty. Bytes beyond
    /// the FIFO depth are left for the next call.
    pub fn send(&self, data: &[u8]) -> Result<usize> {
        let _guard = self.lock_polled("send")?;
        if !self.is_tx_empty() {
            return Ok(0);
        }

        let chunk = &data[..data.len().min(FIFO_DEPTH)];
        for &byte in chunk {
            self.regs.write(Register::Tx, u32::from(byte));
        }

        self.counters.add_sent(chunk.len());
        log::trace!("UART-Lite {:#x}: sent {} bytes", self.base, chunk.len());
        Ok(chunk.len())
    }

    /// Drain the RX FIFO into `buf`
    ///
    /// If STATUS shows a latched overrun, frame or parity error, the FIFOs are
    /// reset, pending RX data is discarded and the report carries the error
    /// bits with nothing received. If `buf` fills up while the FIFO still
    /// holds data, `truncated` is set; the bytes stored are valid and the rest
    /// stays in the FIFO.
    pub fn receive(&self, buf: &mut [u8]) -> Result<ReceiveReport> {
        let guard = self.lock_polled("receive")?;
        let mut report = ReceiveReport::default();

        let errors = self.status().line_errors();
        if !errors.is_empty() {
            self.recover(errors, guard.masked);
            report.line_errors = errors;
            return Ok(report);
        }

        let (received, truncated) = self.drain_rx(buf);
        self.record_drain(received, truncated);
        log::trace!("UART-Lite {:#x}: received {} bytes", self.base, received);
        report.received = received;
        report.truncated = truncated;
        Ok(report)
    }

    fn record_drain(&self, received: usize, truncated: bool) {
        self.counters.add_received(received);
        if truncated {
            self.counters.record_truncation();
            log::warn!(
                "UART-Lite {:#x}: receive buffer full after {} bytes",
                self.base,
                received
            );
        }
    }

    /// Pop RX into `buf` until RX is empty, `buf` is full or a FIFO's worth
    /// has been read. Returns the count and whether `buf` ran out first.
    fn drain_rx(&self, buf: &mut [u8]) -> (usize, bool) {
        let mut count = 0;
        for slot in buf.iter_mut().take(FIFO_DEPTH) {
            if self.is_rx_empty() {
                return (count, false);
            }
            *slot = (self.regs.read(Register::Rx) & DATA_MASK) as u8;
            count += 1;
        }
        let truncated = count == buf.len() && !self.is_rx_empty();
        (count, truncated)
    }

    // ========================================================================
    // Interrupt Service
    // ========================================================================

    /// Service an RX-not-empty and/or TX-empty interrupt
    ///
    /// Must only be called from the platform's interrupt handler for this
    /// device. Received bytes are stored at the front of `input`; bytes are
    /// taken from the front of `output` until TX reports full or `output` is
    /// exhausted. The report tells the caller how far to advance both cursors.
    pub fn interrupt_service(&self, input: &mut [u8], output: &[u8]) -> Result<ServiceReport> {
        let mode = self.config.mode;
        if !mode.allows_interrupts() {
            return Err(UartError::WrongMode {
                mode,
                operation: "interrupt_service",
            });
        }
        let _guard = self.lock(false)?;

        let status = self.status();
        let mut report = ServiceReport::default();

        let errors = status.line_errors();
        let recovered = !errors.is_empty();
        if recovered {
            self.recover(errors, false);
            report.line_errors = errors;
        } else if !status.is_rx_empty() {
            let (received, truncated) = self.drain_rx(input);
            self.record_drain(received, truncated);
            report.received = received;
            report.rx_truncated = truncated;
        }

        // A reset also empties TX.
        if status.is_tx_empty() || recovered {
            for &byte in output.iter().take(FIFO_DEPTH) {
                if self.is_tx_full() {
                    break;
                }
                self.regs.write(Register::Tx, u32::from(byte));
                report.sent += 1;
            }
            self.counters.add_sent(report.sent);
        }

        log::trace!(
            "UART-Lite {:#x}: irq rx={} tx={}",
            self.base,
            report.received,
            report.sent
        );
        Ok(report)
    }
}

impl<R: RegisterAccess> Drop for UartLite<R> {
    fn drop(&mut self) {
        sync::release(self.base);
    }
}
