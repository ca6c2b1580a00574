//! Simulated UART-Lite register block
//!
//! [`SimRegisters`] behaves like the hardware as seen through the four
//! registers:
//!
//! - RX reads pop the receive FIFO (0 when empty), TX writes push the transmit
//!   FIFO (dropped when full)
//! - STATUS is computed from the FIFO fill levels, the interrupt enable and
//!   the latched error bits
//! - CONTROL reset bits clear the addressed FIFO and the latched errors; the
//!   enable bit follows the last written value
//!
//! Nothing drains TX or fills RX on its own. Tests play the part of the serial
//! line with [`SimRegisters::push_rx`], [`SimRegisters::shift_out`] and
//! [`SimRegisters::transmit_to`]. Every access is counted and CONTROL writes
//! are logged, so tests can check the exact access pattern.

use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::{Deque, Vec};
use spin::Mutex;

use crate::access::RegisterAccess;
use crate::regs::{Control, LineErrors, Register, Status, DATA_MASK, FIFO_DEPTH};

/// Number of CONTROL writes kept in the log
pub const CONTROL_LOG_DEPTH: usize = 64;

/// First address handed out by [`SimRegisters::new`]
const SIM_BASE: usize = 0x4060_0000;

static NEXT_SIM_BASE: AtomicUsize = AtomicUsize::new(SIM_BASE);

struct SimState {
    rx: Deque<u8, FIFO_DEPTH>,
    tx: Deque<u8, FIFO_DEPTH>,
    errors: LineErrors,
    intr_enabled: bool,
    floating: Option<u32>,
    control_log: Vec<u32, CONTROL_LOG_DEPTH>,
    reads: [usize; 4],
    writes: [usize; 4],
}

impl SimState {
    const fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Deque::new(),
            errors: LineErrors::empty(),
            intr_enabled: false,
            floating: None,
            control_log: Vec::new(),
            reads: [0; 4],
            writes: [0; 4],
        }
    }

    fn status(&self) -> Status {
        let mut status = Status::from_bits_retain(self.errors.bits());
        status.set(Status::RX_NOT_EMPTY, !self.rx.is_empty());
        status.set(Status::RX_FULL, self.rx.is_full());
        status.set(Status::TX_EMPTY, self.tx.is_empty());
        status.set(Status::TX_FULL, self.tx.is_full());
        status.set(Status::INTR_ENABLED, self.intr_enabled);
        status
    }

    fn control(&mut self, control: Control) {
        // A full log keeps its oldest entries.
        let _ = self.control_log.push(control.bits());
        if control.contains(Control::RESET_TX_FIFO) {
            self.tx.clear();
        }
        if control.contains(Control::RESET_RX_FIFO) {
            self.rx.clear();
        }
        if control.intersects(Control::RESET_FIFOS) {
            self.errors = LineErrors::empty();
        }
        self.intr_enabled = control.contains(Control::ENABLE_INTR);
    }

    /// One byte arriving on the line.
    fn receive_byte(&mut self, byte: u8) -> bool {
        if self.rx.push_back(byte).is_err() {
            self.errors |= LineErrors::OVERRUN;
            return false;
        }
        true
    }
}

/// Software double of a UART-Lite register block
pub struct SimRegisters {
    base: usize,
    state: Mutex<SimState>,
}

impl SimRegisters {
    /// A simulated device at a fresh, unique address.
    pub fn new() -> Self {
        let base = NEXT_SIM_BASE.fetch_add(0x1000, Ordering::Relaxed);
        Self::at(base)
    }

    /// A simulated device at `base`.
    pub const fn at(base: usize) -> Self {
        Self {
            base,
            state: Mutex::new(SimState::new()),
        }
    }

    /// A block where nothing answers: every read returns `value`.
    pub fn floating(value: u32) -> Self {
        let sim = Self::new();
        sim.state.lock().floating = Some(value);
        sim
    }

    // ========================================================================
    // Line Side
    // ========================================================================

    /// Deliver bytes into the RX FIFO. Bytes that do not fit are lost and
    /// latch an overrun error. Returns the number stored.
    pub fn push_rx(&self, bytes: &[u8]) -> usize {
        let mut state = self.state.lock();
        let mut stored = 0;
        for &byte in bytes {
            if state.receive_byte(byte) {
                stored += 1;
            }
        }
        stored
    }

    /// Shift out everything queued in the TX FIFO, in order.
    pub fn shift_out(&self) -> Vec<u8, FIFO_DEPTH> {
        let mut state = self.state.lock();
        let mut out = Vec::new();
        while let Some(byte) = state.tx.pop_front() {
            // Capacities match, so this never fails.
            let _ = out.push(byte);
        }
        out
    }

    /// Carry this device's TX FIFO onto `peer`'s RX line. Returns the
    /// number of bytes that reached the peer's FIFO.
    pub fn transmit_to(&self, peer: &SimRegisters) -> usize {
        let bytes = self.shift_out();
        peer.push_rx(&bytes)
    }

    /// Latch line errors as the receiver would.
    pub fn inject_errors(&self, errors: LineErrors) {
        self.state.lock().errors |= errors;
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// STATUS as the driver would read it, without counting an access.
    pub fn peek_status(&self) -> Status {
        self.state.lock().status()
    }

    pub fn rx_len(&self) -> usize {
        self.state.lock().rx.len()
    }

    pub fn tx_len(&self) -> usize {
        self.state.lock().tx.len()
    }

    /// CONTROL values written so far, oldest first.
    pub fn control_writes(&self) -> Vec<u32, CONTROL_LOG_DEPTH> {
        self.state.lock().control_log.clone()
    }

    pub fn clear_control_writes(&self) {
        self.state.lock().control_log.clear();
    }

    /// Number of reads issued to `reg`.
    pub fn reads(&self, reg: Register) -> usize {
        self.state.lock().reads[reg.index()]
    }

    /// Number of writes issued to `reg`.
    pub fn writes(&self, reg: Register) -> usize {
        self.state.lock().writes[reg.index()]
    }
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAccess for SimRegisters {
    fn base_address(&self) -> usize {
        self.base
    }

    fn read(&self, reg: Register) -> u32 {
        let mut state = self.state.lock();
        state.reads[reg.index()] += 1;
        if let Some(value) = state.floating {
            return value;
        }
        match reg {
            Register::Rx => state.rx.pop_front().map_or(0, u32::from),
            Register::Status => state.status().bits(),
            // Write-only registers read as zero.
            Register::Tx | Register::Control => 0,
        }
    }

    fn write(&self, reg: Register, value: u32) {
        let mut state = self.state.lock();
        state.writes[reg.index()] += 1;
        if state.floating.is_some() {
            return;
        }
        match reg {
            Register::Tx => {
                // Full FIFO ignores the write.
                let _ = state.tx.push_back((value & DATA_MASK) as u8);
            }
            Register::Control => state.control(Control::from_bits_retain(value)),
            Register::Rx | Register::Status => {}
        }
    }
}
