//! UART-Lite register model
//!
//! Four 32-bit registers in a fixed 16-byte span:
//!
//! | Offset | Name    | Access | Description                    |
//! |--------|---------|--------|--------------------------------|
//! | 0x00   | RX      | R      | Receive FIFO (popping read)    |
//! | 0x04   | TX      | W      | Transmit FIFO (pushing write)  |
//! | 0x08   | STATUS  | R      | FIFO state and latched errors  |
//! | 0x0C   | CONTROL | W      | FIFO resets, interrupt enable  |

use core::mem::{offset_of, size_of};

use static_assertions::const_assert_eq;

// ============================================================================
// Constants
// ============================================================================

/// Depth of both the receive and the transmit FIFO.
pub const FIFO_DEPTH: usize = 16;

/// Offset of the register block from the device base address.
pub const REGISTER_OFFSET: usize = 0x00;

/// Size of the register block in bytes.
pub const REGISTER_SPAN: usize = 0x10;

/// Mask for the meaningful bits of an RX read.
pub const DATA_MASK: u32 = 0xFF;

// ============================================================================
// Register Layout
// ============================================================================

/// UART-Lite registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Receive Data FIFO
    Rx,
    /// Transmit Data FIFO
    Tx,
    /// Status Register
    Status,
    /// Control Register
    Control,
}

impl Register {
    /// All registers in address order.
    pub const ALL: [Register; 4] = [Register::Rx, Register::Tx, Register::Status, Register::Control];

    /// Byte offset of the register within the block.
    pub const fn offset(self) -> usize {
        match self {
            Register::Rx => 0x00,
            Register::Tx => 0x04,
            Register::Status => 0x08,
            Register::Control => 0x0C,
        }
    }

    /// Position of the register in [`Register::ALL`].
    pub const fn index(self) -> usize {
        self.offset() / size_of::<u32>()
    }
}

/// Memory layout of the register block
#[repr(C)]
pub struct RegisterBlock {
    pub rx: u32,
    pub tx: u32,
    pub status: u32,
    pub control: u32,
}

const_assert_eq!(offset_of!(RegisterBlock, rx), Register::Rx.offset());
const_assert_eq!(offset_of!(RegisterBlock, tx), Register::Tx.offset());
const_assert_eq!(offset_of!(RegisterBlock, status), Register::Status.offset());
const_assert_eq!(offset_of!(RegisterBlock, control), Register::Control.offset());
const_assert_eq!(size_of::<RegisterBlock>(), REGISTER_SPAN);

// ============================================================================
// Status / Control Bits
// ============================================================================

bitflags::bitflags! {
    /// STATUS register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u32 {
        /// Receive FIFO has valid data
        const RX_NOT_EMPTY = 0x01;
        /// Receive FIFO is full
        const RX_FULL = 0x02;
        /// Transmit FIFO is empty
        const TX_EMPTY = 0x04;
        /// Transmit FIFO is full
        const TX_FULL = 0x08;
        /// Interrupts are enabled
        const INTR_ENABLED = 0x10;
        /// Overrun error has occurred
        const OVERRUN_ERROR = 0x20;
        /// Frame error has occurred
        const FRAME_ERROR = 0x40;
        /// Parity error has occurred
        const PARITY_ERROR = 0x80;
    }
}

bitflags::bitflags! {
    /// CONTROL register bits (write-1-to-act for the resets)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Control: u32 {
        /// Reset the transmit FIFO
        const RESET_TX_FIFO = 0x01;
        /// Reset the receive FIFO
        const RESET_RX_FIFO = 0x02;
        /// Enable interrupt
        const ENABLE_INTR = 0x10;
    }
}

bitflags::bitflags! {
    /// Latched line errors, a view of the STATUS error bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineErrors: u32 {
        const OVERRUN = Status::OVERRUN_ERROR.bits();
        const FRAME = Status::FRAME_ERROR.bits();
        const PARITY = Status::PARITY_ERROR.bits();
    }
}

impl Status {
    /// Latched error bits of this snapshot.
    #[inline]
    pub const fn line_errors(self) -> LineErrors {
        LineErrors::from_bits_truncate(self.bits())
    }

    #[inline]
    pub const fn is_tx_empty(self) -> bool {
        self.contains(Status::TX_EMPTY)
    }

    #[inline]
    pub const fn is_tx_full(self) -> bool {
        self.contains(Status::TX_FULL)
    }

    /// Inverted sense: empty means the RX-not-empty bit is clear.
    #[inline]
    pub const fn is_rx_empty(self) -> bool {
        !self.contains(Status::RX_NOT_EMPTY)
    }

    #[inline]
    pub const fn is_rx_full(self) -> bool {
        self.contains(Status::RX_FULL)
    }
}

impl Control {
    /// Reset both FIFOs.
    pub const RESET_FIFOS: Control = Control::RESET_TX_FIFO.union(Control::RESET_RX_FIFO);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets_match_hardware_layout() {
        let offsets: [usize; 4] = Register::ALL.map(Register::offset);
        assert_eq!(offsets, [0x00, 0x04, 0x08, 0x0C]);
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn status_bits_are_bit_exact() {
        assert_eq!(Status::RX_NOT_EMPTY.bits(), 0x01);
        assert_eq!(Status::RX_FULL.bits(), 0x02);
        assert_eq!(Status::TX_EMPTY.bits(), 0x04);
        assert_eq!(Status::TX_FULL.bits(), 0x08);
        assert_eq!(Status::INTR_ENABLED.bits(), 0x10);
        assert_eq!(Status::OVERRUN_ERROR.bits(), 0x20);
        assert_eq!(Status::FRAME_ERROR.bits(), 0x40);
        assert_eq!(Status::PARITY_ERROR.bits(), 0x80);
        assert_eq!(Control::RESET_FIFOS.bits(), 0x03);
        assert_eq!(Control::ENABLE_INTR.bits(), 0x10);
    }

    #[test]
    fn rx_empty_uses_inverted_sense() {
        assert!(Status::empty().is_rx_empty());
        assert!(!Status::RX_NOT_EMPTY.is_rx_empty());
        assert!(Status::RX_FULL.is_rx_empty());
    }

    #[test]
    fn line_errors_ignore_fifo_bits() {
        let status = Status::from_bits_retain(0xFF);
        assert_eq!(status.line_errors(), LineErrors::all());
        assert!(Status::from_bits_retain(0x1F).line_errors().is_empty());
        assert_eq!(
            Status::from_bits_retain(0x44).line_errors(),
            LineErrors::FRAME
        );
    }
}
