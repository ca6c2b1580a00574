//! Register access boundary
//!
//! Driver logic talks to the hardware only through [`RegisterAccess`]. The
//! MMIO implementation performs exactly one volatile access per call, so the
//! compiler can neither cache STATUS nor merge two CONTROL writes.

use core::ptr::{self, NonNull};

use crate::error::{Result, UartError};
use crate::regs::{Register, RegisterBlock};

/// Single, ordered accesses to one UART-Lite register block
#[cfg_attr(test, mockall::automock)]
pub trait RegisterAccess {
    /// Address of the register block, used to detect aliasing handles.
    fn base_address(&self) -> usize;

    /// Read a register. Reading RX pops one byte from the receive FIFO.
    fn read(&self, reg: Register) -> u32;

    /// Write a register. Writing TX pushes one byte into the transmit FIFO.
    fn write(&self, reg: Register, value: u32);
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline]
    fn base_address(&self) -> usize {
        (**self).base_address()
    }

    #[inline]
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

/// Compute and validate the register block address for a device.
fn block_address(base_address: usize, offset: usize) -> Result<usize> {
    if base_address == 0 {
        return Err(UartError::InvalidAddress(base_address));
    }
    let addr = base_address
        .checked_add(offset)
        .ok_or(UartError::InvalidAddress(base_address))?;
    if addr % core::mem::align_of::<RegisterBlock>() != 0 {
        return Err(UartError::Misaligned(addr));
    }
    Ok(addr)
}

/// Memory-mapped register block
pub struct MmioRegisters {
    block: NonNull<RegisterBlock>,
}

// The block is device memory, not Rust-owned data; every access is a single
// volatile load or store.
unsafe impl Send for MmioRegisters {}
unsafe impl Sync for MmioRegisters {}

impl MmioRegisters {
    /// Create the register accessor for a block at `addr`
    ///
    /// # Safety
    /// - `addr` must be the mapped address of a UART-Lite register block
    /// - The 16-byte span at `addr` must stay mapped for the lifetime of the accessor
    /// - The mapping must be device memory (uncached, no speculative reads)
    pub unsafe fn new(addr: usize) -> Result<Self> {
        unsafe { Self::with_offset(addr, 0) }
    }

    /// Create the register accessor for a block at `base_address + offset`
    ///
    /// # Safety
    /// Same as [`MmioRegisters::new`], for the block address `base_address + offset`.
    pub unsafe fn with_offset(base_address: usize, offset: usize) -> Result<Self> {
        let addr = block_address(base_address, offset)?;
        let block = NonNull::new(addr as *mut RegisterBlock).ok_or(UartError::InvalidAddress(addr))?;
        Ok(Self { block })
    }

    #[inline]
    fn register_ptr(&self, reg: Register) -> *mut u32 {
        let block = self.block.as_ptr();
        // SAFETY: only computes field addresses inside the mapped block.
        unsafe {
            match reg {
                Register::Rx => ptr::addr_of_mut!((*block).rx),
                Register::Tx => ptr::addr_of_mut!((*block).tx),
                Register::Status => ptr::addr_of_mut!((*block).status),
                Register::Control => ptr::addr_of_mut!((*block).control),
            }
        }
    }
}

impl RegisterAccess for MmioRegisters {
    fn base_address(&self) -> usize {
        self.block.as_ptr() as usize
    }

    #[inline]
    fn read(&self, reg: Register) -> u32 {
        // SAFETY: the block is mapped per the contract of `MmioRegisters::new`.
        unsafe { ptr::read_volatile(self.register_ptr(reg)) }
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        // SAFETY: the block is mapped per the contract of `MmioRegisters::new`.
        unsafe { ptr::write_volatile(self.register_ptr(reg), value) }
    }
}
