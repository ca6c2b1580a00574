//! Synchronization primitives for the UART-Lite driver
//!
//! Two pieces keep the foreground and interrupt contexts apart:
//!
//! - [`AccessToken`]: a per-device flag taken by every operation that touches
//!   the FIFOs. It never spins; a contended acquire fails immediately, since
//!   spinning in the ISR against a preempted foreground holder would deadlock.
//! - The claim registry: one entry per live handle, so two handles can never
//!   alias the same register block.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::error::{Result, UartError};

// ============================================================================
// Access Token
// ============================================================================

/// Exclusive right to touch a device's FIFOs
pub struct AccessToken {
    held: AtomicBool,
}

impl AccessToken {
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the token if nobody holds it.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Claim Registry
// ============================================================================

/// Maximum number of live device handles
pub const MAX_DEVICES: usize = 32;

static CLAIMS: Mutex<heapless::Vec<usize, MAX_DEVICES>> = Mutex::new(heapless::Vec::new());

/// Record `addr` as owned by a live handle.
pub fn claim(addr: usize) -> Result<()> {
    let mut claims = CLAIMS.lock();
    if claims.contains(&addr) {
        return Err(UartError::AlreadyClaimed(addr));
    }
    claims.push(addr).map_err(|_| UartError::TooManyDevices)
}

/// Forget the claim on `addr`. Releasing an unclaimed address is a no-op.
pub fn release(addr: usize) {
    let mut claims = CLAIMS.lock();
    if let Some(pos) = claims.iter().position(|&a| a == addr) {
        claims.swap_remove(pos);
    }
}

pub fn is_claimed(addr: usize) -> bool {
    CLAIMS.lock().contains(&addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_exclusive() {
        let token = AccessToken::new();
        assert!(token.try_acquire());
        assert!(token.is_held());
        assert!(!token.try_acquire());
        token.release();
        assert!(!token.is_held());
        assert!(token.try_acquire());
    }

    #[test]
    fn claim_rejects_alias_until_released() {
        let addr = 0x7fff_0000;
        claim(addr).unwrap();
        assert_eq!(claim(addr), Err(UartError::AlreadyClaimed(addr)));
        assert!(is_claimed(addr));
        release(addr);
        assert!(!is_claimed(addr));
        claim(addr).unwrap();
        release(addr);
        release(addr);
    }
}
