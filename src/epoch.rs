//! View Activation Epochs
//!
//! Each page activation owns an `Epoch`; async work captures a token at
//! issue time and applies its result only while the token is current.
//! Bumping the epoch on teardown makes responses from a dead activation
//! inert instead of racing the next activation's state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter for one view activation
#[derive(Clone, Default)]
pub struct Epoch {
    current: Arc<AtomicU64>,
}

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current generation.
    pub fn token(&self) -> EpochToken {
        EpochToken {
            current: Arc::clone(&self.current),
            seen: self.current.load(Ordering::Relaxed),
        }
    }

    /// Invalidate all previously issued tokens.
    pub fn bump(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }
}

/// A snapshot of the epoch at the moment an operation was issued
#[derive(Clone)]
pub struct EpochToken {
    current: Arc<AtomicU64>,
    seen: u64,
}

impl EpochToken {
    /// True while no bump has happened since this token was taken.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Relaxed) == self.seen
    }
}
