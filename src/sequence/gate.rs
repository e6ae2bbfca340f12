//! Pointer interaction gate

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared flag that disables pointer interaction while held
///
/// Blocks are counted, so overlapping holders each keep the gate closed until
/// the last one lets go.
#[derive(Debug, Clone, Default)]
pub struct InteractionGate {
    blocks: Arc<AtomicUsize>,
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the gate until the returned guard is dropped
    pub fn block(&self) -> GateGuard {
        self.blocks.fetch_add(1, Ordering::SeqCst);
        GateGuard {
            blocks: Arc::clone(&self.blocks),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocks.load(Ordering::SeqCst) > 0
    }
}

/// Holds the gate closed
#[derive(Debug)]
pub struct GateGuard {
    blocks: Arc<AtomicUsize>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.blocks.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_opens_when_guard_drops() {
        let gate = InteractionGate::new();
        assert!(!gate.is_blocked());

        let guard = gate.block();
        assert!(gate.is_blocked());
        drop(guard);
        assert!(!gate.is_blocked());
    }

    #[test]
    fn test_nested_blocks() {
        let gate = InteractionGate::new();
        let shared = gate.clone();

        let outer = gate.block();
        let inner = shared.block();
        drop(outer);
        assert!(gate.is_blocked());
        drop(inner);
        assert!(!shared.is_blocked());
    }
}
