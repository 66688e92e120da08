//! Role bookkeeping for the double-buffered particle store.
//!
//! Two buffer pairs alternate between being the read source (`current`) and
//! the write destination (`target`) of the simulation pass. [`BufferRoles`]
//! models this as an explicit two-state automaton instead of swapping buffer
//! handles around, so both the GPU store and the CPU reference share one
//! implementation of the protocol.
//!
//! ```text
//!            swap()                      swap()
//!  (0 -> 1) --------> (1 -> 0) ----------------> (0 -> 1)
//! ```
//!
//! The very first pass after `arm` has no captured count to read yet and runs
//! over the uploaded initial population instead ([`InputRange::Initial`]).

/// Where the simulation pass takes its input row count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRange {
    /// First pass after initialization: the uploaded population size.
    Initial(u32),
    /// Every later pass: the row count captured by the previous pass.
    Captured,
}

/// Current/target indices of the two buffer pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRoles {
    current: usize,
    target: usize,
    bootstrap: Option<u32>,
}

impl BufferRoles {
    pub const fn new() -> Self {
        Self {
            current: 0,
            target: 1,
            bootstrap: None,
        }
    }

    /// Index of the pair holding the valid population.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Index of the pair the next pass writes into.
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Reset to `(0, 1)` and make the next pass read `initial` rows.
    pub fn arm(&mut self, initial: u32) {
        *self = Self {
            current: 0,
            target: 1,
            bootstrap: Some(initial),
        };
    }

    /// Whether the next pass is the bootstrap pass.
    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap.is_some()
    }

    /// Input range for the pass about to be recorded. Consumes the bootstrap.
    pub fn begin_pass(&mut self) -> InputRange {
        match self.bootstrap.take() {
            Some(n) => InputRange::Initial(n),
            None => InputRange::Captured,
        }
    }

    /// Hand the freshly written pair over as the new source.
    pub fn swap(&mut self) {
        self.current = self.target;
        self.target = (self.target + 1) % 2;
    }
}

impl Default for BufferRoles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_roles() {
        let roles = BufferRoles::new();
        assert_eq!((roles.current(), roles.target()), (0, 1));
        assert!(!roles.is_bootstrap());
    }

    #[test]
    fn test_swap_alternates() {
        let mut roles = BufferRoles::new();
        roles.swap();
        assert_eq!((roles.current(), roles.target()), (1, 0));
        roles.swap();
        assert_eq!((roles.current(), roles.target()), (0, 1));
    }

    #[test]
    fn test_roles_never_alias() {
        let mut roles = BufferRoles::new();
        for _ in 0..5 {
            assert_ne!(roles.current(), roles.target());
            roles.swap();
        }
    }

    #[test]
    fn test_bootstrap_is_one_shot() {
        let mut roles = BufferRoles::new();
        roles.arm(1000);
        assert!(roles.is_bootstrap());
        assert_eq!(roles.begin_pass(), InputRange::Initial(1000));
        roles.swap();
        assert_eq!(roles.begin_pass(), InputRange::Captured);
        assert_eq!(roles.begin_pass(), InputRange::Captured);
    }

    #[test]
    fn test_arm_resets_roles() {
        let mut roles = BufferRoles::new();
        roles.swap();
        roles.arm(3);
        assert_eq!((roles.current(), roles.target()), (0, 1));
    }
}
