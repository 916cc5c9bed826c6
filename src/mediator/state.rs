use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a [`Mediator`](crate::Mediator).
///
/// ```text
/// Active ──dispose()──► Disposing ──► Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediatorState {
    /// Accepting registrations and firing events.
    Active,

    /// Broadcasting the dispose event to current subscribers.
    Disposing,

    /// Terminal; registrations get a one-shot call with no payload.
    Disposed,
}

impl MediatorState {
    const fn as_u8(self) -> u8 {
        match self {
            MediatorState::Active => 0,
            MediatorState::Disposing => 1,
            MediatorState::Disposed => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => MediatorState::Active,
            1 => MediatorState::Disposing,
            _ => MediatorState::Disposed,
        }
    }
}

/// Atomic cell holding a [`MediatorState`].
pub(super) struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(MediatorState::Active.as_u8()))
    }

    pub fn get(&self) -> MediatorState {
        MediatorState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from → to`; returns `false` if the current state is not `from`.
    pub fn transition(&self, from: MediatorState, to: MediatorState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
