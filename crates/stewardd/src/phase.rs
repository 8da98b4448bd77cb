//! Life-cycle phases and the atomic cell that owns the current one.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Phase of a daemon start cycle.
///
/// A cycle walks `Stopped → Starting → Started → Stopping → Stopped`.
/// `Aborting` can be entered from any other phase and is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    /// No cycle is active.
    Stopped = 0,
    /// The start sequence is running.
    Starting = 1,
    /// The listener has started and the daemon is serving.
    Started = 2,
    /// A stop was requested; the stop sequence is running.
    Stopping = 3,
    /// A fatal error ended the cycle.
    Aborting = 4,
}

impl Phase {
    /// Upper-case name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Started => "STARTED",
            Self::Stopping => "STOPPING",
            Self::Aborting => "ABORTING",
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Stopped,
            1 => Self::Starting,
            2 => Self::Started,
            3 => Self::Stopping,
            _ => Self::Aborting,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free holder of the current [`Phase`].
///
/// [`PhaseCell::transition`] is the only mutation that may race; the
/// `Stopped → Starting` transition is what keeps two start cycles from
/// overlapping.
#[derive(Debug)]
pub struct PhaseCell {
    raw: AtomicU8,
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseCell {
    /// Creates a cell in [`Phase::Stopped`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(Phase::Stopped as u8),
        }
    }

    /// Moves to `to` if the current phase is `from`, returning whether the
    /// change applied.
    pub fn transition(&self, from: Phase, to: Phase) -> bool {
        self.raw
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Reads the current phase.
    #[must_use]
    pub fn current(&self) -> Phase {
        Phase::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Sets `to` unconditionally.
    ///
    /// Reserved for terminal transitions issued by the orchestrator thread
    /// once it alone owns the cycle.
    pub fn force(&self, to: Phase) {
        self.raw.store(to as u8, Ordering::Release);
    }
}
