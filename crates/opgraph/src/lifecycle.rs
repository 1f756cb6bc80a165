//! Live/peak value counters with sticky overflow.

use std::fmt;

use tracing::warn;

/// A counter reading: exact, or unknown since the counter overflowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveCount {
    Exact(u64),
    Overflow,
}

impl fmt::Display for LiveCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Overflow => write!(f, "OVERFLOW"),
        }
    }
}

/// Counts traced values currently alive and the most ever alive at once.
///
/// Once a count would pass `capacity`, its overflow flag is set and never
/// cleared; the number is no longer reported.
#[derive(Clone, Debug)]
pub struct LiveCounters {
    capacity: u64,
    current: u64,
    peak: u64,
    current_overflow: bool,
    peak_overflow: bool,
}

impl LiveCounters {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            current: 0,
            peak: 0,
            current_overflow: false,
            peak_overflow: false,
        }
    }

    /// A value was constructed or cloned.
    pub fn created(&mut self) {
        if !self.current_overflow {
            if self.current >= self.capacity {
                self.current_overflow = true;
                warn!(capacity = self.capacity, "live value counter overflowed");
            } else {
                self.current += 1;
            }
        }
        if !self.peak_overflow {
            if self.current_overflow {
                self.peak_overflow = true;
            } else if self.current > self.peak {
                self.peak = self.current;
            }
        }
    }

    /// A value was dropped.
    pub fn destroyed(&mut self) {
        if !self.current_overflow {
            self.current = self.current.saturating_sub(1);
        }
    }

    pub fn current(&self) -> LiveCount {
        if self.current_overflow {
            LiveCount::Overflow
        } else {
            LiveCount::Exact(self.current)
        }
    }

    pub fn peak(&self) -> LiveCount {
        if self.peak_overflow {
            LiveCount::Overflow
        } else {
            LiveCount::Exact(self.peak)
        }
    }

    pub fn stats(&self) -> LiveStats {
        LiveStats {
            current: self.current(),
            peak: self.peak(),
        }
    }
}

/// Snapshot of both counters, printable as a two-line report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveStats {
    pub current: LiveCount,
    pub peak: LiveCount,
}

impl fmt::Display for LiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Nodes: {}", self.current)?;
        write!(f, "Max Nodes: {}", self.peak)
    }
}
