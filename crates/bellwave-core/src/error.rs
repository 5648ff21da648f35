//! Error types for the bellwave renderer
//!
//! All errors here are construction-time configuration errors: a host that
//! receives one must disable the component rather than render against absent
//! state. The render path itself never returns errors; numerical degeneracies
//! (zero reference amplitude, zero distance) are recovered locally with
//! epsilon floors, and a stale envelope table is rebuilt lazily.

use core::fmt;

/// Configuration errors raised while building the field model or scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BellwaveError {
    /// The source-angle list is empty; the field has nothing to radiate.
    NoSources,
    /// The actuator registry is empty; the scheduler has nothing to drive.
    NoActuators,
    /// The requested horizon/interval does not fit the fixed-capacity
    /// envelope table.
    TableCapacityExceeded {
        /// Samples required (`sources * steps`)
        required: usize,
        /// Table capacity in samples
        capacity: usize,
    },
    /// The precompute sample interval is not a positive duration.
    InvalidInterval {
        /// Offending interval in milliseconds (rounded)
        interval_ms: i32,
    },
}

impl fmt::Display for BellwaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSources => write!(f, "source angle list is empty"),
            Self::NoActuators => write!(f, "actuator registry is empty"),
            Self::TableCapacityExceeded { required, capacity } => {
                write!(
                    f,
                    "envelope table needs {required} samples, capacity is {capacity}"
                )
            }
            Self::InvalidInterval { interval_ms } => {
                write!(f, "sample interval {interval_ms}ms is not positive")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BellwaveError {}

#[cfg(feature = "defmt")]
impl defmt::Format for BellwaveError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NoSources => defmt::write!(f, "no sources"),
            Self::NoActuators => defmt::write!(f, "no actuators"),
            Self::TableCapacityExceeded { required, capacity } => {
                defmt::write!(f, "table: {} > {}", required, capacity);
            }
            Self::InvalidInterval { interval_ms } => {
                defmt::write!(f, "interval: {}ms", interval_ms);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_context() {
        let err = BellwaveError::TableCapacityExceeded { required: 9000, capacity: 8192 };
        let mut buf = heapless::String::<128>::new();
        core::fmt::write(&mut buf, format_args!("{err}")).unwrap();
        assert!(buf.contains("9000"));
        assert!(buf.contains("8192"));
    }
}
