//! Simulated time.
//!
//! Time in a simulation is an ordinal tick count that only moves when
//! the [`EventQueue`] dispatches an activity or idles forward.
//! It has no relation to wall-clock time.
//!
//! [`EventQueue`]: crate::event::EventQueue

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in (or a distance through) simulated time, measured in ticks.
///
/// The same type is used for absolute times and for scheduling delays.
/// Valid simulation times are never negative, but a negative value can
/// still be constructed so that it can be rejected as a delay.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    /// The start of every simulation.
    pub const ZERO: Self = Self(0);
    /// The largest representable time. Useful as an "until the end" bound.
    pub const INF: Self = Self(i64::MAX);

    /// Returns the time `ticks` ticks after [`ZERO`].
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::Time;
    /// assert_eq!(Time::of(0), Time::ZERO);
    /// assert_eq!(Time::of(42).get(), 42);
    /// assert_eq!(Time::of(42).to_string(), "42t");
    /// ```
    ///
    /// [`ZERO`]: Time::ZERO
    pub const fn of(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns `true` if this time lies before [`Time::ZERO`].
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Adds a delay to this time, returning `None` on overflow.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::Time;
    /// assert_eq!(Time::of(3).checked_add(Time::of(5)), Some(Time::of(8)));
    /// assert_eq!(Time::INF.checked_add(Time::of(1)), None);
    /// ```
    pub const fn checked_add(self, delay: Self) -> Option<Self> {
        match self.0.checked_add(delay.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Adds a delay to this time, clamping at [`Time::INF`].
    pub const fn saturating_add(self, delay: Self) -> Self {
        Self(self.0.saturating_add(delay.0))
    }
}

impl From<i64> for Time {
    fn from(ticks: i64) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_by_ticks() {
        assert!(Time::ZERO < Time::of(1));
        assert!(Time::of(-1) < Time::ZERO);
        assert!(Time::of(i64::MAX - 1) < Time::INF);
        assert_eq!(Time::of(7).max(Time::of(3)), Time::of(7));
    }

    #[test]
    fn negative_detection() {
        assert!(Time::of(-5).is_negative());
        assert!(!Time::ZERO.is_negative());
    }

    #[test]
    fn saturating_add_clamps() {
        assert_eq!(Time::INF.saturating_add(Time::of(10)), Time::INF);
        assert_eq!(Time::of(1).saturating_add(Time::of(2)), Time::of(3));
    }
}
