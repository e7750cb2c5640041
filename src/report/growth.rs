//! Period over period change.

use serde::Serialize;

/// The percentage change from `previous` to `current`.
///
/// A zero baseline gives 100 when there is something now and 0 otherwise.
/// The result is always finite.
pub fn growth_percent(current: f64, previous: f64) -> f64 {
    let percent = if previous == 0.0 {
        if current > 0.0 { 100.0 } else { 0.0 }
    } else {
        (current - previous) / previous * 100.0
    };

    if percent.is_finite() { percent } else { 0.0 }
}

/// Which way a figure moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The figure grew.
    Up,
    /// The figure shrank.
    Down,
    /// The figure did not change, or there is nothing to compare against.
    Flat,
}

/// A change between two periods, split into size and direction for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Growth {
    /// The signed percentage change.
    pub percent: f64,
    /// Which way the figure moved.
    pub direction: Direction,
}

impl Growth {
    /// The change from `previous` to `current`, see [growth_percent].
    pub fn between(current: f64, previous: f64) -> Self {
        let percent = growth_percent(current, previous);
        let direction = if percent > 0.0 {
            Direction::Up
        } else if percent < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        };

        Self { percent, direction }
    }

    /// The size of the change without its sign.
    pub fn magnitude(&self) -> f64 {
        self.percent.abs()
    }
}
