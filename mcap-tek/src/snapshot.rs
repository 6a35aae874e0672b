//! Accepted market-cap snapshots and the delta derived from them.

use chrono::{DateTime, Utc};

/// Sticky direction of the last non-zero move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            Direction::Up => "+",
            Direction::Down => "-",
        }
    }

    /// Apply the sticky rule: a zero delta keeps the current direction.
    pub fn next(self, delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            self
        }
    }
}

/// A single accepted market-cap reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub value: f64,
    pub time: DateTime<Utc>,
}

/// Only finite, strictly positive readings are ever accepted.
pub fn is_valid_value(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Latest and prior accepted snapshots plus the delta between them.
///
/// Older history is discarded. Rejected readings leave every field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotState {
    latest: Option<Snapshot>,
    prior: Option<Snapshot>,
    delta: f64,
    percent: f64,
    direction: Direction,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a new reading. Returns the accepted snapshot, or `None` if the
    /// value was rejected.
    pub fn accept(&mut self, value: f64) -> Option<Snapshot> {
        self.accept_at(value, Utc::now())
    }

    pub fn accept_at(&mut self, value: f64, time: DateTime<Utc>) -> Option<Snapshot> {
        if !is_valid_value(value) {
            return None;
        }

        if let Some(previous) = self.latest.filter(|s| s.value > 0.0) {
            let delta = value - previous.value;
            self.delta = delta;
            self.percent = if previous.value != 0.0 {
                delta / previous.value * 100.0
            } else {
                0.0
            };
            self.direction = self.direction.next(delta);
        }

        let snapshot = Snapshot { value, time };
        self.prior = self.latest.replace(snapshot);
        Some(snapshot)
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.latest
    }

    pub fn prior(&self) -> Option<Snapshot> {
        self.prior
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
