//! Damped spring that smooths the displayed market cap toward the latest target.
//!
//! Integration is semi-implicit Euler on fixed sub-steps, so the result does
//! not depend on how unevenly frames arrive.

use std::time::Duration;

/// Largest integration step in seconds.
const MAX_SUB_STEP: f64 = 0.001;

/// Physical constants of the spring, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 38.0,
            damping: 16.0,
            mass: 0.45,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spring {
    config: SpringConfig,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    /// A spring at rest at `initial`.
    pub fn new(config: SpringConfig, initial: f64) -> Self {
        Self {
            config,
            position: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    /// Retarget without resetting velocity.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Advance the simulation by `elapsed` and return the new position.
    pub fn step(&mut self, elapsed: Duration) -> f64 {
        let mut remaining = elapsed.as_secs_f64();
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;

        while remaining > 0.0 {
            let dt = remaining.min(MAX_SUB_STEP);
            let displacement = self.position - self.target;
            let acceleration = (-stiffness * displacement - damping * self.velocity) / mass;
            self.velocity += acceleration * dt;
            self.position += self.velocity * dt;
            remaining -= dt;
        }

        self.position
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Position clamped for display.
    pub fn display_value(&self) -> f64 {
        self.position.max(0.0)
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(SpringConfig::default(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_rest_stays_put() {
        let mut spring = Spring::default();
        assert_eq!(spring.step(Duration::from_secs(1)), 0.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_converges_toward_target() {
        let mut spring = Spring::default();
        spring.set_target(100_000.0);

        let early = spring.step(Duration::from_millis(100));
        assert!(early > 0.0 && early < 100_000.0);

        let later = spring.step(Duration::from_secs(2));
        assert!(later > early);

        spring.step(Duration::from_secs(10));
        assert!((spring.position() - 100_000.0).abs() < 1.0);
    }

    #[test]
    fn test_overdamped_does_not_overshoot() {
        let mut spring = Spring::default();
        spring.set_target(1_000.0);

        for _ in 0..600 {
            let pos = spring.step(Duration::from_millis(16));
            assert!(pos <= 1_000.0 + 1e-6);
        }
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut coarse = Spring::default();
        let mut fine = Spring::default();
        coarse.set_target(500.0);
        fine.set_target(500.0);

        coarse.step(Duration::from_millis(320));
        for _ in 0..20 {
            fine.step(Duration::from_millis(16));
        }

        assert!((coarse.position() - fine.position()).abs() < 1e-6);
    }

    #[test]
    fn test_display_value_clamped() {
        let mut spring = Spring::new(SpringConfig::default(), -10.0);
        assert_eq!(spring.display_value(), 0.0);
        spring.set_target(f64::NAN);
        assert_eq!(spring.target(), -10.0);
    }
}
