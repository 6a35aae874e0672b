//! Auto-scrolling milestone marquee with hover pause and manual paging.
//!
//! Offsets are measured in layout units (terminal columns in the TUI). The
//! renderer lays out the track twice in a row and reports the width of one
//! copy, so wrapping by that width is visually seamless.

use std::time::{Duration, Instant};

/// Default auto-scroll speed in units per millisecond.
pub const DEFAULT_SPEED: f64 = 0.008;

/// Pause window engaged by a manual step.
pub const STEP_PAUSE: Duration = Duration::from_millis(2000);

/// Time constant of the smoothed manual step.
const STEP_EASE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarqueeState {
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Back,
    Forward,
}

#[derive(Debug, Clone)]
pub struct Marquee {
    speed: f64,
    offset: f64,
    track_width: Option<f64>,
    pill_width: Option<f64>,
    hover_region: bool,
    hover_control: bool,
    pause_until: Option<Instant>,
    pending_step: f64,
}

impl Default for Marquee {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl Marquee {
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            offset: 0.0,
            track_width: None,
            pill_width: None,
            hover_region: false,
            hover_control: false,
            pause_until: None,
            pending_step: 0.0,
        }
    }

    /// Record the measured layout. Non-positive widths count as not laid out.
    pub fn measure(&mut self, track_width: f64, first_pill_width: f64) {
        self.track_width = (track_width.is_finite() && track_width > 0.0).then_some(track_width);
        self.pill_width =
            (first_pill_width.is_finite() && first_pill_width > 0.0).then_some(first_pill_width);
        self.wrap();
    }

    pub fn set_region_hover(&mut self, hovered: bool) {
        self.hover_region = hovered;
    }

    pub fn set_control_hover(&mut self, hovered: bool) {
        self.hover_control = hovered;
    }

    pub fn state(&self, now: Instant) -> MarqueeState {
        let timed = self.pause_until.is_some_and(|until| now < until);
        if timed || self.hover_region || self.hover_control {
            MarqueeState::Paused
        } else {
            MarqueeState::Running
        }
    }

    /// Page by one pill width and hold the pause window, whatever the hover
    /// state. Ignored until a pill has been measured.
    pub fn step(&mut self, direction: StepDirection, now: Instant) {
        let Some(pill) = self.pill_width else {
            return;
        };
        self.pending_step += match direction {
            StepDirection::Back => -pill,
            StepDirection::Forward => pill,
        };
        self.pause_until = Some(now + STEP_PAUSE);
    }

    /// Advance one frame. Skipped entirely until the track has been measured.
    pub fn tick(&mut self, elapsed: Duration, now: Instant) {
        if self.track_width.is_none() {
            return;
        }

        if self.pause_until.is_some_and(|until| now >= until) {
            self.pause_until = None;
        }

        if self.state(now) == MarqueeState::Running {
            self.offset += self.speed * elapsed.as_secs_f64() * 1000.0;
        }

        if self.pending_step != 0.0 {
            let k = 1.0 - (-elapsed.as_secs_f64() / STEP_EASE.as_secs_f64()).exp();
            let mut applied = self.pending_step * k;
            if (self.pending_step - applied).abs() < 0.01 {
                applied = self.pending_step;
            }
            self.offset += applied;
            self.pending_step -= applied;
        }

        self.wrap();
    }

    /// Restore `0 <= offset < track_width`.
    fn wrap(&mut self) {
        let Some(width) = self.track_width else {
            return;
        };
        if self.offset >= width || self.offset < 0.0 {
            self.offset = self.offset.rem_euclid(width);
            if self.offset >= width {
                self.offset = 0.0;
            }
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn track_width(&self) -> Option<f64> {
        self.track_width
    }

    pub fn pill_width(&self) -> Option<f64> {
        self.pill_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(track: f64, pill: f64) -> Marquee {
        let mut m = Marquee::new(0.01);
        m.measure(track, pill);
        m
    }

    #[test]
    fn test_unmeasured_track_skips_advance() {
        let mut m = Marquee::new(0.01);
        let now = Instant::now();
        m.tick(Duration::from_secs(5), now);
        assert_eq!(m.offset(), 0.0);

        m.measure(0.0, 10.0);
        assert_eq!(m.track_width(), None);
        assert_eq!(m.pill_width(), Some(10.0));
        m.tick(Duration::from_secs(5), now);
        assert_eq!(m.offset(), 0.0);

        m.measure(100.0, f64::NAN);
        assert_eq!(m.track_width(), Some(100.0));
        assert_eq!(m.pill_width(), None);
    }

    #[test]
    fn test_running_advances_by_speed() {
        let mut m = measured(1_000.0, 10.0);
        m.tick(Duration::from_millis(500), Instant::now());
        assert!((m.offset() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_wraps_within_track() {
        let mut m = measured(100.0, 10.0);
        let now = Instant::now();
        for _ in 0..1_000 {
            m.tick(Duration::from_millis(37), now);
            assert!(m.offset() >= 0.0 && m.offset() < 100.0);
        }

        m.tick(Duration::from_millis(25_000), now);
        assert!(m.offset() >= 0.0 && m.offset() < 100.0);
    }

    #[test]
    fn test_hover_pauses_and_resumes() {
        let mut m = measured(1_000.0, 10.0);
        let now = Instant::now();

        m.set_region_hover(true);
        assert_eq!(m.state(now), MarqueeState::Paused);
        m.tick(Duration::from_millis(500), now);
        assert_eq!(m.offset(), 0.0);

        m.set_region_hover(false);
        m.set_control_hover(true);
        assert_eq!(m.state(now), MarqueeState::Paused);

        m.set_control_hover(false);
        assert_eq!(m.state(now), MarqueeState::Running);
    }

    #[test]
    fn test_step_engages_timed_pause() {
        let mut m = measured(1_000.0, 10.0);
        let start = Instant::now();

        m.step(StepDirection::Forward, start);
        assert_eq!(m.state(start), MarqueeState::Paused);

        // leaving hover inside the window does not resume
        m.set_region_hover(true);
        m.set_region_hover(false);
        assert_eq!(m.state(start + Duration::from_millis(1_999)), MarqueeState::Paused);
        assert_eq!(m.state(start + STEP_PAUSE), MarqueeState::Running);
    }

    #[test]
    fn test_step_moves_one_pill_smoothly() {
        let mut m = measured(1_000.0, 10.0);
        let start = Instant::now();
        m.step(StepDirection::Forward, start);

        m.tick(Duration::from_millis(16), start);
        let partial = m.offset();
        assert!(partial > 0.0 && partial < 10.0);

        let mut now = start;
        for _ in 0..100 {
            now += Duration::from_millis(16);
            if now >= start + STEP_PAUSE {
                break;
            }
            m.tick(Duration::from_millis(16), now);
        }
        assert!((m.offset() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_back_wraps_below_zero() {
        let mut m = measured(100.0, 10.0);
        let start = Instant::now();
        m.step(StepDirection::Back, start);
        for i in 1..=100 {
            m.tick(Duration::from_millis(16), start + Duration::from_millis(16 * i));
        }
        assert!((m.offset() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_ignored_before_layout() {
        let mut m = Marquee::new(0.01);
        let now = Instant::now();
        m.step(StepDirection::Forward, now);
        assert_eq!(m.state(now), MarqueeState::Running);
    }
}
