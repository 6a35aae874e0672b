//! The display model tying the poller output to the animator, formatter,
//! milestone tracker and marquee.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{
    clipboard::{Clipboard, CopyIndicator},
    config::Config,
    format::{format_delta, format_headline, format_percent, short_address},
    marquee::{Marquee, StepDirection},
    milestone::{Milestone, MilestoneTracker},
    snapshot::{Direction, Snapshot, SnapshotState},
    spring::Spring,
    store::KeyValueStore,
};

/// Formatted delta line, e.g. `▲ +1,250 (+0.842%)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaLine {
    pub direction: Direction,
    pub arrow: &'static str,
    pub amount: String,
    pub percent: String,
}

pub struct Widget<S> {
    snapshot: SnapshotState,
    spring: Spring,
    milestones: MilestoneTracker<S>,
    marquee: Marquee,
    copy: CopyIndicator,
    coin_address: String,
    headline: String,
}

impl<S> Widget<S>
where
    S: KeyValueStore,
{
    pub fn new(config: &Config, milestones: &'static [Milestone], store: S) -> Self {
        let spring = Spring::new(config.spring, 0.0);
        Self {
            snapshot: SnapshotState::new(),
            headline: format!("${}", format_headline(spring.display_value())),
            spring,
            milestones: MilestoneTracker::load(milestones, store),
            marquee: Marquee::default(),
            copy: CopyIndicator::new(),
            coin_address: config.coin_address.clone(),
        }
    }

    /// Apply one polled value. Invalid values change nothing.
    pub fn on_snapshot(&mut self, value: f64) -> Option<Snapshot> {
        let Some(snapshot) = self.snapshot.accept(value) else {
            debug!(value, "rejected market cap snapshot");
            return None;
        };

        self.spring.set_target(snapshot.value);
        if self.milestones.observe(snapshot.value) {
            info!(
                value = snapshot.value,
                reached = self.milestones.reached_count(),
                "milestone reached"
            );
        }
        Some(snapshot)
    }

    /// Advance the animator and marquee by one display frame.
    pub fn on_frame(&mut self, elapsed: Duration, now: Instant) {
        self.spring.step(elapsed);
        self.headline = format!("${}", format_headline(self.spring.display_value()));
        self.marquee.tick(elapsed, now);
    }

    pub fn step_marquee(&mut self, direction: StepDirection, now: Instant) {
        self.marquee.step(direction, now);
    }

    pub fn copy_address<C>(&mut self, clipboard: &mut C, now: Instant)
    where
        C: Clipboard + ?Sized,
    {
        self.copy.copy(clipboard, &self.coin_address, now);
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn delta_line(&self) -> DeltaLine {
        let direction = self.snapshot.direction();
        DeltaLine {
            direction,
            arrow: direction.arrow(),
            amount: format!("{}{}", direction.sign(), format_delta(self.snapshot.delta())),
            percent: format!("{}{}%", direction.sign(), format_percent(self.snapshot.percent())),
        }
    }

    pub fn short_address(&self) -> String {
        short_address(&self.coin_address)
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copy.is_copied(now)
    }

    pub fn snapshot(&self) -> &SnapshotState {
        &self.snapshot
    }

    pub fn spring(&self) -> &Spring {
        &self.spring
    }

    pub fn milestones(&self) -> &MilestoneTracker<S> {
        &self.milestones
    }

    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    pub fn marquee_mut(&mut self) -> &mut Marquee {
        &mut self.marquee
    }
}
