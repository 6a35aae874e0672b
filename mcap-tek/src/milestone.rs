//! Market-cap milestones and the persisted, monotonic set of those reached.

use tracing::{debug, warn};

use crate::store::KeyValueStore;

/// Store key holding the JSON-encoded reached flags.
pub const REACHED_KEY: &str = "mcap_milestones_reached";

/// A fixed market-cap threshold with its pill label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestone {
    pub threshold: f64,
    pub label: &'static str,
}

impl Milestone {
    pub const fn new(threshold: f64, label: &'static str) -> Self {
        Self { threshold, label }
    }
}

/// Ordered milestone list rendered in the marquee.
pub const MILESTONES: &[Milestone] = &[
    Milestone::new(10_000.0, "Liftoff"),
    Milestone::new(25_000.0, "Warm up"),
    Milestone::new(50_000.0, "Flux online"),
    Milestone::new(100_000.0, "Six figures"),
    Milestone::new(250_000.0, "Pool swirl"),
    Milestone::new(500_000.0, "Half mil"),
    Milestone::new(1_000_000.0, "Millionaire"),
    Milestone::new(2_500_000.0, "Cardio"),
    Milestone::new(5_000_000.0, "Escape velocity"),
    Milestone::new(10_000_000.0, "Eight digits"),
    Milestone::new(25_000_000.0, "Orbit"),
    Milestone::new(50_000_000.0, "Hyperdrive"),
    Milestone::new(100_000_000.0, "Nine digits"),
];

/// Reached flags parallel to a milestone list. Flags never go back to false.
pub struct MilestoneTracker<S> {
    milestones: &'static [Milestone],
    reached: Vec<bool>,
    store: S,
}

impl<S> MilestoneTracker<S>
where
    S: KeyValueStore,
{
    /// Load flags from `store`, restoring them only if the stored array has one
    /// entry per milestone.
    pub fn load(milestones: &'static [Milestone], store: S) -> Self {
        let reached = store
            .get(REACHED_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<bool>>(&raw) {
                Ok(flags) => Some(flags),
                Err(error) => {
                    debug!(%error, "ignoring corrupt milestone state");
                    None
                }
            })
            .filter(|flags| {
                let valid = flags.len() == milestones.len();
                if !valid {
                    debug!(
                        stored = flags.len(),
                        expected = milestones.len(),
                        "ignoring milestone state with mismatched length"
                    );
                }
                valid
            })
            .unwrap_or_else(|| vec![false; milestones.len()]);

        Self {
            milestones,
            reached,
            store,
        }
    }

    /// Mark every milestone at or below `value` as reached. Persists and
    /// returns true if any flag changed.
    pub fn observe(&mut self, value: f64) -> bool {
        let mut changed = false;
        for (flag, milestone) in self.reached.iter_mut().zip(self.milestones) {
            if !*flag && value >= milestone.threshold {
                *flag = true;
                changed = true;
            }
        }

        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.reached)
            .map_err(Into::into)
            .and_then(|raw| self.store.set(REACHED_KEY, raw));
        if let Err(error) = result {
            warn!(%error, "failed to persist milestone state");
        }
    }

    pub fn milestones(&self) -> &'static [Milestone] {
        self.milestones
    }

    pub fn reached(&self) -> &[bool] {
        &self.reached
    }

    /// Milestones paired with their reached flag, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Milestone, bool)> + '_ {
        self.milestones.iter().zip(self.reached.iter().copied())
    }

    pub fn reached_count(&self) -> usize {
        self.reached.iter().filter(|r| **r).count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
