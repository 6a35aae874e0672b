//! mCAP tek - live market-cap widget core
//!
//! Everything the widget does apart from drawing:
//! - Polling the market-cap API and deriving delta, percent and sticky direction
//! - Spring smoothing of the displayed value between polls
//! - Display formatting with adaptive precision
//! - Persisted, monotonic milestone tracking
//! - The auto-scrolling milestone marquee
//! - Copy-to-clipboard with a transient indicator

pub mod clipboard;
pub mod config;
pub mod error;
pub mod format;
pub mod marquee;
pub mod milestone;
pub mod poller;
pub mod snapshot;
pub mod spring;
pub mod store;
pub mod widget;

// Re-export commonly used types for convenience
pub use clipboard::{Clipboard, CopyIndicator, Osc52Clipboard};
pub use config::Config;
pub use error::{ClipboardError, ConfigError, PollError, StoreError};
pub use format::{format_delta, format_headline, format_percent};
pub use marquee::{Marquee, MarqueeState, StepDirection};
pub use milestone::{MILESTONES, Milestone, MilestoneTracker};
pub use poller::{PollerHandle, SnapshotPoller};
pub use snapshot::{Direction, Snapshot, SnapshotState};
pub use spring::{Spring, SpringConfig};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use widget::Widget;
