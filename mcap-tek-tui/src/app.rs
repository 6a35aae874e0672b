//! Widget lifecycle and input handling.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use mcap_tek::{
    Config, FileStore, MILESTONES, Osc52Clipboard, PollerHandle, SnapshotPoller, StepDirection,
    Widget,
};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;
use tracing::info;

use crate::trail::CursorTrail;

/// Clickable and hoverable regions from the last drawn frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitAreas {
    pub copy_button: Rect,
    pub how_button: Rect,
    pub marquee: Rect,
    pub arrow_back: Rect,
    pub arrow_forward: Rect,
    pub modal: Rect,
    pub modal_close: Rect,
}

fn hit(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position::new(column, row))
}

pub struct App {
    pub widget: Widget<FileStore>,
    pub trail: CursorTrail,
    pub how_open: bool,
    pub hit: HitAreas,
    pub should_quit: bool,
    snapshots: mpsc::Receiver<f64>,
    poller: PollerHandle,
    last_frame: Instant,
}

impl App {
    /// Mount the widget: load persisted state and start polling.
    pub fn mount(config: &Config) -> Self {
        let store = FileStore::open(&config.state_file);
        let widget = Widget::new(config, MILESTONES, store);

        let (tx, snapshots) = mpsc::channel(64);
        let poller = SnapshotPoller::new(config).spawn(tx);

        Self {
            widget,
            trail: CursorTrail::new(),
            how_open: false,
            hit: HitAreas::default(),
            should_quit: false,
            snapshots,
            poller,
            last_frame: Instant::now(),
        }
    }

    /// Apply any snapshots delivered since the last frame, then advance the
    /// animator, marquee and cursor trail.
    pub fn on_frame(&mut self, now: Instant) {
        while let Ok(value) = self.snapshots.try_recv() {
            self.widget.on_snapshot(value);
        }

        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.widget.on_frame(elapsed, now);
        self.trail.sample();
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc if self.how_open => self.how_open = false,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') => self.how_open = !self.how_open,
            KeyCode::Char('c') => self.copy_address(now),
            KeyCode::Left => self.widget.step_marquee(StepDirection::Back, now),
            KeyCode::Right => self.widget.step_marquee(StepDirection::Forward, now),
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let (column, row) = (mouse.column, mouse.row);
        self.trail.move_to(column, row);

        // Every mouse event carries a position, so hover follows clicks and
        // scrolls too.
        let over_control =
            hit(self.hit.arrow_back, column, row) || hit(self.hit.arrow_forward, column, row);
        let marquee = self.widget.marquee_mut();
        marquee.set_region_hover(hit(self.hit.marquee, column, row));
        marquee.set_control_hover(over_control);

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            self.on_click(column, row, now);
        }
    }

    /// The pointer may have left the terminal without a final move event.
    pub fn on_focus_lost(&mut self) {
        let marquee = self.widget.marquee_mut();
        marquee.set_region_hover(false);
        marquee.set_control_hover(false);
    }

    fn on_click(&mut self, column: u16, row: u16, now: Instant) {
        if self.how_open {
            if hit(self.hit.modal_close, column, row) || !hit(self.hit.modal, column, row) {
                self.how_open = false;
            }
            return;
        }

        if hit(self.hit.copy_button, column, row) {
            self.copy_address(now);
        } else if hit(self.hit.how_button, column, row) {
            self.how_open = true;
        } else if hit(self.hit.arrow_back, column, row) {
            self.widget.step_marquee(StepDirection::Back, now);
        } else if hit(self.hit.arrow_forward, column, row) {
            self.widget.step_marquee(StepDirection::Forward, now);
        }
    }

    fn copy_address(&mut self, now: Instant) {
        let mut clipboard = Osc52Clipboard::new(io::stdout());
        self.widget.copy_address(&mut clipboard, now);
    }

    /// Time until the next frame is due.
    pub fn frame_timeout(&self, frame: Duration) -> Duration {
        frame.saturating_sub(self.last_frame.elapsed())
    }

    /// Unmount: stop polling. No snapshot is applied afterwards.
    pub fn shutdown(&mut self) {
        self.poller.shutdown();
        self.snapshots.close();
        while self.snapshots.try_recv().is_ok() {}
        info!("widget unmounted");
    }
}
