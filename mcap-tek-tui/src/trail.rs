use std::collections::VecDeque;

/// Number of trailing pointer samples kept.
pub const TRAIL_LEN: usize = 6;

/// Last few pointer positions, newest first, sampled once per frame.
#[derive(Debug, Clone, Default)]
pub struct CursorTrail {
    cursor: Option<(u16, u16)>,
    points: VecDeque<(u16, u16)>,
}

impl CursorTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, column: u16, row: u16) {
        self.cursor = Some((column, row));
    }

    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Push the current cursor onto the front of the trail.
    pub fn sample(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if self.points.is_empty() {
            self.points.extend(std::iter::repeat_n(cursor, TRAIL_LEN));
            return;
        }
        self.points.push_front(cursor);
        self.points.truncate(TRAIL_LEN);
    }

    pub fn points(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.points.iter().copied()
    }
}
