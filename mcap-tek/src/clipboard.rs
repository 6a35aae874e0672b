//! Copy-to-clipboard with a transient "copied" indicator.

use std::{
    io::Write,
    time::{Duration, Instant},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::error::ClipboardError;

/// How long the "copied" indicator stays on after a successful write.
pub const COPIED_FOR: Duration = Duration::from_millis(1000);

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Terminal clipboard via the OSC 52 escape sequence.
#[derive(Debug)]
pub struct Osc52Clipboard<W> {
    writer: W,
}

impl<W> Osc52Clipboard<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Clipboard for Osc52Clipboard<W>
where
    W: Write,
{
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        write!(self.writer, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Tracks whether the "copied" indicator should be shown.
#[derive(Debug, Clone, Default)]
pub struct CopyIndicator {
    until: Option<Instant>,
}

impl CopyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `text` and light the indicator on success. Failures are swallowed
    /// and leave the indicator untouched.
    pub fn copy<C>(&mut self, clipboard: &mut C, text: &str, now: Instant)
    where
        C: Clipboard + ?Sized,
    {
        match clipboard.write_text(text) {
            Ok(()) => self.until = Some(now + COPIED_FOR),
            Err(error) => debug!(%error, "clipboard write failed"),
        }
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }
}
