//! Rendering for the mCAP tek terminal widget.

use std::time::Instant;

use mcap_tek::{Direction as MoveDirection, KeyValueStore, MilestoneTracker, format::format_compact};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, HitAreas};

const C_UP: Color = Color::Rgb(52, 211, 153);
const C_DOWN: Color = Color::Rgb(244, 63, 94);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(235, 235, 235);
const C_ACCENT: Color = Color::Rgb(16, 185, 129);
const C_BG: Color = Color::Rgb(11, 13, 16);
const C_BORDER: Color = Color::Rgb(60, 64, 72);

const COPY_LABEL: &str = " Copy ";
const COPIED_LABEL: &str = " Copied! ";
const HOW_LABEL: &str = " How it works ";
const ARROW_BACK: &str = " ◀ ";
const ARROW_FORWARD: &str = " ▶ ";
const PILL_GAP: usize = 2;

pub fn render(f: &mut Frame, app: &mut App, now: Instant) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let mut hit = HitAreas::default();
    render_header(f, chunks[0], app, now, &mut hit);
    render_value(f, chunks[2], app);
    render_marquee(f, chunks[3], app, &mut hit);
    render_status_bar(f, chunks[4], app);

    if app.how_open {
        render_how_it_works(f, area, &mut hit);
    }

    render_trail(f, app);
    app.hit = hit;
}

fn render_header(f: &mut Frame, area: Rect, app: &App, now: Instant, hit: &mut HitAreas) {
    let address = format!(" {} ", app.widget.short_address());
    let copy = if app.widget.is_copied(now) {
        COPIED_LABEL
    } else {
        COPY_LABEL
    };

    let left_width = (address.chars().count() + 1 + copy.chars().count()) as u16;
    let left_x = area.x + area.width.saturating_sub(left_width) / 2;
    let copy_x = left_x + address.chars().count() as u16 + 1;

    let how_width = HOW_LABEL.chars().count() as u16;
    let how_x = area.right().saturating_sub(how_width + 1);

    hit.copy_button = Rect::new(copy_x, area.y, copy.chars().count() as u16, 1).intersection(area);
    hit.how_button = Rect::new(how_x, area.y, how_width, 1).intersection(area);

    let left = Line::from(vec![
        Span::styled(address, Style::default().fg(C_BRIGHT).bg(Color::Rgb(30, 32, 36))),
        Span::raw(" "),
        Span::styled(
            copy,
            Style::default()
                .fg(C_ACCENT)
                .add_modifier(Modifier::BOLD)
                .bg(Color::Rgb(20, 40, 34)),
        ),
    ]);
    f.render_widget(
        Paragraph::new(left),
        Rect::new(left_x, area.y, left_width, 1).intersection(area),
    );

    let how = Span::styled(HOW_LABEL, Style::default().fg(C_BRIGHT).bg(Color::Rgb(30, 32, 36)));
    f.render_widget(Paragraph::new(Line::from(how)), hit.how_button);
}

fn render_value(f: &mut Frame, area: Rect, app: &App) {
    let delta = app.widget.delta_line();
    let color = match delta.direction {
        MoveDirection::Up => C_UP,
        MoveDirection::Down => C_DOWN,
    };

    let lines = vec![
        Line::from(Span::styled(
            "M A R K E T   C A P",
            Style::default().fg(C_BRIGHT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            app.widget.headline().to_string(),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} ", delta.arrow),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} ({})", delta.amount, delta.percent),
                Style::default().fg(color),
            ),
            Span::styled(" since last snapshot", Style::default().fg(C_DIM)),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// One styled cell of the marquee track.
type Cell = (char, Style);

/// Lay out the milestone pills once. Returns the cells and the width of the
/// first pill (including its trailing gap).
fn pill_track<S>(milestones: &MilestoneTracker<S>) -> (Vec<Cell>, usize)
where
    S: KeyValueStore,
{
    let mut cells = Vec::new();
    let mut first_pill = 0;

    for (index, (milestone, reached)) in milestones.iter().enumerate() {
        let (mark, style) = if reached {
            (
                '✓',
                Style::default()
                    .fg(C_UP)
                    .bg(Color::Rgb(18, 46, 38))
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ('○', Style::default().fg(C_DIM).bg(Color::Rgb(26, 28, 32)))
        };

        let text = format!(
            " {} ${} · {} ",
            mark,
            format_compact(milestone.threshold),
            milestone.label
        );
        let start = cells.len();
        cells.extend(text.chars().map(|c| (c, style)));
        cells.extend(std::iter::repeat_n((' ', Style::default()), PILL_GAP));

        if index == 0 {
            first_pill = cells.len() - start;
        }
    }

    (cells, first_pill)
}

fn render_marquee(f: &mut Frame, area: Rect, app: &mut App, hit: &mut HitAreas) {
    let block = Block::default()
        .title(Span::styled(" MILESTONES ", Style::default().fg(C_DIM)))
        .title_alignment(Alignment::Center)
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(C_BORDER));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(ARROW_BACK.chars().count() as u16),
            Constraint::Min(0),
            Constraint::Length(ARROW_FORWARD.chars().count() as u16),
        ])
        .split(inner);

    hit.marquee = area;
    hit.arrow_back = columns[0];
    hit.arrow_forward = columns[2];

    let arrow_style = Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD);
    f.render_widget(Paragraph::new(Span::styled(ARROW_BACK, arrow_style)), columns[0]);
    f.render_widget(Paragraph::new(Span::styled(ARROW_FORWARD, arrow_style)), columns[2]);

    let (track, first_pill) = pill_track(app.widget.milestones());
    app.widget
        .marquee_mut()
        .measure(track.len() as f64, first_pill as f64);

    let viewport = columns[1];
    if track.is_empty() || viewport.width == 0 {
        return;
    }

    // Original followed by one duplicate so the wrap point is seamless
    let doubled: Vec<Cell> = track.iter().chain(track.iter()).copied().collect();
    let start = app.widget.marquee().offset().floor() as usize;
    let visible = (0..viewport.width as usize).map(|i| doubled[(start + i) % doubled.len()]);

    f.render_widget(Paragraph::new(Line::from(group_spans(visible))), viewport);
}

/// Merge runs of equally-styled cells into spans.
fn group_spans(cells: impl Iterator<Item = Cell>) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = None;

    for (c, style) in cells {
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style.unwrap_or_default()));
    }
    spans
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let updated = match app.widget.snapshot().latest() {
        Some(snapshot) => format!(
            " ⏱  {} ",
            snapshot.time.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        None => " ⏱  waiting for first snapshot ".to_string(),
    };

    let reached = app.widget.milestones().reached_count();
    let total = app.widget.milestones().milestones().len();

    let line = Line::from(vec![
        Span::styled(updated, Style::default().fg(Color::Rgb(100, 149, 237))),
        Span::styled(
            format!(" ◆ {reached}/{total} milestones "),
            Style::default().fg(C_ACCENT),
        ),
        Span::styled(
            " [C] Copy  [H] How it works  [←/→] Step  [Q] Quit ",
            Style::default().fg(C_DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_how_it_works(f: &mut Frame, area: Rect, hit: &mut HitAreas) {
    let modal = centered(area, 72, 14);
    f.render_widget(Clear, modal);

    let block = Block::default()
        .title(Span::styled(
            " How the $mCAP tek works ",
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(C_BORDER))
        .style(Style::default().bg(Color::Rgb(20, 22, 26)));
    let inner = block.inner(modal);
    f.render_widget(block, modal);

    let close = " Close ";
    let close_width = close.chars().count() as u16;
    hit.modal = modal;
    hit.modal_close = Rect::new(
        modal.right().saturating_sub(close_width + 2),
        modal.y,
        close_width,
        1,
    )
    .intersection(modal);
    f.render_widget(
        Paragraph::new(Span::styled(
            close,
            Style::default().fg(C_BRIGHT).bg(Color::Rgb(40, 42, 48)),
        )),
        hit.modal_close,
    );

    let bullet = |parts: Vec<Span<'static>>| {
        let mut spans = vec![Span::styled("• ", Style::default().fg(C_ACCENT))];
        spans.extend(parts);
        Line::from(spans)
    };
    let bold = |s: &'static str| {
        Span::styled(s, Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD))
    };
    let plain = |s: &'static str| Span::styled(s, Style::default().fg(C_BRIGHT));

    let lines = vec![
        bullet(vec![
            plain("Every buy triggers the "),
            bold("Hyper-Quantum Pool Recalibration™"),
            plain("."),
        ]),
        bullet(vec![
            plain("We ping the "),
            bold("Liquidity Flux Capacitor"),
            plain(" (it politely nudges price up)."),
        ]),
        bullet(vec![
            plain("The "),
            bold("Market-Cap Multiplier"),
            plain(" performs advanced math: number go higher."),
        ]),
        bullet(vec![
            plain("The "),
            bold("Auto-Pump Autoscaler"),
            plain(" converts vibes → velocity → valuation."),
        ]),
        bullet(vec![
            plain("Result: "),
            bold("More buys = bigger $mCAP"),
            plain(". That’s the tek."),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "TL;DR: You buy → pools swirl → line goes up → $mCAP does cardio.",
            Style::default().fg(C_DIM),
        )),
    ];

    let body = Rect::new(
        inner.x + 1,
        inner.y + 1,
        inner.width.saturating_sub(2),
        inner.height.saturating_sub(1),
    )
    .intersection(inner);
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
}

fn render_trail(f: &mut Frame, app: &App) {
    let area = f.area();
    let buf = f.buffer_mut();

    for (i, (column, row)) in app.trail.points().enumerate() {
        let position = Position::new(column, row);
        if !area.contains(position) {
            continue;
        }
        let fade = 200u8.saturating_sub(i as u8 * 30);
        if let Some(cell) = buf.cell_mut(position) {
            cell.set_symbol(if i == 0 { "○" } else { "·" });
            cell.set_fg(Color::Rgb(fade, fade, fade));
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
