//! mCAP tek - live market cap terminal widget
//!
//! Polls the market-cap API every couple of seconds, springs the headline
//! toward the latest value, shows the move since the previous snapshot and
//! scrolls the milestone pills along the bottom.

use std::{
    error::Error,
    fs::File,
    io,
    sync::Mutex,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mcap_tek::Config;
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use tracing::info;

mod app;
mod trail;
mod ui;

use app::App;

/// Display frame interval.
const FRAME: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = Config::from_env()?;
    info!(api = %config.api_base, state = %config.state_file.display(), "starting mCAP tek");

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        );
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::mount(&config);
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let now = Instant::now();
        app.on_frame(now);
        terminal.draw(|f| ui::render(f, app, now))?;

        let timeout = app.frame_timeout(FRAME);
        if event::poll(timeout)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => app.on_key(key, now),
                Event::Mouse(mouse) => app.on_mouse(mouse, now),
                Event::FocusLost => app.on_focus_lost(),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Log to a file: stdout belongs to the terminal UI.
///
/// `MCAP_LOG_FILE` sets the path (default `mcap-tek.log`), `RUST_LOG` the
/// filter (default `info`).
fn init_logging() {
    let path = std::env::var("MCAP_LOG_FILE").unwrap_or_else(|_| "mcap-tek.log".to_string());
    let Ok(file) = File::create(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
