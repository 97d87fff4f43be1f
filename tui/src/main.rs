//! murmur entry point
//!
//! Speech drifts across a dark canvas and fades; a language model answers
//! each utterance with a line of its own. When nobody speaks, the canvas
//! fills itself.
//!
//! Usage:
//!   murmur 2>murmur.log
//!
//! Feed recognised speech one line at a time into the FIFO named by
//! `[recognition] fifo_path` (or `MURMUR_SPEECH_FIFO`).

use std::io;
use std::panic;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur_tui::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never land on the canvas
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Config errors are reported before the terminal is taken over
    let config = murmur_core::load_config()?;
    tracing::info!(source = %config.source(), "Configuration loaded");

    use std::io::IsTerminal;

    if !io::stdout().is_terminal() {
        eprintln!("Error: murmur draws on a terminal (TTY)");
        eprintln!("Redirect only stderr, e.g. murmur 2>murmur.log");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let mut app = App::new(&config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let summary = app.display();
    tracing::info!(
        placed = summary.placed,
        generated = summary.generated,
        removed = summary.removed,
        dropped = summary.dropped,
        "murmur finished"
    );

    result
}
