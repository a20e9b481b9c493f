use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use statwatch_tui::{events, ui, App, Args, FeedEvent, FeedHost, Settings, Theme};

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings)?;
    statwatch_tui::logging::init(args.log_file.as_deref())?;

    // The feed ticks here while the UI owns the main thread
    let runtime = tokio::runtime::Runtime::new()?;
    let mut host = FeedHost::new(settings.clone(), runtime.handle().clone())?;

    let mut app = App::new(
        host.description(),
        settings.interval(),
        settings.history_len,
        Theme::auto_detect(),
    );

    match host.connect() {
        Ok(()) => app.reset(host.description()),
        Err(e) => {
            error!("initial connect failed: {:#}", e);
            app.expire_session();
            app.set_status_message(format!("{:#}", e));
        }
    }

    let result = run_tui(&mut app, &mut host);

    drop(host);
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App, host: &mut FeedHost) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app, host);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    host: &mut FeedHost,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            if let Some(action) = events::handle_key_event(app, key) {
                host.perform(app, action);
            }
        }

        while let Some(event) = host.next_event() {
            if matches!(event, FeedEvent::Unauthenticated) {
                info!("session expired, waiting for sign-in");
            }
            app.apply(event);
        }
    }

    Ok(())
}
