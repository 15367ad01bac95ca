use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use aicademy::ai::OpenRouterGateway;
use aicademy::ai_worker::spawn_gateway_worker;
use aicademy::app::App;
use aicademy::config::AppConfig;
use aicademy::logger;
use aicademy::store::{ProgressStore, SqliteBackend};
use aicademy::ui;

const TICK: Duration = Duration::from_millis(100);

fn open_store(config: &AppConfig) -> ProgressStore {
    let path = config.db_path();
    match SqliteBackend::open(&path) {
        Ok(backend) => {
            logger::log(&format!("Progress database at {}", path.display()));
            ProgressStore::new(Arc::new(backend))
        }
        Err(e) => {
            logger::warn(&format!(
                "Could not open {}: {}. Progress will not be saved.",
                path.display(),
                e
            ));
            ProgressStore::detached()
        }
    }
}

fn main() -> io::Result<()> {
    let config = AppConfig::from_env();
    logger::init(&config.log_path());
    logger::log("Starting AICademy");

    let store = open_store(&config);
    let ai_enabled = config.api_key.is_some();
    if !ai_enabled {
        logger::warn("OPENROUTER_API_KEY is not set, AI features will fail");
    }

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
    let gateway = Arc::new(OpenRouterGateway::new(&config));
    let worker = spawn_gateway_worker(gateway, config.request_timeout, reply_tx, request_rx)?;

    let mut app = App::new(store, request_tx, ai_enabled, config.model.model.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &reply_rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // Dropping the app closes the request channel and stops the worker.
    drop(app);
    if worker.join().is_err() {
        logger::error("Gateway worker panicked");
    }
    logger::log("Exiting AICademy");

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    replies: &crossbeam_channel::Receiver<aicademy::ai_worker::GatewayReply>,
) -> io::Result<()> {
    loop {
        while let Ok(reply) = replies.try_recv() {
            app.handle_reply(reply);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
