//! SPOTDECK entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use spotdeck_core::PanelConfig;
use spotdeck_engine::{AwsCliGateway, Engine, RefreshPass};
use spotdeck_tui::error::TuiError;
use spotdeck_tui::events::TuiEvent;
use spotdeck_tui::keys::map_key;
use spotdeck_tui::logging;
use spotdeck_tui::runtime::{sleep_until, Driver};
use spotdeck_tui::state::{App, Effect};
use spotdeck_tui::views::render_view;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = PanelConfig::load()?;
    logging::init(&config.log_path)?;
    run(config).await?;
    Ok(())
}

async fn run(config: PanelConfig) -> Result<(), TuiError> {
    let gateway = Arc::new(AwsCliGateway::from_config(&config));
    let mut app = App::new(&config);
    let engine = Engine::new(config, gateway)?;
    let mut driver = Driver::new(engine);
    tracing::info!(region = %app.region, "spotdeck starting");

    let mut session = TerminalSession::open()?;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx);

    driver.request(RefreshPass::full(), &mut app);

    loop {
        session.draw(&app)?;

        tokio::select! {
            _ = sleep_until(driver.periodic_deadline()) => {
                driver.on_periodic_deadline(&mut app);
            }
            _ = sleep_until(driver.busy_deadline()) => {
                if let Err(err) = driver.on_busy_deadline() {
                    driver.report(&err, &mut app);
                }
            }
            finished = driver.pass_finished() => {
                if let Err(err) = driver.finish(finished, &mut app) {
                    driver.report(&err, &mut app);
                }
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, &mut driver, event) {
                    break;
                }
            }
        }
    }

    tracing::info!(views = app.sequence(), "spotdeck stopping");
    Ok(())
}

type Backend = CrosstermBackend<Stdout>;

/// Raw-mode alternate screen, restored on drop even when the loop errors.
struct TerminalSession {
    terminal: Terminal<Backend>,
}

impl TerminalSession {
    fn open() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, app: &App) -> Result<(), TuiError> {
        self.terminal.draw(|f| render_view(f, app))?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        sender.blocking_send(TuiEvent::Input(key))
                    }
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

/// Returns `true` when the operator asked to quit.
fn handle_event(app: &mut App, driver: &mut Driver, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) => match map_key(key).and_then(|action| app.handle(action)) {
            Some(Effect::Quit) => return true,
            Some(Effect::Request(pass)) => driver.request(pass, app),
            Some(Effect::SetPaused(paused)) => driver.set_paused(paused),
            None => {}
        },
        TuiEvent::Resize { width, height } => {
            tracing::debug!(width, height, "terminal resized");
        }
    }
    false
}
