// File: src/bin/tui.rs
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event as TermEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tripdeck::config::Config;
use tripdeck::storage::LocalStorage;
use tripdeck::tui::action::Action;
use tripdeck::tui::state::AppState;
use tripdeck::tui::{gateway, key_from_event, view};

#[derive(Parser, Debug)]
#[command(name = "tripdeck", version, about = "Plan the legs of a trip from the terminal")]
struct Args {
    /// Trip file to open instead of the one in the data directory
    #[arg(long)]
    data: Option<PathBuf>,

    /// Config file to read instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(dir) = Config::data_dir() else {
        return Ok(());
    };
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tripdeck.log"))
        .context("Failed to open log file")?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    init_logging(&config)?;

    let data_file = match args.data {
        Some(path) => path,
        None => config.data_file()?,
    };
    log::info!("Opening trip {}", data_file.display());

    let (action_tx, action_rx) = mpsc::channel(32);
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let gateway_handle = tokio::spawn(gateway::run(
        LocalStorage::new(data_file),
        action_rx,
        event_tx,
    ));
    action_tx.send(Action::Reload).await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut state = AppState::new(
        config.presenter_options(),
        config.default_sort,
        config.default_filter,
    );
    let result = run_app(&mut terminal, &mut state, &action_tx, &mut event_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let _ = action_tx.send(Action::Quit).await;
    let _ = gateway_handle.await;
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
    actions: &mpsc::Sender<Action>,
    events: &mut mpsc::Receiver<tripdeck::tui::action::AppEvent>,
) -> Result<()> {
    loop {
        while let Ok(app_event) = events.try_recv() {
            state.on_app_event(app_event);
        }

        terminal.draw(|f| view::draw(f, state))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let TermEvent::Key(key_event) = event::read()? else {
            continue;
        };
        let Some(key) = key_from_event(key_event) else {
            continue;
        };

        for action in state.handle_key(key) {
            if matches!(action, Action::Quit) {
                return Ok(());
            }
            actions.send(action).await?;
        }
    }
}
