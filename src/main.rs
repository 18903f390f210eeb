mod app;
mod config;
mod data;
mod game;
mod keys;
mod logging;
mod message;
mod model;
mod screens;
mod text;

use std::{io, path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use app::App;
use config::Config;
use data::DataClient;
use message::{Command, Message};

/// Depth of the event queue feeding the UI loop.
const QUEUE_DEPTH: usize = 100;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live NFL scores and play-by-play in the terminal", long_about = None)]
pub struct Args {
    /// Game list refresh interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Play feed refresh interval in seconds
    #[arg(long)]
    feed_interval: Option<u64>,

    /// Use NCAA College Football instead of NFL
    #[arg(long)]
    ncaa: bool,

    /// Show games for this day (YYYYMMDD) instead of today
    #[arg(short, long, value_parser = config::parse_date)]
    date: Option<NaiveDate>,

    /// Config file to use instead of ~/.config/nfl-feed/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `nfl_feed=trace,reqwest=debug`
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    let _log_guard = logging::init(&config.logging);
    info!(league = config.league.slug(), date = %config.date, "starting");

    let client = Arc::new(
        DataClient::new(config.league.slug(), config.request_timeout)
            .context("failed to build http client")?,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&keys::KEYS, &config);
    let res = run_app(&mut terminal, &mut app, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "exiting with error");
    }
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: Arc<DataClient>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<Message>(QUEUE_DEPTH);
    spawn_input_reader(tx.clone());

    let size = terminal.size()?;
    app.update(Message::Resize {
        width: size.width,
        height: size.height,
    });

    let init = app.init();
    if dispatch(init, &client, &tx) {
        return Ok(());
    }

    loop {
        terminal.draw(|f| app.render(f))?;

        let Some(msg) = rx.recv().await else {
            return Ok(());
        };
        trace!(screen = ?app.screen(), ?msg, "event");
        if dispatch(app.update(msg), &client, &tx) {
            return Ok(());
        }

        // Apply whatever else is already queued before drawing again.
        while let Ok(msg) = rx.try_recv() {
            if dispatch(app.update(msg), &client, &tx) {
                return Ok(());
            }
        }
    }
}

/// Runs the side effects the app asked for. Returns true on quit.
fn dispatch(cmds: Vec<Command>, client: &Arc<DataClient>, tx: &mpsc::Sender<Message>) -> bool {
    for cmd in cmds {
        match cmd {
            Command::Quit => return true,
            Command::FetchGames { date } => {
                let client = client.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = client.fetch_scoreboard(date).await;
                    let _ = tx.send(Message::GamesFetched(result)).await;
                });
            }
            Command::FetchPlays { game_id } => {
                let client = client.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = client.fetch_plays(&game_id).await;
                    let _ = tx.send(Message::PlaysFetched { game_id, result }).await;
                });
            }
            Command::ScheduleTick {
                screen,
                generation,
                after,
            } => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Message::Tick { screen, generation }).await;
                });
            }
            other @ (Command::Watch(_) | Command::ExitWatch) => {
                debug!(cmd = ?other, "navigation command reached the runtime");
            }
        }
    }
    false
}

/// Forwards terminal input on a dedicated thread until the queue closes.
fn spawn_input_reader(tx: mpsc::Sender<Message>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    error!(error = %err, "failed to poll terminal events");
                    return;
                }
            }

            let msg = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Message::Key(key),
                Ok(Event::Resize(width, height)) => Message::Resize { width, height },
                Ok(_) => continue,
                Err(err) => {
                    error!(error = %err, "failed to read terminal event");
                    return;
                }
            };

            if tx.blocking_send(msg).is_err() {
                return;
            }
        }
    });
}
