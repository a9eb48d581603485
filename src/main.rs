mod actions;
mod app;
mod config;
mod constants;
mod events;
mod export;
mod github;
mod highlight;
mod llms;
mod logging;
mod platform;
mod remote;
mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;

use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use app::{App, Channels};
use config::EnvConfig;
use llms::gemini::GeminiClient;

fn main() -> io::Result<()> {
    let env = EnvConfig::load();

    // Panic hook: restore terminal state and log the panic to disk.
    // Without this, a panic leaves the terminal in raw mode + alternate
    // screen and the error is lost.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        logging::log_panic(info);
        default_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let (remote_tx, remote_rx) = mpsc::channel();
    let (chat_tx, chat_rx) = mpsc::channel();
    let (doc_tx, doc_rx) = mpsc::channel();
    let (export_tx, export_rx) = mpsc::channel();
    let channels = Channels { remote_tx, remote_rx, chat_tx, chat_rx, doc_tx, doc_rx, export_tx, export_rx };

    let mut app = App::new(&env, Arc::new(GeminiClient::new()), channels);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}
