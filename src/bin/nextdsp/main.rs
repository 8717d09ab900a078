//! nextdsp - play the synth through the filter and phaser from a terminal
//!
//! Run with: cargo run --bin nextdsp

mod app;
mod ui;

use app::AudioEngine;
use ui::UiApp;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so they never interleave with the terminal UI frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    let engine = AudioEngine::start()?;
    let mut app = UiApp::new(engine);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}
