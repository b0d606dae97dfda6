//! Cadence player entry point.

use std::error::Error;
use std::sync::Arc;

use cadence_core::clock::SystemClock;
use cadence_core::store::MemorySessionStore;
use cadence_playback::PlaybackEngine;
use cadence_player::config::PlayerConfig;
use cadence_player::driver;
use cadence_player::script::Script;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber on stderr; stdout carries the narrative.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = PlayerConfig::from_env()?;
    tracing::info!(script = %config.script_path.display(), phase_key = %config.phase_key, "Starting Cadence player");

    let script = Script::load(&config.script_path)?;
    let (messages, playback) = script.into_playback(&config);

    let store = Arc::new(MemorySessionStore::new());
    let mut engine =
        PlaybackEngine::new(messages, playback, store.clone(), Arc::new(SystemClock));

    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    let outcome = driver::run(&mut engine, store.as_ref(), input, &mut output).await?;
    engine.teardown();

    tracing::info!(?outcome, "Cadence player finished");
    Ok(())
}
