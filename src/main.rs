// azstore - terminal dashboard for the Azurite storage emulator
//
// Browses a static catalog of storage resources and tails the emulator's
// Docker logs side by side.
//
// Architecture:
// - Source (docker / demo): produces raw log lines on a bounded channel
// - Pipeline: actor task owning the scrollback and the log viewport
// - TUI (ratatui): single owned App, redrawn from immutable snapshots

mod catalog;
mod cli;
mod config;
mod logging;
mod pipeline;
mod source;
mod tui;

use anyhow::Result;
use catalog::Catalog;
use config::Config;
use logging::DiagnosticsBuffer;
use pipeline::LogPipeline;
use source::{DemoSource, DockerSource, LogSource};
use std::time::Duration;
use tui::app::App;

/// Upper bound on stopping ingestion and the container at exit
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    let Some(flags) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    flags.apply(&mut config);

    // Internal events go to memory while the TUI owns the screen
    let diagnostics = DiagnosticsBuffer::new();
    let _file_guard = logging::init(&config.logging, Some(diagnostics.clone()));

    tracing::info!(
        version = config::VERSION,
        demo = config.demo,
        "Starting azstore"
    );

    if config.demo {
        let source = DemoSource::new(config.source.demo_interval());
        run(source, &config, diagnostics).await
    } else {
        let source = DockerSource::new(config.source.to_docker_options());
        run(source, &config, diagnostics).await
    }
}

/// Spawn the pipeline for `source`, run the dashboard, then shut down
async fn run<S: LogSource>(source: S, config: &Config, diagnostics: DiagnosticsBuffer) -> Result<()> {
    let pipeline = LogPipeline::spawn(source, config.pipeline_config());

    let app = App::new(
        Catalog::sample(),
        pipeline.handle(),
        config.theme,
        config.show_welcome,
    )
    .with_diagnostics(diagnostics);

    let result = tui::run_tui(app, config.tick_interval()).await;

    if let Err(e) = pipeline.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!("Shutdown incomplete: {:#}", e);
    }
    tracing::info!("azstore stopped");

    result
}
