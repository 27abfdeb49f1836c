use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

use cowbot_channels::{Channel, ConsoleChannel};
use cowbot_render::ProcessRenderer;

mod app;
mod bot;
mod cli;
mod shutdown;

use bot::SharedChannel;
use cli::Cli;
use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Inbox capacity between the channel reader and the message loop.
const INBOX_CAPACITY: usize = 64;

/// Grace period for blocking tasks (stdin reads) once `run` has returned.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    app::init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(cli));
    // tokio's stdin reader sits on a blocking thread that cannot be cancelled
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    if let Err(e) = &result {
        error!(error = %e, "cowbot exited with an error");
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = app::load_config(&cli)?;
    info!(
        nick = %config.bot.nick,
        renderer = %config.renderer.path,
        channel = %config.channels.console.channel,
        "config loaded"
    );

    let renderer = ProcessRenderer::new(&config.renderer.path);
    renderer.ensure_installed()?;

    let handlers = Arc::new(app::build_handlers(&config, Arc::new(renderer))?);

    if cli.check {
        info!("configuration ok");
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    let coordinator = ShutdownCoordinator::spawn(shutdown.clone())?;

    let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
    let mut console: Box<dyn Channel> = Box::new(ConsoleChannel::console(&config.channels.console));
    if let Err(e) = console.connect(inbox_tx).await {
        shutdown.fire();
        coordinator.join().await;
        return Err(e.into());
    }
    let channel: SharedChannel = Arc::new(RwLock::new(console));

    info!(nick = %config.bot.nick, "cowbot running, waiting for triggers");

    let message_loop = tokio::spawn(bot::run_message_loop(
        Arc::clone(&channel),
        Arc::clone(&handlers),
        inbox_rx,
        shutdown.clone(),
    ));

    shutdown.fired().await;

    if let Err(e) = message_loop.await {
        warn!(error = %e, "message loop ended abnormally");
    }
    if let Err(e) = channel.write().await.disconnect().await {
        warn!(error = %e, "channel disconnect failed");
    }
    let request = coordinator.join().await;

    info!(request = ?request, "cowbot stopped");
    Ok(())
}
