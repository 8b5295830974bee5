//! Ticker Chart - streaming price chart in the terminal
//!
//! Usage: ticker-chart [config.yaml]
//!
//! The feed runs on a tokio runtime; the render loop owns the chart on the
//! main thread and reads the feed's latest value once per frame.

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

use ticker_chart::bin_common::{
    init_tracing, load_config_from_env, parse_args, AppConfig, ConfigType, ShutdownManager,
};
use ticker_chart::chart::{ChartContext, RenderLoop};
use ticker_chart::price_feed::PriceFeed;
use ticker_chart::terminal::{self, ErrorSlot, TerminalSurface};

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config_path = load_config_from_env(ConfigType::from_args(&parse_args()));
    let (config, source) = AppConfig::load(&config_path)?;
    init_tracing(&config.logging)?;
    info!("[App] Starting ticker chart, config {}", source);

    // Create tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    // Sinks go in before the transport starts so the first error is kept
    let mut feed = PriceFeed::detached(&config.feed)?;
    let last_error: ErrorSlot = Arc::new(Mutex::new(None));
    let error_slot = Arc::clone(&last_error);
    feed.on_error(move |e| {
        *error_slot.lock() = Some(e.to_string());
    });
    runtime.block_on(feed.start())?;

    let mut ctx = ChartContext::new(&config.chart)?;
    let mut render_loop = RenderLoop::new(&config.chart, ctx.model().step());

    // Setup terminal
    let terminal = terminal::enter()?;
    let mut surface = TerminalSurface::new(
        terminal,
        feed.handle(),
        format!("Ticker Chart | {}", config.feed.stream),
    )
    .with_error_slot(last_error);

    // Run the main loop
    let handle = feed.handle();
    let flag = shutdown.flag();
    let result = render_loop.run(&mut ctx, &mut surface, || handle.latest(), &flag);

    // Restore terminal
    if let Err(e) = terminal::leave(surface.terminal_mut()) {
        warn!("[App] Failed to restore terminal: {}", e);
    }

    shutdown.trigger();
    if let Err(e) = runtime.block_on(feed.shutdown()) {
        error!("[App] Feed shutdown failed: {}", e);
    }

    result?;

    info!(
        "[App] Exited after {} frames and {} appends",
        render_loop.frames(),
        render_loop.ticks()
    );
    Ok(())
}
