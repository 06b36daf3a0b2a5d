use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trellis::cli::Cli;
use trellis::middleware::{logger, Metrics};
use trellis::server::{AppService, HttpServer};
use trellis::{handler_fn, Engine, RuntimeConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = RuntimeConfig::from_env();
    config.apply();
    info!(stack_size = config.stack_size, "runtime configured");

    let metrics = Arc::new(Metrics::new());

    let mut engine = Engine::new();
    engine.use_middleware(logger());
    engine.use_middleware(metrics.handler());

    engine.get(
        "/health",
        vec![handler_fn(|ctx| {
            ctx.json(200, &serde_json::json!({ "status": "ok" }));
        })],
    )?;

    engine.get(
        "/hello/:name",
        vec![handler_fn(|ctx| {
            let name = ctx.param("name").to_string();
            ctx.string(200, &format!("Hello, {name}!"));
        })],
    )?;

    {
        let metrics = Arc::clone(&metrics);
        engine.get(
            "/metrics",
            vec![handler_fn(move |ctx| {
                ctx.json(
                    200,
                    &serde_json::json!({
                        "requests": metrics.request_count(),
                        "errors": metrics.error_count(),
                        "avg_latency_us": metrics.average_latency().as_micros() as u64,
                    }),
                );
            })],
        )?;
    }

    if let Some(dir) = &cli.static_dir {
        engine.static_dir("/static", dir.clone())?;
        info!(dir = %dir.display(), "serving static files under /static");
    }

    info!(addr = %cli.addr, "starting server");
    let handle = HttpServer(AppService::new(engine)).start(&cli.addr)?;
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server terminated abnormally"))?;
    Ok(())
}
