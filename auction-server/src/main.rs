use {
    crate::{
        per_metrics::{
            is_metrics,
            MetricsLayer,
        },
        server::start_server,
    },
    anyhow::Result,
    clap::Parser,
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            filter_fn,
            LevelFilter,
        },
        layer::SubscriberExt,
        Layer,
    },
};

mod api;
mod auction;
mod config;
mod dealer;
mod kernel;
mod per_metrics;
mod server;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize a Tracing Subscriber
    let fmt_builder = tracing_subscriber::fmt()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal());

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    // Spans with a metrics target are turned into counters and histograms by the
    // metrics layer.
    if std::io::stderr().is_terminal() {
        tracing::subscriber::set_global_default(
            fmt_builder
                .compact()
                .finish()
                .with(MetricsLayer.with_filter(filter_fn(|metadata| is_metrics(metadata, false)))),
        )?;
    } else {
        tracing::subscriber::set_global_default(
            fmt_builder
                .json()
                .finish()
                .with(MetricsLayer.with_filter(filter_fn(|metadata| is_metrics(metadata, false)))),
        )?;
    }

    // Parse the command line arguments with StructOpt, will exit automatically on `--help` or
    // with invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
    }
}
