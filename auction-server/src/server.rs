use {
    crate::{
        api,
        api::ws::WsState,
        auction::service as auction_service,
        config::{
            Config,
            RunOptions,
        },
        dealer::service::Service as DealerService,
        per_metrics,
        state::Store,
    },
    anyhow::anyhow,
    axum_prometheus::metrics_exporter_prometheus::PrometheusBuilder,
    futures::future::join_all,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let metrics_recorder = PrometheusBuilder::new().install_recorder()?;

    let ws = WsState::new(
        config.ws.requester_ip_header_name.clone(),
        config.ws.broadcast_channel_size,
    );
    let event_sender = ws.broadcast_sender.clone();

    let dealer_service = Arc::new(DealerService::new());
    let auction_service = auction_service::Service::new(
        auction_service::Config {
            lifecycle_tick_interval: config.lifecycle.tick_interval,
        },
        dealer_service.clone(),
        event_sender,
    );

    let task_tracker = TaskTracker::new();
    let store = Arc::new(Store {
        auction_service,
        dealer_service,
        ws,
        admin_api_key: run_options.admin_api_key.clone(),
        metrics_recorder,
        task_tracker: task_tracker.clone(),
    });

    let lifecycle_loop = tokio::spawn({
        let service = store.auction_service.clone();
        async move { service.run_lifecycle_loop().await }
    });
    let server_loop = tokio::spawn(api::start_api(run_options.clone(), store.clone()));
    let metrics_loop = tokio::spawn(per_metrics::start_metrics(run_options, store.clone()));
    join_all(vec![lifecycle_loop, server_loop, metrics_loop]).await;

    // Wait for all the spawned bid tasks to finish before exiting.
    task_tracker.close();
    task_tracker.wait().await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
//
// NOTE: A more idiomatic approach would be to use a tokio::sync::broadcast channel, and to send a
// shutdown signal to all running tasks. However, this is a bit more complicated to implement and
// we don't rely on global state for anything else.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
