use {
    crate::{
        api::ws::WsState,
        auction::service::Service as AuctionService,
        dealer::service::Service as DealerService,
    },
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
    std::sync::Arc,
    tokio_util::task::TaskTracker,
};

pub struct Store {
    pub auction_service:  AuctionService,
    pub dealer_service:   Arc<DealerService>,
    pub ws:               WsState,
    pub admin_api_key:    String,
    pub metrics_recorder: PrometheusHandle,
    pub task_tracker:     TaskTracker,
}
