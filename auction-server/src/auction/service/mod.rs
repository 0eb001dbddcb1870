use {
    super::repository::Repository,
    crate::{
        api::ws::UpdateEvent,
        dealer::service::Service as DealerService,
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio::sync::broadcast,
};

pub mod add_auction;
pub mod conclude_auction;
pub mod get_auction_by_id;
pub mod get_auctions;
pub mod get_bids;
pub mod handle_bid;
pub mod start_auction;
pub mod verification;
pub mod workers;

pub struct Config {
    /// How often the lifecycle scheduler looks for rooms whose window edge
    /// has passed.
    pub lifecycle_tick_interval: Duration,
}

pub struct ServiceInner {
    config:         Config,
    repo:           Arc<Repository>,
    dealer_service: Arc<DealerService>,
    event_sender:   broadcast::Sender<UpdateEvent>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        config: Config,
        dealer_service: Arc<DealerService>,
        event_sender: broadcast::Sender<UpdateEvent>,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new()),
            dealer_service,
            event_sender,
        }))
    }
}
