use {
    super::entities,
    std::collections::HashMap,
    tokio::sync::{
        Mutex,
        RwLock,
    },
};

mod add_auction;
mod apply_bid;
mod get_auction;
mod get_auctions;
mod get_bids;
mod get_due_auctions;
mod get_or_create_auction_lock;
mod remove_auction_lock;
mod transition_status;

pub use {
    apply_bid::{
        AppliedBid,
        ApplyBidError,
    },
    get_due_auctions::DueAuctions,
    transition_status::TransitionError,
};

/// An auction room together with its accepted bid history. The pair is kept
/// under one lock so readers always observe the room and its history at a
/// single point in time.
#[derive(Debug)]
pub struct AuctionEntry {
    pub auction: entities::Auction,
    pub bids:    Vec<entities::Bid>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub auctions:     RwLock<HashMap<entities::AuctionId, AuctionEntry>>,
    pub auction_lock: Mutex<HashMap<entities::AuctionId, entities::AuctionLock>>,
}

#[derive(Debug, Default)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
}

impl Repository {
    pub fn new() -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
        }
    }
}
