use {
    super::{
        AuctionEntry,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    // NOTE: Do not call this function directly. Instead call `add_auction` from `Service`.
    pub async fn add_auction(
        &self,
        auction: entities::Auction,
    ) -> Result<entities::Auction, RestError> {
        let mut auctions = self.in_memory_store.auctions.write().await;
        if auctions.contains_key(&auction.id) {
            return Err(RestError::DuplicateAuction);
        }
        auctions.insert(
            auction.id,
            AuctionEntry {
                auction: auction.clone(),
                bids:    Vec::new(),
            },
        );
        Ok(auction)
    }
}
