use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// A point-in-time copy of the room. Mutations behind the store lock
    /// never show through a copy handed out here.
    pub async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Option<entities::Auction> {
        self.in_memory_store
            .auctions
            .read()
            .await
            .get(&auction_id)
            .map(|entry| entry.auction.clone())
    }
}
