use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// The accepted bid history of the room in acceptance order. None when
    /// the room does not exist.
    pub async fn get_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> Option<Vec<entities::Bid>> {
        self.in_memory_store
            .auctions
            .read()
            .await
            .get(&auction_id)
            .map(|entry| entry.bids.clone())
    }
}
