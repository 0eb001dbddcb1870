use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    pub async fn get_auctions(&self) -> Vec<entities::Auction> {
        let mut auctions: Vec<entities::Auction> = self
            .in_memory_store
            .auctions
            .read()
            .await
            .values()
            .map(|entry| entry.auction.clone())
            .collect();
        auctions.sort_by_key(|auction| (auction.start_time, auction.id));
        auctions
    }
}
