use {
    super::Service,
    crate::auction::entities,
};

impl Service {
    /// All known auctions in catalogue order, whatever their status.
    pub async fn get_auctions(&self) -> Vec<entities::Auction> {
        self.repo.get_auctions().await
    }
}
