use {
    super::Repository,
    crate::auction::entities,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionError {
    AuctionNotFound,
    /// The stored status does not match the expected one, or the requested
    /// edge is not a legal forward step.
    Conflict,
}

impl Repository {
    /// Compare-and-set on the room status. Commits only when the stored
    /// status still equals `from` and `from -> to` walks the lifecycle
    /// forward by one step. A lost race surfaces as a conflict, never as a
    /// second transition.
    pub async fn transition_status(
        &self,
        auction_id: entities::AuctionId,
        from: entities::AuctionStatus,
        to: entities::AuctionStatus,
    ) -> Result<entities::Auction, TransitionError> {
        if from.next() != Some(to) {
            return Err(TransitionError::Conflict);
        }
        let mut auctions = self.in_memory_store.auctions.write().await;
        let entry = auctions
            .get_mut(&auction_id)
            .ok_or(TransitionError::AuctionNotFound)?;
        if entry.auction.status != from {
            return Err(TransitionError::Conflict);
        }
        entry.auction.status = to;
        Ok(entry.auction.clone())
    }
}
