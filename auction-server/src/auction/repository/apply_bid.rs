use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::Amount,
    },
    time::OffsetDateTime,
};

#[derive(Clone, Debug, PartialEq)]
pub struct AppliedBid {
    pub auction: entities::Auction,
    pub bid:     entities::Bid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyBidError {
    AuctionNotFound,
    /// The room advanced between the snapshot the caller validated against
    /// and this commit.
    Conflict,
}

impl Repository {
    /// Commits a validated bid against the room state the caller saw.
    ///
    /// The caller passes the current bid it validated against. If the stored
    /// current bid differs, or the room is no longer live, nothing is written
    /// and the caller gets a conflict back to re-validate on. On success the
    /// bid receives the next sequence number in the room, with no gaps, and
    /// an acceptance time that never moves backwards within the room.
    pub async fn apply_bid(
        &self,
        bid_create: &entities::BidCreate,
        expected_current_bid: Amount,
    ) -> Result<AppliedBid, ApplyBidError> {
        let mut auctions = self.in_memory_store.auctions.write().await;
        let entry = auctions
            .get_mut(&bid_create.auction_id)
            .ok_or(ApplyBidError::AuctionNotFound)?;
        if entry.auction.status != entities::AuctionStatus::Live
            || entry.auction.current_bid != expected_current_bid
        {
            return Err(ApplyBidError::Conflict);
        }

        let now = OffsetDateTime::now_utc();
        let bid = entities::Bid {
            id:              entities::BidId::new_v4(),
            auction_id:      bid_create.auction_id,
            dealer_id:       bid_create.dealer_id,
            amount:          bid_create.amount,
            sequence_number: entry.auction.sequence_number + 1,
            acceptance_time: entry
                .bids
                .last()
                .map(|previous| previous.acceptance_time.max(now))
                .unwrap_or(now),
        };
        entry.auction.current_bid = bid.amount;
        entry.auction.current_leader = Some(bid.dealer_id);
        entry.auction.sequence_number = bid.sequence_number;
        entry.bids.push(bid.clone());
        Ok(AppliedBid {
            auction: entry.auction.clone(),
            bid,
        })
    }
}
