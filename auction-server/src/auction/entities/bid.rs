use {
    super::{
        Auction,
        AuctionId,
    },
    crate::{
        dealer::entities::DealerId,
        kernel::entities::Amount,
    },
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;

/// A bid that made it into an auction's history.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:              BidId,
    pub auction_id:      AuctionId,
    pub dealer_id:       DealerId,
    pub amount:          Amount,
    pub sequence_number: u64,
    pub acceptance_time: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct BidCreate {
    pub auction_id: AuctionId,
    pub dealer_id:  DealerId,
    pub amount:     Amount,
    /// Server receipt time, captured at the transport boundary before the bid
    /// enters the room queue.
    pub initiation_time: OffsetDateTime,
}

/// Why a bid was turned away, in check order. The first failing check wins
/// when several apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BidRejection {
    AuctionNotLive,
    DealerNotApproved,
    BidTooLow,
}

/// A rejection is a regular outcome. The request was handled, the room just
/// said no.
#[derive(Clone, Debug, PartialEq)]
pub enum BidOutcome {
    Accepted { auction: Auction, bid: Bid },
    Rejected(BidRejection),
}
